use std::fmt;

use cgmath::{InnerSpace, Vector3, Zero};
use rand::Rng;

use crate::config::{
    value::{format_float, format_vector, required_float, required_vector3},
    ConfigNode, ValueError,
};

const RADIAL_POSITION: &str = "RadialPosition";
const ROTATION_ANGLE: &str = "RotationAngle";
const RADIUS_OFFSET: &str = "RadiusOffset";
const ORIENTATION: &str = "Orientation";
const VISIBILITY_RANGE: &str = "VisibilityRange";
const CELESTIAL_BODY: &str = "CelestialBody";
const OBJECT_ID: &str = "ObjectID";

/// Registry-assigned identity of a live instance.
///
/// Unlike the object id, keys are never persisted and never reused within a
/// session, so they stay valid handles for the scene host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(pub(crate) u64);

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Component of a relative position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// The six axis-aligned up orientations offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationPreset {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
}

impl OrientationPreset {
    pub fn vector(self) -> Vector3<f32> {
        match self {
            OrientationPreset::Up => Vector3::unit_y(),
            OrientationPreset::Down => -Vector3::unit_y(),
            OrientationPreset::Right => Vector3::unit_x(),
            OrientationPreset::Left => -Vector3::unit_x(),
            OrientationPreset::Forward => Vector3::unit_z(),
            OrientationPreset::Back => -Vector3::unit_z(),
        }
    }
}

/// One placed copy of a static model.
///
/// A zero `relative_position` or `up_orientation` means "not resolved yet";
/// the placement engine fills them in on first instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticObject {
    pub object_id: String,
    /// Position in the owning body's non-rotating frame
    pub relative_position: Vector3<f32>,
    /// Spin about the surface normal, in degrees
    pub rotation_angle: f32,
    /// Altitude above the body's nominal radius
    pub radius_offset: f32,
    pub up_orientation: Vector3<f32>,
    pub visibility_range: f32,
    /// Empty until the first placement resolves it
    pub body_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub model_identity: String,
    pub config_identity: String,
    pub(crate) key: InstanceKey,
}

impl StaticObject {
    /// Creates an unplaced instance with no id
    pub fn new(model_identity: impl Into<String>, config_identity: impl Into<String>) -> Self {
        Self {
            object_id: String::new(),
            relative_position: Vector3::zero(),
            rotation_angle: 0.0,
            radius_offset: 0.0,
            up_orientation: Vector3::zero(),
            visibility_range: 0.0,
            body_name: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            model_identity: model_identity.into(),
            config_identity: config_identity.into(),
            key: InstanceKey::default(),
        }
    }

    pub fn key(&self) -> InstanceKey {
        self.key
    }

    /// Parses an instance record.
    ///
    /// Every numeric and vector field is required; a stored `ObjectID` is
    /// reused and a missing `CelestialBody` leaves the body unresolved.
    pub fn from_record(
        record: &ConfigNode,
        model_identity: &str,
        config_identity: &str,
    ) -> Result<Self, ValueError> {
        let mut obj = Self::new(model_identity, config_identity);
        obj.relative_position = required_vector3(record, RADIAL_POSITION)?;
        obj.rotation_angle = required_float(record, ROTATION_ANGLE)?;
        obj.radius_offset = required_float(record, RADIUS_OFFSET)?;
        obj.up_orientation = required_vector3(record, ORIENTATION)?;
        obj.visibility_range = required_float(record, VISIBILITY_RANGE)?;
        obj.body_name = record.get_value(CELESTIAL_BODY).unwrap_or_default().to_string();
        obj.object_id = record.get_value(OBJECT_ID).unwrap_or_default().trim().to_string();
        Ok(obj)
    }

    /// Serializes the persistent fields into a record node named `tag`
    pub fn to_record(&self, tag: &str) -> ConfigNode {
        let mut node = ConfigNode::new(tag);
        node.add_value(RADIAL_POSITION, format_vector(self.relative_position));
        node.add_value(ROTATION_ANGLE, format_float(self.rotation_angle));
        node.add_value(RADIUS_OFFSET, format_float(self.radius_offset));
        node.add_value(ORIENTATION, format_vector(self.up_orientation));
        node.add_value(VISIBILITY_RANGE, format_float(self.visibility_range));
        node.add_value(CELESTIAL_BODY, self.body_name.as_str());
        node.add_value(OBJECT_ID, self.object_id.as_str());
        node
    }

    /// Draws a fresh id from the instance's fields and a random perturbation
    pub fn generate_id<R: Rng>(&self, rng: &mut R) -> String {
        let seed = f64::from(self.visibility_range)
            + f64::from(self.rotation_angle)
            + f64::from(self.radius_offset)
            + f64::from(self.up_orientation.magnitude())
            + f64::from(self.relative_position.magnitude())
            + rng.random_range(-1_000_000.0f64..1_000_000.0);
        format!("{:.2}", seed)
    }

    /// Last segment of the model identity followed by the object id
    pub fn name_id(&self) -> String {
        let short = self
            .model_identity
            .rsplit('/')
            .next()
            .unwrap_or(&self.model_identity);
        format!("{} ({})", short, self.object_id)
    }

    pub fn nudge(&mut self, axis: Axis, delta: f32) {
        match axis {
            Axis::X => self.relative_position.x += delta,
            Axis::Y => self.relative_position.y += delta,
            Axis::Z => self.relative_position.z += delta,
        }
    }
}

impl fmt::Display for StaticObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} body={} model={} config={} pos=({}, {}, {}) lat={:.6} lon={:.6} alt={:.2}",
            self.name_id(),
            self.body_name,
            self.model_identity,
            self.config_identity,
            self.relative_position.x,
            self.relative_position.y,
            self.relative_position.z,
            self.latitude,
            self.longitude,
            self.radius_offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn record() -> ConfigNode {
        let mut node = ConfigNode::new("Instances");
        node.add_value("RadialPosition", "157000.5,-1200,600000");
        node.add_value("RotationAngle", "90");
        node.add_value("RadiusOffset", "-3.25");
        node.add_value("Orientation", "0,1,0");
        node.add_value("VisibilityRange", "1000");
        node.add_value("CelestialBody", "Kerbin");
        node
    }

    #[test]
    fn test_from_record() {
        let obj = StaticObject::from_record(&record(), "Town/hangar", "Town/Hangar/hangar/STATIC").unwrap();

        assert_eq!(obj.relative_position, Vector3::new(157000.5, -1200.0, 600000.0));
        assert_eq!(obj.rotation_angle, 90.0);
        assert_eq!(obj.radius_offset, -3.25);
        assert_eq!(obj.up_orientation, Vector3::unit_y());
        assert_eq!(obj.visibility_range, 1000.0);
        assert_eq!(obj.body_name, "Kerbin");
        assert_eq!(obj.model_identity, "Town/hangar");
        assert!(obj.object_id.is_empty());
    }

    #[test]
    fn test_from_record_rejects_malformed_fields() {
        let mut bad = record();
        bad.set_value("RotationAngle", "ninety");
        assert!(matches!(
            StaticObject::from_record(&bad, "m", "c"),
            Err(ValueError::Float { .. })
        ));

        let mut node = ConfigNode::new("Instances");
        node.add_value("RadialPosition", "1,2,3");
        assert!(matches!(
            StaticObject::from_record(&node, "m", "c"),
            Err(ValueError::Missing { .. })
        ));
    }

    #[test]
    fn test_record_round_trip_keeps_id() {
        let mut obj = StaticObject::from_record(&record(), "Town/hangar", "c").unwrap();
        obj.object_id = "-12345.67".to_string();

        let again = StaticObject::from_record(&obj.to_record("Instances"), "Town/hangar", "c").unwrap();
        assert_eq!(again, obj);
    }

    #[test]
    fn test_generated_ids_are_seedable() {
        let obj = StaticObject::new("Town/hangar", "c");
        let a = obj.generate_id(&mut StdRng::seed_from_u64(7));
        let b = obj.generate_id(&mut StdRng::seed_from_u64(7));
        let c = obj.generate_id(&mut StdRng::seed_from_u64(8));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.split('.').nth(1).map(str::len), Some(2));
    }

    #[test]
    fn test_name_and_nudge() {
        let mut obj = StaticObject::new("Town/Hangar/hangar_big", "c");
        obj.object_id = "42.00".to_string();
        assert_eq!(obj.name_id(), "hangar_big (42.00)");

        obj.nudge(Axis::Y, 0.5);
        obj.nudge(Axis::Y, 1.0);
        obj.nudge(Axis::Z, -1.0);
        assert_eq!(obj.relative_position, Vector3::new(0.0, 1.5, -1.0));
        assert_eq!(OrientationPreset::Back.vector(), Vector3::new(0.0, 0.0, -1.0));
    }
}
