//! Surface placement math.
//!
//! Everything here is a pure function of an instance and a body projection.
//! The scene host applies the resulting [`Reorientation`] to whatever it uses
//! to draw the instance.

use cgmath::{Deg, InnerSpace, Matrix4, Quaternion, Rotation3, Vector3, Zero};
use log::warn;

use super::body::BodyProjection;
use crate::statics::StaticObject;

/// Up before reprojection onto the sphere
pub const GLOBAL_UP: Vector3<f32> = Vector3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

/// Seeds the sentinel fields of a freshly created or freshly loaded instance.
///
/// A zero relative position becomes the observer's position relative to
/// `body`; a zero orientation becomes [`GLOBAL_UP`]. Fields that are already
/// non-zero are never touched. Returns `false` when the position is still the
/// sentinel because no observer position was available.
pub fn resolve_initial_placement(
    instance: &mut StaticObject,
    body: &dyn BodyProjection,
    fallback_world: Option<Vector3<f64>>,
) -> bool {
    if instance.up_orientation.is_zero() {
        instance.up_orientation = GLOBAL_UP;
    }

    if instance.relative_position.is_zero() {
        match fallback_world {
            Some(world) => {
                let rel = body.relative_position(world);
                instance.relative_position = Vector3::new(rel.x as f32, rel.y as f32, rel.z as f32);
            }
            None => {
                warn!("{} has no position and no observer to seed it from", instance.name_id());
                return false;
            }
        }
    }
    true
}

/// Latitude of a relative position, or `0.0` (with a warning) without a body
pub fn derive_latitude(body: Option<&dyn BodyProjection>, relative: Vector3<f32>) -> f64 {
    match body {
        Some(body) => body.latitude(body.world_position(widen(relative))),
        None => {
            warn!("No body to derive latitude from");
            0.0
        }
    }
}

/// Longitude of a relative position, or `0.0` (with a warning) without a body
pub fn derive_longitude(body: Option<&dyn BodyProjection>, relative: Vector3<f32>) -> f64 {
    match body {
        Some(body) => body.longitude(body.world_position(widen(relative))),
        None => {
            warn!("No body to derive longitude from");
            0.0
        }
    }
}

/// Recomputes the derived latitude and longitude of `instance`
pub fn refresh_coordinates(instance: &mut StaticObject, body: Option<&dyn BodyProjection>) {
    instance.latitude = derive_latitude(body, instance.relative_position);
    instance.longitude = derive_longitude(body, instance.relative_position);
}

/// Signed altitude of an observer above the body's nominal radius.
///
/// Computed as `rel.x / normalize(rel).x - radius`. When the x component of
/// the direction is (near) zero that quotient is undefined, and the distance
/// `|rel| - radius` is used instead; the two agree wherever both exist.
pub fn compute_surface_radius_offset(body: &dyn BodyProjection, observer_world: Vector3<f64>) -> f32 {
    let rel = body.relative_position(observer_world);
    let distance = rel.magnitude();
    if distance.is_zero() {
        return -body.radius() as f32;
    }

    let dir = rel / distance;
    let altitude = if dir.x.abs() > 1e-9 {
        rel.x / dir.x
    } else {
        distance
    };
    (altitude - body.radius()) as f32
}

/// Parameters the scene host needs to place an instance on its body's sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reorientation {
    /// Spin about the surface normal, in degrees
    pub final_rotation_angle: f32,
    /// Model axis that should end up along the surface normal
    pub initial_up: Vector3<f32>,
    pub reposition_radial: Vector3<f32>,
    pub reposition_radius_offset: f32,
    pub reproject_to_sphere: bool,
    pub reorient_to_sphere: bool,
}

/// Builds the reorientation for the current state of `instance`
pub fn build_reorientation(instance: &StaticObject) -> Reorientation {
    Reorientation {
        final_rotation_angle: instance.rotation_angle,
        initial_up: instance.up_orientation,
        reposition_radial: instance.relative_position,
        reposition_radius_offset: instance.radius_offset,
        reproject_to_sphere: true,
        reorient_to_sphere: true,
    }
}

/// Local transform of an instance relative to its body's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePose {
    pub translation: Vector3<f64>,
    pub rotation: Quaternion<f32>,
}

impl SurfacePose {
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let t = Vector3::new(
            self.translation.x as f32,
            self.translation.y as f32,
            self.translation.z as f32,
        );
        Matrix4::from_translation(t) * Matrix4::from(self.rotation)
    }
}

impl Reorientation {
    /// Resolves the parameters into a pose on a sphere of `radius`.
    ///
    /// The instance is spun by the final angle about its initial up axis,
    /// then rotated so that axis points along the surface normal at the
    /// radial direction.
    pub fn surface_pose(&self, radius: f64) -> SurfacePose {
        let initial_up = unit_or_up(self.initial_up);
        let normal = unit_or_up(self.reposition_radial);

        let translation = if self.reproject_to_sphere {
            widen(normal) * (radius + f64::from(self.reposition_radius_offset))
        } else {
            widen(self.reposition_radial)
        };

        let spin = Quaternion::from_axis_angle(initial_up, Deg(self.final_rotation_angle));
        let rotation = if self.reorient_to_sphere {
            Quaternion::from_arc(initial_up, normal, None) * spin
        } else {
            spin
        };

        SurfacePose {
            translation,
            rotation,
        }
    }
}

fn unit_or_up(v: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() > f32::EPSILON {
        v.normalize()
    } else {
        GLOBAL_UP
    }
}

fn widen(v: Vector3<f32>) -> Vector3<f64> {
    Vector3::new(f64::from(v.x), f64::from(v.y), f64::from(v.z))
}
