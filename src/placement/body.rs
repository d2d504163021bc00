use std::collections::HashMap;

use cgmath::{Deg, InnerSpace, Vector3, Zero};

/// Conversion between world space, a body's local non-rotating frame and its
/// geographic coordinates.
///
/// Hosts implement this for whatever represents a celestial body in their
/// scene; [`SphericalBody`] is a self-contained implementation.
pub trait BodyProjection {
    fn name(&self) -> &str;

    /// Nominal surface radius
    fn radius(&self) -> f64;

    /// World position expressed in the body's local frame
    fn relative_position(&self, world: Vector3<f64>) -> Vector3<f64>;

    /// Inverse of [`relative_position`](Self::relative_position)
    fn world_position(&self, relative: Vector3<f64>) -> Vector3<f64>;

    /// Latitude in degrees of a world position
    fn latitude(&self, world: Vector3<f64>) -> f64;

    /// Longitude in degrees of a world position
    fn longitude(&self, world: Vector3<f64>) -> f64;
}

/// Looks bodies up by name.
///
/// Returns `None` while a body is not loaded yet.
pub trait BodyResolver {
    fn resolve(&self, name: &str) -> Option<&dyn BodyProjection>;
}

/// A sphere with a world-space centre, spinning about its local +Y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalBody {
    pub name: String,
    pub center: Vector3<f64>,
    pub radius: f64,
    /// Current spin; longitudes are measured in the rotating frame
    pub spin: Deg<f64>,
}

impl SphericalBody {
    pub fn new(name: impl Into<String>, center: Vector3<f64>, radius: f64) -> Self {
        Self {
            name: name.into(),
            center,
            radius,
            spin: Deg(0.0),
        }
    }

    pub fn with_spin(mut self, spin: Deg<f64>) -> Self {
        self.spin = spin;
        self
    }

    /// World position of a point at `altitude` above the surface at the given
    /// geographic coordinates
    pub fn surface_point(&self, latitude: Deg<f64>, longitude: Deg<f64>, altitude: f64) -> Vector3<f64> {
        let lat = latitude.0.to_radians();
        let lon = (longitude + self.spin).0.to_radians();
        let r = self.radius + altitude;
        self.center + Vector3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin()) * r
    }
}

impl BodyProjection for SphericalBody {
    fn name(&self) -> &str {
        &self.name
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn relative_position(&self, world: Vector3<f64>) -> Vector3<f64> {
        world - self.center
    }

    fn world_position(&self, relative: Vector3<f64>) -> Vector3<f64> {
        self.center + relative
    }

    fn latitude(&self, world: Vector3<f64>) -> f64 {
        let rel = self.relative_position(world);
        let distance = rel.magnitude();
        if distance.is_zero() {
            return 0.0;
        }
        (rel.y / distance).clamp(-1.0, 1.0).asin().to_degrees()
    }

    fn longitude(&self, world: Vector3<f64>) -> f64 {
        let rel = self.relative_position(world);
        if rel.x.is_zero() && rel.z.is_zero() {
            return 0.0;
        }
        wrap_degrees(rel.z.atan2(rel.x).to_degrees() - self.spin.0)
    }
}

/// Wraps an angle into `(-180, 180]`
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Name to body lookup over a fixed set of [`SphericalBody`]s.
#[derive(Debug, Clone, Default)]
pub struct BodyCatalog {
    bodies: HashMap<String, SphericalBody>,
}

impl BodyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a body, replacing one with the same name
    pub fn insert(&mut self, body: SphericalBody) {
        self.bodies.insert(body.name.clone(), body);
    }

    pub fn with(mut self, body: SphericalBody) -> Self {
        self.insert(body);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<SphericalBody> {
        self.bodies.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&SphericalBody> {
        self.bodies.get(name)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl BodyResolver for BodyCatalog {
    fn resolve(&self, name: &str) -> Option<&dyn BodyProjection> {
        self.bodies.get(name).map(|b| b as &dyn BodyProjection)
    }
}
