//! # Placement Module
//!
//! Positions and orients static instances on the surface of spherical bodies.
//!
//! ## Key Components
//!
//! - [`BodyProjection`] - World, body-relative and geographic conversions for one body
//! - [`BodyResolver`] - Looks bodies up by name
//! - [`SphericalBody`] / [`BodyCatalog`] - Self-contained implementations of both
//! - [`Reorientation`] - What the scene host needs to pose an instance on its body
//!
//! Instances store their position in the body's non-rotating frame, so they
//! survive the body moving or spinning between sessions. Latitude and
//! longitude are derived from that position and never persisted.

pub mod body;
pub mod engine;

pub use body::{BodyCatalog, BodyProjection, BodyResolver, SphericalBody};
pub use engine::{
    build_reorientation, compute_surface_radius_offset, derive_latitude, derive_longitude,
    refresh_coordinates, resolve_initial_placement, Reorientation, SurfacePose, GLOBAL_UP,
};
