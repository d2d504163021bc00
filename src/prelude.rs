//! # Planetside Prelude
//!
//! Commonly used types and traits in one import.
//!
//! ```no_run
//! use planetside::prelude::*;
//!
//! planetside::init_logging();
//! let mut db = ConfigDatabase::load("GameData").unwrap();
//! let settings = EditorSettings::from_database(&db);
//! let mut session = EditorSession::load(&db, settings);
//!
//! let bodies = BodyCatalog::new().with(SphericalBody::new("Kerbin", Vector3::new(0.0, 0.0, 0.0), 600_000.0));
//! let mut host = RecordingHost::new(Some(Vector3::new(0.0, 600_100.0, 0.0)));
//! session.handle_scene_event(&SceneEvent::SceneReady { body: "Kerbin".into() }, &mut host, &bodies);
//!
//! session.create_instance("Town/Hangar/hangar", &mut host, &bodies).unwrap();
//! session.set_rotation(90.0, &mut host, &bodies).unwrap();
//! session.save(&mut db);
//! ```

// Session and errors
pub use crate::error::{Error, Result};
pub use crate::session::{EditorSession, StepSize};

// Config database and settings
pub use crate::config::{ConfigDatabase, ConfigNode, EditorSettings};

// Placement
pub use crate::placement::{BodyCatalog, BodyProjection, BodyResolver, Reorientation, SphericalBody, SurfacePose};

// Scene boundary
pub use crate::scene::{EditorEvent, EventBus, RecordingHost, SceneEvent, SceneHost};

// Static objects
pub use crate::statics::{
    Axis, ConfigIndex, InstanceKey, InstanceRegistry, OrientationPreset, PersistenceWriter, SaveReport, StaticObject,
};

// Math
pub use cgmath::{Deg, Vector3};
