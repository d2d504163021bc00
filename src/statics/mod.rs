//! # Statics Module
//!
//! Static scenery: the definitions found in the config database, the live
//! instances placed from them, and writing those instances back.
//!
//! ## Key Components
//!
//! - [`ModelDefinition`] - One definition node and the model identity it declares
//! - [`ConfigIndex`] - Model identity to definition url, built on load
//! - [`StaticObject`] - One placed instance and its persisted record
//! - [`InstanceRegistry`] - Live instances grouped by model, plus the selection
//! - [`PersistenceWriter`] - Regenerates instance records and rewrites their files
//!
//! ## Usage
//!
//! ```no_run
//! use planetside::config::{ConfigDatabase, EditorSettings};
//! use planetside::statics::{ConfigIndex, InstanceRegistry, PersistenceWriter};
//!
//! let mut db = ConfigDatabase::load("GameData").unwrap();
//! let settings = EditorSettings::from_database(&db);
//! let mut registry = InstanceRegistry::new();
//! let index = ConfigIndex::load(&db, &settings, &mut registry, &mut rand::rng());
//!
//! let report = PersistenceWriter::new(&settings).save(&registry, &index, &mut db);
//! assert!(report.is_success());
//! ```

pub mod index;
pub mod model;
pub mod object;
pub mod registry;
pub mod writer;

pub use index::ConfigIndex;
pub use model::ModelDefinition;
pub use object::{Axis, InstanceKey, OrientationPreset, StaticObject};
pub use registry::{InstanceRegistry, SelectionChange};
pub use writer::{PersistenceWriter, SaveReport};
