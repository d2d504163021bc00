//! # Config Module
//!
//! The structured text config format that static definitions and their
//! instance records are stored in, and the database of parsed files.
//!
//! ## Key Components
//!
//! - [`ConfigNode`] - A named node with ordered values and child nodes
//! - [`parse`] / [`to_string`] - Text reader and writer for the format
//! - [`ConfigDatabase`] - Every `.cfg` file below a root directory, addressable by url
//! - [`EditorSettings`] - Editor defaults, optionally overridden from the database
//!
//! ## Format
//!
//! ```text
//! // comment
//! STATIC
//! {
//!     mesh = hangar.mu
//!     Instances
//!     {
//!         RadialPosition = 157000,-12000,600000
//!         RotationAngle = 90
//!     }
//! }
//! ```
//!
//! A file at `Town/Hangar/hangar.cfg` has url `Town/Hangar/hangar`, and its
//! `STATIC` node has url `Town/Hangar/hangar/STATIC`.

pub mod database;
pub mod node;
pub mod parser;
pub mod settings;
pub mod value;
pub mod writer;

pub use database::{ConfigDatabase, ConfigFile, UrlConfig};
pub use node::ConfigNode;
pub use parser::{parse, ParseError};
pub use settings::EditorSettings;
pub use value::ValueError;
pub use writer::to_string;
