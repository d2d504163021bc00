// src/lib.rs
//! Planetside
//!
//! Places, edits and persists static scenery objects on the surface of
//! spherical bodies, with instances stored in structured text config files.

pub mod config;
pub mod error;
pub mod placement;
pub mod prelude;
pub mod scene;
pub mod session;
pub mod statics;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use session::EditorSession;

/// Installs the `env_logger` backend, defaulting to `info` unless `RUST_LOG`
/// says otherwise. Calling it more than once is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
