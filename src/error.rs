//! Error types shared across the crate.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::config::ValueError;

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config database error")]
    Database(#[from] anyhow::Error),

    #[error("definition `{url}` has no `mesh` value")]
    MissingMesh { url: String },

    #[error("definition url `{url}` is too short to derive a model identity")]
    InvalidUrl { url: String },

    #[error("model `{model}` from `{url}` is already defined by `{existing}`")]
    DuplicateModel {
        model: String,
        url: String,
        existing: String,
    },

    #[error("instance record #{index} of `{url}` is malformed")]
    InvalidInstance {
        url: String,
        index: usize,
        #[source]
        source: ValueError,
    },

    #[error("no config node at `{0}`")]
    MissingConfigNode(String),

    #[error("unknown model `{0}`")]
    UnknownModel(String),

    #[error("celestial body `{0}` is not loaded")]
    BodyNotFound(String),

    #[error("no active body")]
    NoActiveBody,

    #[error("no observer position available")]
    NoObserver,

    #[error("no instance is selected")]
    NoSelection,

    #[error("failed to write `{path}`")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
