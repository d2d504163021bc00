use crate::error::{Error, Result};

/// A placeable asset: one static definition and the model it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDefinition {
    /// Asset directory of the definition joined with the mesh name, extension stripped
    pub model_identity: String,
    /// Url of the definition node in the config database
    pub config_identity: String,
    /// The `mesh` value as declared
    pub mesh: String,
}

impl ModelDefinition {
    /// Builds the definition for the node at `config_url` declaring `mesh`.
    ///
    /// Definitions live at `<dir>/<asset>/<file>/<NODE>`; the model sits in the
    /// asset directory, so the identity is `<dir>/<asset>/<mesh stem>`.
    pub fn new(config_url: &str, mesh: Option<&str>) -> Result<Self> {
        let mesh = mesh.map(str::trim).unwrap_or_default();
        if mesh.is_empty() {
            return Err(Error::MissingMesh {
                url: config_url.to_string(),
            });
        }

        let model_identity = derive_model_identity(config_url, mesh).ok_or_else(|| Error::InvalidUrl {
            url: config_url.to_string(),
        })?;

        Ok(Self {
            model_identity,
            config_identity: config_url.to_string(),
            mesh: mesh.to_string(),
        })
    }

    /// Last path segment of the model identity
    pub fn short_name(&self) -> &str {
        self.model_identity
            .rsplit('/')
            .next()
            .unwrap_or(&self.model_identity)
    }
}

/// Joins the definition's asset directory with the mesh name minus its extension.
///
/// Returns `None` when `config_url` has fewer than three segments.
pub fn derive_model_identity(config_url: &str, mesh: &str) -> Option<String> {
    let mut parts = config_url.rsplitn(3, '/');
    let _node = parts.next()?;
    let _file = parts.next()?;
    let dir = parts.next().filter(|d| !d.is_empty())?;

    Some(format!("{}/{}", dir, strip_extension(mesh)))
}

fn strip_extension(mesh: &str) -> &str {
    let name_start = mesh.rfind('/').map_or(0, |i| i + 1);
    match mesh[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &mesh[..name_start + dot],
        _ => mesh,
    }
}
