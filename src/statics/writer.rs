use std::{path::PathBuf, time::Instant};

use log::{error, info};

use super::{index::ConfigIndex, registry::InstanceRegistry};
use crate::{
    config::{ConfigDatabase, EditorSettings},
    error::Error,
};

/// Outcome of a save pass.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Files rewritten, in write order
    pub written: Vec<PathBuf>,
    /// Models or files that could not be saved
    pub failed: Vec<Error>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes the registry back into the definition files it came from.
pub struct PersistenceWriter<'a> {
    settings: &'a EditorSettings,
}

impl<'a> PersistenceWriter<'a> {
    pub fn new(settings: &'a EditorSettings) -> Self {
        Self { settings }
    }

    /// Regenerates the instance records of every model in `registry` and
    /// rewrites each file holding one of their definitions.
    ///
    /// Existing records are dropped and rebuilt from the registry; all other
    /// content of the definitions and of their files passes through as loaded.
    /// Models with no instances still have their file rewritten (with no
    /// records). A failure on one model or file is reported and the pass
    /// carries on with the rest.
    pub fn save(&self, registry: &InstanceRegistry, index: &ConfigIndex, db: &mut ConfigDatabase) -> SaveReport {
        let start = Instant::now();
        let mut report = SaveReport::default();
        let mut files: Vec<String> = Vec::new();
        let tag = &self.settings.instances_tag;

        for model in registry.models() {
            let Some(url) = index
                .config_identity(model)
                .or_else(|| registry.config_identity(model))
            else {
                report.failed.push(Error::UnknownModel(model.to_string()));
                continue;
            };

            let Some(node) = db.get_node_mut(url) else {
                error!("No definition node at {} for {}", url, model);
                report.failed.push(Error::MissingConfigNode(url.to_string()));
                continue;
            };

            node.remove_nodes(tag);
            for instance in registry.instances(model) {
                node.add_node(instance.to_record(tag));
            }

            let file_url = ConfigDatabase::file_url_of(url);
            if !files.iter().any(|f| f == file_url) {
                files.push(file_url.to_string());
            }
        }

        for file_url in &files {
            match db.write_file(file_url, &self.settings.header) {
                Ok(path) => report.written.push(path),
                Err(e) => {
                    error!("Failed to save {}: {}", file_url, e);
                    report.failed.push(e);
                }
            }
        }

        info!(
            "Saved static objects to {} files, {} failures ({}ms)",
            report.written.len(),
            report.failed.len(),
            start.elapsed().as_millis()
        );
        report
    }
}
