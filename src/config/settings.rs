use log::{info, warn};

use super::{database::ConfigDatabase, node::ConfigNode, value::parse_float};

/// Name of the optional top-level node that overrides [`EditorSettings`]
pub const SETTINGS_NODE: &str = "STATIC_EDITOR";

/// Editor-wide settings.
///
/// Defaults match the stock layout of static definitions; any of them can be
/// overridden by a `STATIC_EDITOR` node somewhere in the config database.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    /// Tag of top-level definition nodes
    pub static_tag: String,
    /// Tag of instance records nested in a definition
    pub instances_tag: String,
    pub default_visibility_range: f32,
    pub fine_step: f32,
    pub coarse_step: f32,
    pub min_rotation: f32,
    pub max_rotation: f32,
    /// Comment written at the top of every generated file
    pub header: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            static_tag: "STATIC".to_string(),
            instances_tag: "Instances".to_string(),
            default_visibility_range: 1000.0,
            fine_step: 0.5,
            coarse_step: 1.0,
            min_rotation: 0.0,
            max_rotation: 359.0,
            header: format!(" Generated by planetside {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl EditorSettings {
    pub fn with_static_tag(mut self, tag: impl Into<String>) -> Self {
        self.static_tag = tag.into();
        self
    }

    pub fn with_instances_tag(mut self, tag: impl Into<String>) -> Self {
        self.instances_tag = tag.into();
        self
    }

    pub fn with_default_visibility_range(mut self, range: f32) -> Self {
        self.default_visibility_range = range;
        self
    }

    pub fn with_steps(mut self, fine: f32, coarse: f32) -> Self {
        self.fine_step = fine;
        self.coarse_step = coarse;
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Defaults overridden by the first `STATIC_EDITOR` node in `db`, if any
    pub fn from_database(db: &ConfigDatabase) -> Self {
        match db.configs_of_type(SETTINGS_NODE).next() {
            Some(found) => {
                info!("Using editor settings from {}", found.url());
                Self::default().overridden_by(found.config)
            }
            None => Self::default(),
        }
    }

    /// Applies every recognised value of `node`; unparseable numbers keep the
    /// current setting
    pub fn overridden_by(mut self, node: &ConfigNode) -> Self {
        for (key, value) in node.values() {
            let slot = match key.as_str() {
                "staticTag" => {
                    self.static_tag = value.clone();
                    continue;
                }
                "instancesTag" => {
                    self.instances_tag = value.clone();
                    continue;
                }
                "header" => {
                    self.header = format!(" {}", value);
                    continue;
                }
                "defaultVisibilityRange" => &mut self.default_visibility_range,
                "fineStep" => &mut self.fine_step,
                "coarseStep" => &mut self.coarse_step,
                "minRotation" => &mut self.min_rotation,
                "maxRotation" => &mut self.max_rotation,
                other => {
                    warn!("Unknown editor setting `{}`", other);
                    continue;
                }
            };
            match parse_float(key, value) {
                Ok(v) => *slot = v,
                Err(e) => warn!("Ignoring editor setting: {}", e),
            }
        }

        if self.min_rotation > self.max_rotation {
            warn!(
                "Rotation limits {}..{} are inverted, using defaults",
                self.min_rotation, self.max_rotation
            );
            let defaults = Self::default();
            self.min_rotation = defaults.min_rotation;
            self.max_rotation = defaults.max_rotation;
        }
        self
    }

    /// Clamps a rotation angle into the configured limits
    pub fn clamp_rotation(&self, angle: f32) -> f32 {
        angle.clamp(self.min_rotation, self.max_rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EditorSettings::default();
        assert_eq!(settings.static_tag, "STATIC");
        assert_eq!(settings.instances_tag, "Instances");
        assert_eq!(settings.default_visibility_range, 1000.0);
        assert_eq!(settings.clamp_rotation(400.0), 359.0);
        assert_eq!(settings.clamp_rotation(-3.0), 0.0);
    }

    #[test]
    fn test_override_from_database() {
        let mut db = ConfigDatabase::new("GameData");
        db.insert_file(
            "editor",
            "STATIC_EDITOR\n{\n defaultVisibilityRange = 2500\n fineStep = oops\n coarseStep = 10\n bogus = 1\n}\n",
        )
        .unwrap();

        let settings = EditorSettings::from_database(&db);
        assert_eq!(settings.default_visibility_range, 2500.0);
        assert_eq!(settings.fine_step, 0.5);
        assert_eq!(settings.coarse_step, 10.0);
    }

    #[test]
    fn test_inverted_rotation_limits_fall_back() {
        let mut node = ConfigNode::new(SETTINGS_NODE);
        node.add_value("minRotation", "300");
        node.add_value("maxRotation", "10");

        let settings = EditorSettings::default().overridden_by(&node);
        assert_eq!(settings.min_rotation, 0.0);
        assert_eq!(settings.max_rotation, 359.0);
    }
}
