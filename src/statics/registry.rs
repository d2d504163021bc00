//! The live set of placed instances, grouped by model.

use std::collections::BTreeMap;

use log::{debug, warn};
use rand::Rng;

use super::object::{InstanceKey, StaticObject};
use crate::{
    config::EditorSettings,
    error::{Error, Result},
    placement::engine::GLOBAL_UP,
};

#[derive(Debug, Clone)]
struct ModelInstances {
    config_identity: String,
    instances: Vec<StaticObject>,
}

/// What a selection call changed, in the order the highlights must be updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// Clear this highlight first
    pub deselected: Option<InstanceKey>,
    /// Then set this one
    pub selected: Option<InstanceKey>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.deselected.is_none() && self.selected.is_none()
    }
}

/// Model identity to ordered instance list, plus the single selection.
///
/// Models are kept in identity order so listings and saves are deterministic;
/// instances keep insertion order within their model.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    models: BTreeMap<String, ModelInstances>,
    selected: Option<InstanceKey>,
    next_key: u64,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model with its owning definition.
    ///
    /// A model belongs to exactly one definition; registering it again with a
    /// different config identity is an error.
    pub fn ensure_model(&mut self, model_identity: &str, config_identity: &str) -> Result<()> {
        match self.models.get(model_identity) {
            Some(entry) if entry.config_identity != config_identity => Err(Error::DuplicateModel {
                model: model_identity.to_string(),
                url: config_identity.to_string(),
                existing: entry.config_identity.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.models.insert(
                    model_identity.to_string(),
                    ModelInstances {
                        config_identity: config_identity.to_string(),
                        instances: Vec::new(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Adds an existing instance (typically one loaded from a config file).
    ///
    /// The instance keeps its stored object id unless that is empty or already
    /// taken within its model, in which case a fresh one is drawn.
    pub fn insert<R: Rng>(&mut self, mut instance: StaticObject, rng: &mut R) -> Result<InstanceKey> {
        self.ensure_model(&instance.model_identity, &instance.config_identity)?;

        self.next_key += 1;
        let key = InstanceKey(self.next_key);
        instance.key = key;

        let Some(entry) = self.models.get_mut(&instance.model_identity) else {
            return Err(Error::UnknownModel(instance.model_identity));
        };
        if instance.object_id.is_empty() || entry.instances.iter().any(|o| o.object_id == instance.object_id) {
            if !instance.object_id.is_empty() {
                warn!(
                    "Duplicate object id {} under {}, assigning a new one",
                    instance.object_id, instance.model_identity
                );
            }
            instance.object_id = unique_id(&entry.instances, &instance, rng);
        }

        debug!("Registered {} as {}", instance.name_id(), key);
        entry.instances.push(instance);
        Ok(key)
    }

    /// Creates a default instance of a model on `body_name`.
    ///
    /// The new instance has the zero position sentinel, no rotation, global up,
    /// the given starting altitude and the default visibility range. It is not
    /// selected; callers select it once the scene host has instantiated it.
    pub fn create<R: Rng>(
        &mut self,
        model_identity: &str,
        config_identity: &str,
        body_name: &str,
        radius_offset: f32,
        settings: &EditorSettings,
        rng: &mut R,
    ) -> Result<InstanceKey> {
        let mut instance = StaticObject::new(model_identity, config_identity);
        instance.radius_offset = radius_offset;
        instance.up_orientation = GLOBAL_UP;
        instance.visibility_range = settings.default_visibility_range;
        instance.body_name = body_name.to_string();
        self.insert(instance, rng)
    }

    /// Removes an instance of `model_identity`.
    ///
    /// Missing instances are ignored so a stale handle never fails. Removing
    /// the selected instance clears the selection.
    pub fn remove(&mut self, model_identity: &str, key: InstanceKey) -> Option<StaticObject> {
        let list = &mut self.models.get_mut(model_identity)?.instances;
        let index = list.iter().position(|o| o.key == key)?;
        let removed = list.remove(index);

        if self.selected == Some(key) {
            self.selected = None;
        }
        debug!("Removed {}", removed.name_id());
        Some(removed)
    }

    /// Selects `key` (or nothing), reporting which highlights change.
    ///
    /// Unknown keys select nothing. Re-selecting the current instance changes
    /// nothing.
    pub fn select(&mut self, key: Option<InstanceKey>) -> SelectionChange {
        let key = match key {
            Some(k) if self.get(k).is_none() => {
                warn!("Cannot select unknown instance {}", k);
                None
            }
            other => other,
        };
        if key == self.selected {
            return SelectionChange::default();
        }

        let change = SelectionChange {
            deselected: self.selected,
            selected: key,
        };
        self.selected = key;
        change
    }

    pub fn selected(&self) -> Option<InstanceKey> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&StaticObject> {
        self.get(self.selected?)
    }

    pub fn selected_object_mut(&mut self) -> Option<&mut StaticObject> {
        let key = self.selected?;
        self.get_mut(key)
    }

    /// Finds an instance by object id within one model
    pub fn lookup(&self, object_id: &str, model_identity: &str) -> Option<&StaticObject> {
        self.instances(model_identity)
            .iter()
            .find(|o| o.object_id == object_id)
    }

    pub fn get(&self, key: InstanceKey) -> Option<&StaticObject> {
        self.models
            .values()
            .flat_map(|m| m.instances.iter())
            .find(|o| o.key == key)
    }

    pub fn get_mut(&mut self, key: InstanceKey) -> Option<&mut StaticObject> {
        self.models
            .values_mut()
            .flat_map(|m| m.instances.iter_mut())
            .find(|o| o.key == key)
    }

    /// Moves an instance onto another body; its derived coordinates are stale
    /// until the next placement refresh
    pub fn rebind_body(&mut self, key: InstanceKey, body_name: &str) -> bool {
        match self.get_mut(key) {
            Some(obj) => {
                obj.body_name = body_name.to_string();
                true
            }
            None => false,
        }
    }

    /// Instances of one model in insertion order
    pub fn instances(&self, model_identity: &str) -> &[StaticObject] {
        self.models
            .get(model_identity)
            .map(|m| m.instances.as_slice())
            .unwrap_or(&[])
    }

    /// Model identities in order, including ones without instances
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn config_identity(&self, model_identity: &str) -> Option<&str> {
        self.models
            .get(model_identity)
            .map(|m| m.config_identity.as_str())
    }

    pub fn contains_model(&self, model_identity: &str) -> bool {
        self.models.contains_key(model_identity)
    }

    /// Every instance, model by model
    pub fn iter(&self) -> impl Iterator<Item = &StaticObject> {
        self.models.values().flat_map(|m| m.instances.iter())
    }

    pub fn keys(&self) -> Vec<InstanceKey> {
        self.iter().map(|o| o.key).collect()
    }

    /// Total number of instances
    pub fn len(&self) -> usize {
        self.models.values().map(|m| m.instances.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

fn unique_id<R: Rng>(existing: &[StaticObject], instance: &StaticObject, rng: &mut R) -> String {
    loop {
        let id = instance.generate_id(rng);
        if !existing.iter().any(|o| o.object_id == id) {
            return id;
        }
    }
}
