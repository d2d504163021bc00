//! The editing session: one context object owning the index, the registry,
//! the selection and the active body, driven by operator commands and scene
//! notifications.
//!
//! The session is single-threaded. Hosts that edit from several threads
//! should put the whole session behind one `Mutex`.

use std::collections::HashSet;

use cgmath::{InnerSpace, Vector3};
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::{ConfigDatabase, EditorSettings},
    error::{Error, Result},
    placement::{
        build_reorientation, compute_surface_radius_offset, refresh_coordinates,
        resolve_initial_placement, BodyProjection, BodyResolver, GLOBAL_UP,
    },
    scene::{EditorEvent, EventBus, SceneEvent, SceneHost, SubscriptionId},
    statics::{
        Axis, ConfigIndex, InstanceKey, InstanceRegistry, OrientationPreset, PersistenceWriter,
        SaveReport, SelectionChange, StaticObject,
    },
};

/// Granularity of a nudge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSize {
    Fine,
    Coarse,
}

/// Everything one editing session works on.
#[derive(Debug)]
pub struct EditorSession {
    settings: EditorSettings,
    index: ConfigIndex,
    registry: InstanceRegistry,
    rng: StdRng,
    current_body: Option<String>,
    /// Instances the scene host currently has a renderable for
    live: HashSet<InstanceKey>,
    events: EventBus<EditorEvent>,
}

impl EditorSession {
    /// Indexes `db` and hydrates the registry from its saved instances.
    ///
    /// Nothing is instantiated until the scene reports it is ready.
    pub fn load(db: &ConfigDatabase, settings: EditorSettings) -> Self {
        Self::load_with_rng(db, settings, StdRng::from_os_rng())
    }

    /// Like [`load`](Self::load) with a fixed id seed
    pub fn load_seeded(db: &ConfigDatabase, settings: EditorSettings, seed: u64) -> Self {
        Self::load_with_rng(db, settings, StdRng::seed_from_u64(seed))
    }

    fn load_with_rng(db: &ConfigDatabase, settings: EditorSettings, mut rng: StdRng) -> Self {
        let mut registry = InstanceRegistry::new();
        let index = ConfigIndex::load(db, &settings, &mut registry, &mut rng);
        Self {
            settings,
            index,
            registry,
            rng,
            current_body: None,
            live: HashSet::new(),
            events: EventBus::new(),
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn index(&self) -> &ConfigIndex {
        &self.index
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn current_body(&self) -> Option<&str> {
        self.current_body.as_deref()
    }

    pub fn selected(&self) -> Option<&StaticObject> {
        self.registry.selected_object()
    }

    pub fn instance(&self, key: InstanceKey) -> Option<&StaticObject> {
        self.registry.get(key)
    }

    /// Whether the scene host holds a renderable for `key`
    pub fn is_live(&self, key: InstanceKey) -> bool {
        self.live.contains(&key)
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Reacts to a scene notification.
    ///
    /// Both events make the named body current and instantiate every
    /// instance whose body is now resolvable and which is not live yet.
    /// Returns the number of instances instantiated.
    pub fn handle_scene_event(
        &mut self,
        event: &SceneEvent,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> usize {
        match event {
            SceneEvent::SceneReady { body } => {
                info!("Scene ready on {}", body);
                self.current_body = Some(body.clone());
            }
            SceneEvent::BodyChanged { from, to } => {
                debug!("Body changed {:?} -> {}", from, to);
                self.current_body = Some(to.clone());
            }
        }
        self.instantiate_pending(host, bodies)
    }

    fn instantiate_pending(&mut self, host: &mut dyn SceneHost, bodies: &dyn BodyResolver) -> usize {
        let observer = host.observer_world_position();
        let mut count = 0;

        for key in self.registry.keys() {
            if self.live.contains(&key) {
                continue;
            }
            let Some(instance) = self.registry.get(key) else {
                continue;
            };
            if instance.body_name.is_empty() {
                match self.current_body.as_deref() {
                    Some(current) => {
                        self.registry.rebind_body(key, current);
                    }
                    None => {
                        warn!("{} has no body and no body is active", instance.name_id());
                        continue;
                    }
                }
            }

            let Some(instance) = self.registry.get_mut(key) else {
                continue;
            };
            let Some(body) = bodies.resolve(&instance.body_name) else {
                debug!("{} waits for body {}", instance.name_id(), instance.body_name);
                continue;
            };
            if !resolve_initial_placement(instance, body, observer) {
                continue;
            }
            refresh_coordinates(instance, Some(body));
            host.instantiate(key, instance, &build_reorientation(instance));
            self.live.insert(key);
            count += 1;
        }

        if count > 0 {
            info!("Instantiated {} static objects", count);
        }
        count
    }

    /// Places a new instance of `model_identity` at the observer on the
    /// current body and selects it.
    pub fn create_instance(
        &mut self,
        model_identity: &str,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<InstanceKey> {
        let config_identity = self
            .index
            .config_identity(model_identity)
            .ok_or_else(|| Error::UnknownModel(model_identity.to_string()))?
            .to_string();
        let body_name = self.current_body.clone().ok_or(Error::NoActiveBody)?;
        let body = bodies
            .resolve(&body_name)
            .ok_or_else(|| Error::BodyNotFound(body_name.clone()))?;
        let observer = host.observer_world_position().ok_or(Error::NoObserver)?;

        let key = self.registry.create(
            model_identity,
            &config_identity,
            &body_name,
            compute_surface_radius_offset(body, observer),
            &self.settings,
            &mut self.rng,
        )?;
        let Some(instance) = self.registry.get_mut(key) else {
            return Err(Error::UnknownModel(model_identity.to_string()));
        };
        resolve_initial_placement(instance, body, Some(observer));
        refresh_coordinates(instance, Some(body));
        host.instantiate(key, instance, &build_reorientation(instance));
        self.live.insert(key);
        info!("Created {}", instance);

        self.events.emit(&EditorEvent::InstanceCreated {
            key,
            model_identity: model_identity.to_string(),
        });
        self.select(Some(key), host);
        Ok(key)
    }

    /// Selects `key` (or nothing) and updates the highlights
    pub fn select(&mut self, key: Option<InstanceKey>, host: &mut dyn SceneHost) -> SelectionChange {
        let change = self.registry.select(key);
        if change.is_empty() {
            return change;
        }

        host.apply_selection(SelectionChange {
            deselected: change.deselected.filter(|k| self.live.contains(k)),
            selected: change.selected.filter(|k| self.live.contains(k)),
        });
        self.events.emit(&EditorEvent::SelectionChanged(change));
        change
    }

    /// Removes an instance and disposes its renderable.
    ///
    /// Unknown keys are ignored.
    pub fn remove(&mut self, key: InstanceKey, host: &mut dyn SceneHost) -> Option<StaticObject> {
        let model_identity = self.registry.get(key)?.model_identity.clone();
        let was_selected = self.registry.selected() == Some(key);
        let removed = self.registry.remove(&model_identity, key)?;

        if self.live.remove(&key) {
            if was_selected {
                host.set_highlighted(key, false);
            }
            host.dispose(key);
        }
        info!("Removed {}", removed.name_id());

        self.events.emit(&EditorEvent::InstanceRemoved { key, model_identity });
        if was_selected {
            self.events.emit(&EditorEvent::SelectionChanged(SelectionChange {
                deselected: Some(key),
                selected: None,
            }));
        }
        Some(removed)
    }

    /// Removes the selected instance, if any
    pub fn delete_selected(&mut self, host: &mut dyn SceneHost) -> Option<StaticObject> {
        let key = self.registry.selected()?;
        self.remove(key, host)
    }

    /// Moves the selection along one axis by `steps` fine or coarse steps
    pub fn nudge(
        &mut self,
        axis: Axis,
        steps: f32,
        size: StepSize,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        let delta = steps * self.step(size);
        self.edit_selected(host, bodies, |obj, _| obj.nudge(axis, delta))
    }

    pub fn set_position(
        &mut self,
        position: Vector3<f32>,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        self.edit_selected(host, bodies, |obj, _| obj.relative_position = position)
    }

    pub fn nudge_radius_offset(
        &mut self,
        steps: f32,
        size: StepSize,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        let delta = steps * self.step(size);
        self.edit_selected(host, bodies, |obj, _| obj.radius_offset += delta)
    }

    pub fn set_radius_offset(
        &mut self,
        offset: f32,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        self.edit_selected(host, bodies, |obj, _| obj.radius_offset = offset)
    }

    pub fn set_orientation_preset(
        &mut self,
        preset: OrientationPreset,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        self.set_orientation(preset.vector(), host, bodies)
    }

    /// Sets the model axis that is turned onto the surface normal; a zero
    /// vector falls back to global up
    pub fn set_orientation(
        &mut self,
        up: Vector3<f32>,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        let up = if up.magnitude2() > f32::EPSILON { up } else { GLOBAL_UP };
        self.edit_selected(host, bodies, |obj, _| obj.up_orientation = up)
    }

    /// Sets the spin about the surface normal, clamped to the configured limits
    pub fn set_rotation(
        &mut self,
        degrees: f32,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        self.edit_selected(host, bodies, |obj, settings| {
            obj.rotation_angle = settings.clamp_rotation(degrees)
        })
    }

    pub fn set_visibility_range(
        &mut self,
        range: f32,
        host: &mut dyn SceneHost,
        bodies: &dyn BodyResolver,
    ) -> Result<()> {
        self.edit_selected(host, bodies, |obj, _| obj.visibility_range = range.max(0.0))
    }

    fn step(&self, size: StepSize) -> f32 {
        match size {
            StepSize::Fine => self.settings.fine_step,
            StepSize::Coarse => self.settings.coarse_step,
        }
    }

    fn edit_selected<F>(&mut self, host: &mut dyn SceneHost, bodies: &dyn BodyResolver, edit: F) -> Result<()>
    where
        F: FnOnce(&mut StaticObject, &EditorSettings),
    {
        let key = self.registry.selected().ok_or(Error::NoSelection)?;
        let instance = self.registry.get_mut(key).ok_or(Error::NoSelection)?;
        edit(instance, &self.settings);

        let body: Option<&dyn BodyProjection> = bodies.resolve(&instance.body_name);
        refresh_coordinates(instance, body);
        if self.live.contains(&key) {
            host.reorient(key, &build_reorientation(instance));
        }
        Ok(())
    }

    /// Writes every tracked model back to its definition file
    pub fn save(&mut self, db: &mut ConfigDatabase) -> SaveReport {
        let report = PersistenceWriter::new(&self.settings).save(&self.registry, &self.index, db);
        self.events.emit(&EditorEvent::Saved {
            written: report.written.len(),
            failed: report.failed.len(),
        });
        report
    }
}
