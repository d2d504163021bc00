use cgmath::Vector3;

use crate::{
    placement::Reorientation,
    statics::{InstanceKey, SelectionChange, StaticObject},
};

/// Callbacks the editor drives on the scene that renders its instances.
///
/// Implement this for your renderer; the session calls it in direct response
/// to its own operations and never holds on to anything the host returns.
pub trait SceneHost {
    /// World position of the active observer (camera or vessel), if any
    fn observer_world_position(&self) -> Option<Vector3<f64>>;

    /// Create the renderable for `instance` and pose it
    fn instantiate(&mut self, key: InstanceKey, instance: &StaticObject, reorientation: &Reorientation);

    /// Re-pose an instantiated renderable after an edit
    fn reorient(&mut self, key: InstanceKey, reorientation: &Reorientation);

    /// Destroy the renderable; `key` is not used again afterwards
    fn dispose(&mut self, key: InstanceKey);

    fn set_highlighted(&mut self, key: InstanceKey, highlighted: bool);

    /// Applies a selection change, clearing the old highlight before setting the new one
    fn apply_selection(&mut self, change: SelectionChange) {
        if let Some(key) = change.deselected {
            self.set_highlighted(key, false);
        }
        if let Some(key) = change.selected {
            self.set_highlighted(key, true);
        }
    }
}

/// One request received by a [`RecordingHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    Instantiate { key: InstanceKey, reorientation: Reorientation },
    Reorient { key: InstanceKey, reorientation: Reorientation },
    Dispose(InstanceKey),
    Highlight { key: InstanceKey, on: bool },
}

/// A host with no renderer: it answers with a fixed observer position and
/// records every request in order.
///
/// Useful for headless tooling (batch edits, validation) and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub observer: Option<Vector3<f64>>,
    pub requests: Vec<HostRequest>,
}

impl RecordingHost {
    pub fn new(observer: Option<Vector3<f64>>) -> Self {
        Self {
            observer,
            requests: Vec::new(),
        }
    }

    /// Drains the recorded requests
    pub fn take(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl SceneHost for RecordingHost {
    fn observer_world_position(&self) -> Option<Vector3<f64>> {
        self.observer
    }

    fn instantiate(&mut self, key: InstanceKey, _instance: &StaticObject, reorientation: &Reorientation) {
        self.requests.push(HostRequest::Instantiate {
            key,
            reorientation: *reorientation,
        });
    }

    fn reorient(&mut self, key: InstanceKey, reorientation: &Reorientation) {
        self.requests.push(HostRequest::Reorient {
            key,
            reorientation: *reorientation,
        });
    }

    fn dispose(&mut self, key: InstanceKey) {
        self.requests.push(HostRequest::Dispose(key));
    }

    fn set_highlighted(&mut self, key: InstanceKey, highlighted: bool) {
        self.requests.push(HostRequest::Highlight { key, on: highlighted });
    }
}
