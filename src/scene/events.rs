use std::fmt;

use crate::statics::{InstanceKey, SelectionChange};

/// Notifications the scene sends to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// The scene finished loading with `body` as the dominant body
    SceneReady { body: String },
    /// The dominant body changed
    BodyChanged { from: Option<String>, to: String },
}

/// Notifications the editor publishes about its own state.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    InstanceCreated { key: InstanceKey, model_identity: String },
    InstanceRemoved { key: InstanceKey, model_identity: String },
    SelectionChanged(SelectionChange),
    Saved { written: usize, failed: usize },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// Typed publish/subscribe.
///
/// Subscribers are called synchronously, in the order they subscribed.
pub struct EventBus<E> {
    subscribers: Vec<(SubscriptionId, Callback<E>)>,
    next_id: u64,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
