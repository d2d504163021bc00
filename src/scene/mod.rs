//! # Scene Module
//!
//! The boundary between the editor and whatever draws the instances.
//!
//! ## Key Components
//!
//! - [`SceneHost`] - Requests the editor makes of the renderer (instantiate, reorient, dispose, highlight)
//! - [`RecordingHost`] - A headless host that records every request
//! - [`EventBus`] - Typed subscribe/unsubscribe notifications with a fixed firing order
//! - [`SceneEvent`] / [`EditorEvent`] - Notifications consumed and published by the session
//!
//! Hosts never hand renderer objects to the editor; every request names the
//! instance by its [`InstanceKey`](crate::statics::InstanceKey) and the host
//! resolves its own handle. A key is dead once disposed.

pub mod events;
pub mod host;

pub use events::{EditorEvent, EventBus, SceneEvent, SubscriptionId};
pub use host::{HostRequest, RecordingHost, SceneHost};
