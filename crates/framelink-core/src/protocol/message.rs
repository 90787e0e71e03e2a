//! The wire unit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::ProxyId;
use crate::surface::SurfaceHandle;

/// Message tag.
///
/// `proxy_id`-less kinds target the queue itself; object kinds other than
/// `ObjectCreate` arrive stamped with the identity they operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    SurfaceHandoff,
    Tick,
    AddListener,
    RemoveListener,
    Event,
    ObjectCreate,
    ObjectMethodCall,
    ObjectPropertySet,
    ObjectAddListener,
    ObjectRemoveListener,
}

/// A resource whose ownership moves with the batch.
///
/// Not `Clone` on purpose: constructing a `Transferable` consumes the
/// sender's handle, and decode hands it back out exactly once.
#[derive(Debug)]
pub enum Transferable {
    Surface(SurfaceHandle),
}

/// One enqueued message.
#[derive(Debug)]
pub struct Message {
    pub kind: MessageKind,
    /// Absent ⇒ targets the queue; present ⇒ targets a directory entry.
    pub proxy_id: Option<ProxyId>,
    /// Plain JSON record; anything richer is the serializer's problem.
    pub payload: Value,
    /// Resources moving with this message. Never serialized.
    pub transfer: Vec<Transferable>,
}

impl Message {
    /// Queue-targeted message.
    pub fn new(kind: MessageKind, payload: Value) -> Self {
        Self {
            kind,
            proxy_id: None,
            payload,
            transfer: Vec::new(),
        }
    }

    /// Message addressed to a specific directory entry.
    pub fn for_proxy(kind: MessageKind, proxy_id: ProxyId, payload: Value) -> Self {
        Self {
            kind,
            proxy_id: Some(proxy_id),
            payload,
            transfer: Vec::new(),
        }
    }

    /// Attach a transferable resource.
    pub fn with_transfer(mut self, resource: Transferable) -> Self {
        self.transfer.push(resource);
        self
    }
}
