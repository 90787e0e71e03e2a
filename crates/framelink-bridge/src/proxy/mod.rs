//! Remote object proxies.
//!
//! A proxy is the local stand-in for an object that exists only on the far
//! side. One concrete type covers every element kind; what differs is the
//! capability descriptor gating which methods and properties the proxy
//! exposes. Construction unconditionally emits `OBJECT_CREATE` before any
//! other operation on that identity, and same-queue in-order delivery is
//! what guarantees the far side materializes the real object first.

use serde_json::{json, Value};

use framelink_core::identity::ProxyId;
use framelink_core::protocol::{Message, MessageKind};
use framelink_core::{FramelinkError, Result};

use crate::bridge::{listener, next_listener_id, ListenerId, RemoteEvent};
use crate::queue::ChannelQueue;

pub mod host;

/// What a remote element kind exposes.
#[derive(Debug, Clone, Copy)]
pub struct Capability {
    pub type_tag: &'static str,
    pub methods: &'static [&'static str],
    pub properties: &'static [&'static str],
}

/// Playback-capable media element.
pub const VIDEO_CAPABILITY: Capability = Capability {
    type_tag: "video",
    methods: &["play", "pause"],
    properties: &["src"],
};

/// Pass-through element: identity and events only.
pub const PASSTHROUGH_CAPABILITY: Capability = Capability {
    type_tag: "div",
    methods: &[],
    properties: &[],
};

const CAPABILITIES: &[Capability] = &[VIDEO_CAPABILITY, PASSTHROUGH_CAPABILITY];

/// Look up the capability descriptor for a supported tag.
pub fn capability_for(tag: &str) -> Option<&'static Capability> {
    CAPABILITIES.iter().find(|c| c.type_tag == tag)
}

/// Local handle to a far-side object.
///
/// State machine: unconstructed → create sent → assumed live. There is no
/// acknowledgment; every operation is fire-and-forget.
pub struct RemoteObjectProxy {
    id: ProxyId,
    capability: &'static Capability,
    queue: ChannelQueue,
}

impl RemoteObjectProxy {
    /// Allocate an identity, register in the queue's directory, and emit
    /// `OBJECT_CREATE`.
    pub fn create(queue: &ChannelQueue, capability: &'static Capability) -> Self {
        let id = ProxyId::generate();
        queue.register_proxy(id, capability.type_tag);
        queue.enqueue(Message::new(
            MessageKind::ObjectCreate,
            json!({ "id": id, "tag": capability.type_tag }),
        ));
        tracing::debug!(proxy = %id, tag = capability.type_tag, "remote object create sent");
        Self {
            id,
            capability,
            queue: queue.clone(),
        }
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    pub fn type_tag(&self) -> &'static str {
        self.capability.type_tag
    }

    /// Invoke a method on the far-side object.
    pub fn call_method(&self, name: &str, args: Vec<Value>) -> Result<()> {
        if !self.capability.methods.iter().any(|m| *m == name) {
            return Err(FramelinkError::Unsupported(format!(
                "method {name} not exposed by {}",
                self.capability.type_tag
            )));
        }
        self.queue.enqueue(Message::for_proxy(
            MessageKind::ObjectMethodCall,
            self.id,
            json!({ "name": name, "args": args }),
        ));
        Ok(())
    }

    /// Assign a property on the far-side object.
    pub fn set_property(&self, name: &str, value: Value) -> Result<()> {
        if !self.capability.properties.iter().any(|p| *p == name) {
            return Err(FramelinkError::Unsupported(format!(
                "property {name} not exposed by {}",
                self.capability.type_tag
            )));
        }
        self.queue.enqueue(Message::for_proxy(
            MessageKind::ObjectPropertySet,
            self.id,
            json!({ "name": name, "value": value }),
        ));
        Ok(())
    }

    /// Listen for events the far-side object fires. The subscription is
    /// mirrored so the real listener attaches to the real object, and
    /// forwarded events come back stamped with this proxy's identity.
    pub fn add_event_listener(
        &self,
        ty: &str,
        f: impl FnMut(&RemoteEvent) + Send + 'static,
    ) -> ListenerId {
        let lid = next_listener_id();
        self.queue.add_proxy_listener(self.id, ty, lid, listener(f));
        self.queue.enqueue(Message::for_proxy(
            MessageKind::ObjectAddListener,
            self.id,
            json!({ "type": ty }),
        ));
        lid
    }

    pub fn remove_event_listener(&self, ty: &str, lid: ListenerId) {
        self.queue.remove_proxy_listener(self.id, ty, lid);
        self.queue.enqueue(Message::for_proxy(
            MessageKind::ObjectRemoveListener,
            self.id,
            json!({ "type": ty }),
        ));
    }
}
