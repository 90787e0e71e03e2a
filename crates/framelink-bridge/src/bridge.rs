//! Event-forwarding bridge.
//!
//! Wraps a local listener table plus a bound event target. Local
//! `add_event_listener` calls are mirrored as `ADD_LISTENER` messages so the
//! far side subscribes its real input source on demand; events fired there
//! come back as `EVENT` messages and are re-dispatched here as ordinary
//! [`RemoteEvent`]s.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use serde_json::{Map, Value};

use framelink_core::protocol::{Message, MessageKind};
use framelink_core::simplify::simplify_payload;

use crate::queue::{lock, Outbox};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle identifying one locally registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) fn next_listener_id() -> ListenerId {
    ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
}

/// Shared callable listener.
pub type EventListener = Arc<Mutex<dyn FnMut(&RemoteEvent) + Send>>;

/// Wrap a closure as a shareable listener.
pub fn listener(f: impl FnMut(&RemoteEvent) + Send + 'static) -> EventListener {
    Arc::new(Mutex::new(f))
}

/// An event after crossing the channel: a type tag plus flat scalar fields.
#[derive(Debug, Clone)]
pub struct RemoteEvent {
    ty: String,
    fields: Map<String, Value>,
}

impl RemoteEvent {
    /// Rebuild from a received `EVENT` payload; the `type` field names the
    /// event, everything else stays addressable by field name.
    pub fn from_payload(payload: &Value) -> Self {
        let fields = match payload {
            Value::Object(m) => m.clone(),
            _ => Map::new(),
        };
        let ty = fields
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { ty, fields }
    }

    /// Build from a known type and a payload observed at the real source.
    pub fn from_parts(ty: &str, payload: Value) -> Self {
        let mut fields = match payload {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        fields.insert("type".to_string(), Value::String(ty.to_string()));
        Self {
            ty: ty.to_string(),
            fields,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.ty
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_f64)
    }

    /// Flatten back into a transport payload, `type` included.
    pub fn to_payload(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// No-op: default prevention cannot cross the context boundary.
    pub fn prevent_default(&self) {}

    /// No-op: propagation control cannot cross the context boundary.
    pub fn stop_propagation(&self) {}
}

/// An event-target-capable handle: one subscription slot per event type.
pub trait EventTarget: Send + Sync {
    fn subscribe(&self, ty: &str, listener: EventListener);
    fn unsubscribe(&self, ty: &str);
}

/// In-process event source for the side that owns real input.
///
/// Holds at most one subscriber per event type; `fire` is how the embedding
/// application feeds observed input into the channel.
#[derive(Clone, Default)]
pub struct LocalEventHub {
    slots: Arc<DashMap<String, EventListener>>,
}

impl LocalEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to the current subscriber for its type, if any.
    pub fn fire(&self, ty: &str, payload: Value) {
        let Some(target) = self.slots.get(ty).map(|l| l.value().clone()) else {
            return;
        };
        let ev = RemoteEvent::from_parts(ty, payload);
        let mut f = lock(&target);
        (*f)(&ev);
    }

    pub fn is_subscribed(&self, ty: &str) -> bool {
        self.slots.contains_key(ty)
    }

    pub fn subscription_count(&self) -> usize {
        self.slots.len()
    }
}

impl EventTarget for LocalEventHub {
    fn subscribe(&self, ty: &str, listener: EventListener) {
        self.slots.insert(ty.to_string(), listener);
    }

    fn unsubscribe(&self, ty: &str) {
        self.slots.remove(ty);
    }
}

/// The queue-level bridge instance.
#[derive(Clone)]
pub struct EventBridge {
    state: Arc<BridgeState>,
}

struct BridgeState {
    outbox: Outbox,
    target: Arc<dyn EventTarget>,
    local: Mutex<HashMap<String, Vec<(ListenerId, EventListener)>>>,
}

impl EventBridge {
    pub(crate) fn new(outbox: Outbox, target: Arc<dyn EventTarget>) -> Self {
        Self {
            state: Arc::new(BridgeState {
                outbox,
                target,
                local: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a local listener and mirror the subscription to the far side.
    pub fn add_event_listener(
        &self,
        ty: &str,
        f: impl FnMut(&RemoteEvent) + Send + 'static,
    ) -> ListenerId {
        let id = next_listener_id();
        lock(&self.state.local)
            .entry(ty.to_string())
            .or_default()
            .push((id, listener(f)));
        self.state.outbox.push(Message::new(
            MessageKind::AddListener,
            serde_json::json!({ "type": ty }),
        ));
        id
    }

    /// Drop one local listener and mirror `REMOVE_LISTENER`.
    ///
    /// The far side keeps a single real subscription per type, so this
    /// cancels it even when other local listeners for the type remain.
    /// That matches the observed protocol; callers sharing a type must
    /// coordinate removal themselves.
    pub fn remove_event_listener(&self, ty: &str, id: ListenerId) {
        if let Some(entries) = lock(&self.state.local).get_mut(ty) {
            entries.retain(|(lid, _)| *lid != id);
        }
        self.state.outbox.push(Message::new(
            MessageKind::RemoveListener,
            serde_json::json!({ "type": ty }),
        ));
    }

    /// Far side asked us to watch the real event source for this type.
    ///
    /// Installs the forwarding listener: every firing is flattened by the
    /// serializer and enqueued as an `EVENT` message.
    pub(crate) fn subscribe_remote(&self, ty: &str) {
        let outbox = self.state.outbox.clone();
        self.state.target.subscribe(
            ty,
            listener(move |ev| {
                outbox.push(Message::new(
                    MessageKind::Event,
                    simplify_payload(&ev.to_payload()),
                ));
            }),
        );
    }

    pub(crate) fn unsubscribe_remote(&self, ty: &str) {
        self.state.target.unsubscribe(ty);
    }

    /// Re-dispatch an inbound `EVENT` payload to local listeners.
    pub(crate) fn dispatch_payload(&self, payload: &Value) {
        let ev = RemoteEvent::from_payload(payload);
        let targets: Vec<EventListener> = lock(&self.state.local)
            .get(ev.event_type())
            .map(|v| v.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();
        for l in targets {
            let mut f = lock(&l);
            (*f)(&ev);
        }
    }

    #[cfg(test)]
    pub(crate) fn local_listener_count(&self, ty: &str) -> usize {
        lock(&self.state.local).get(ty).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn hub_keeps_one_subscription_per_type() {
        let hub = LocalEventHub::new();
        hub.subscribe("click", listener(|_| {}));
        hub.subscribe("click", listener(|_| {}));
        assert_eq!(hub.subscription_count(), 1);
        hub.unsubscribe("click");
        assert!(!hub.is_subscribed("click"));
    }

    #[test]
    fn removal_keeps_other_local_listeners() {
        let bridge = EventBridge::new(Outbox::default(), Arc::new(LocalEventHub::new()));
        let first = bridge.add_event_listener("click", |_| {});
        let _second = bridge.add_event_listener("click", |_| {});
        bridge.remove_event_listener("click", first);
        assert_eq!(bridge.local_listener_count("click"), 1);
        // Both registrations and the removal were mirrored to the far side.
        assert_eq!(bridge.state.outbox.len(), 3);
    }

    #[test]
    fn remote_event_exposes_scalar_fields_and_noop_controls() {
        let ev = RemoteEvent::from_payload(&json!({
            "type": "wheel",
            "deltaY": -3.5,
        }));
        assert_eq!(ev.event_type(), "wheel");
        assert_eq!(ev.number("deltaY"), Some(-3.5));
        // No-ops; present so collaborator code can call them blindly.
        ev.prevent_default();
        ev.stop_propagation();
    }
}
