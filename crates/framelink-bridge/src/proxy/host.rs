//! Element hosting: the far side of a remote object proxy.
//!
//! When a context receives `OBJECT_CREATE` it materializes a real object
//! via the installed factory and keeps it in the queue directory under the
//! proxy's identity. Method calls and property sets arriving for that
//! identity land on the host; events the host fires travel back through an
//! [`EventSink`] stamped with the same identity.

use serde_json::Value;

use framelink_core::identity::ProxyId;
use framelink_core::protocol::{Message, MessageKind};
use framelink_core::simplify::simplify_payload;

use crate::queue::{ChannelQueue, Outbox};

/// A real object standing behind a far-side proxy.
pub trait ElementHost: Send {
    /// Named operation with positional arguments. Unknown names are the
    /// host's business; the channel treats them as best-effort.
    fn invoke(&mut self, method: &str, args: &[Value]);
    fn set_property(&mut self, name: &str, value: &Value);
    /// Start reporting events of this type through the sink.
    fn attach_listener(&mut self, ty: &str, sink: EventSink);
    fn detach_listener(&mut self, ty: &str);
}

/// Materializes hosts for supported tags; `None` means the tag is
/// unsupported and the create message degrades to a no-op.
pub trait ElementHostFactory: Send {
    fn create(&mut self, tag: &str) -> Option<Box<dyn ElementHost>>;
}

impl<F> ElementHostFactory for F
where
    F: FnMut(&str) -> Option<Box<dyn ElementHost>> + Send,
{
    fn create(&mut self, tag: &str) -> Option<Box<dyn ElementHost>> {
        self(tag)
    }
}

/// Identity-stamped event emitter handed to hosts.
#[derive(Clone)]
pub struct EventSink {
    outbox: Outbox,
    id: ProxyId,
}

impl EventSink {
    pub(crate) fn new(outbox: Outbox, id: ProxyId) -> Self {
        Self { outbox, id }
    }

    /// Serialize and enqueue one event for the owning proxy.
    pub fn emit(&self, ty: &str, payload: Value) {
        let mut flat = simplify_payload(&payload);
        if let Value::Object(fields) = &mut flat {
            fields.insert("type".to_string(), Value::String(ty.to_string()));
        }
        self.outbox
            .push(Message::for_proxy(MessageKind::Event, self.id, flat));
    }
}

/// Register the object-lifecycle handlers on a receiving queue.
///
/// Only `OBJECT_CREATE` routes through the handler table; the remaining
/// object kinds arrive identity-stamped and dispatch straight to the
/// directory entry this installs.
pub fn install_element_host(queue: &ChannelQueue, mut factory: impl ElementHostFactory + 'static) {
    let weak = queue.downgrade();
    queue.register_handler(MessageKind::ObjectCreate, move |msg| {
        let Some(queue) = weak.upgrade() else {
            return;
        };
        let id: ProxyId = match msg
            .payload
            .get("id")
            .cloned()
            .map(serde_json::from_value)
        {
            Some(Ok(id)) => id,
            _ => {
                tracing::warn!("object create without a valid id; ignored");
                return;
            }
        };
        let tag = msg.payload.get("tag").and_then(Value::as_str).unwrap_or_default();
        match factory.create(tag) {
            Some(host) => {
                queue.insert_host(id, host);
                tracing::debug!(proxy = %id, tag, "element host materialized");
            }
            None => {
                tracing::debug!(proxy = %id, tag, "unsupported element tag; create ignored");
            }
        }
    });
}
