//! The channel queue.
//!
//! One queue per directed relationship between two contexts. It owns the
//! outbound buffer, the kind-handler table, the directory of remote object
//! proxies and hosted elements, the transport, and the event bridge bound
//! to the local event target.
//!
//! Dispatch rule for inbound traffic: route by `proxy_id` first, then by
//! `kind`. An absent id targets the queue's own handler table; a present id
//! targets the matching directory entry, and an unknown id is a silent
//! no-op so one stale message never poisons the rest of its batch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use dashmap::DashMap;
use serde_json::Value;

use framelink_core::identity::ProxyId;
use framelink_core::protocol::{decode_batch, encode_batch, BatchFrame, Message, MessageKind};

use crate::bridge::{EventBridge, EventListener, EventTarget, ListenerId, RemoteEvent};
use crate::config::ChannelConfig;
use crate::proxy::host::{ElementHost, EventSink};
use crate::transport::Transport;

/// Lock a mutex, shrugging off poisoning: a panicked handler on another
/// thread must not wedge the channel.
pub(crate) fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

type KindHandler = Arc<Mutex<dyn FnMut(Message) + Send>>;

/// The shared outbound buffer. Insertion order is send order.
#[derive(Clone, Default)]
pub(crate) struct Outbox {
    buf: Arc<Mutex<Vec<Message>>>,
}

impl Outbox {
    /// Append; never blocks, never validates.
    pub(crate) fn push(&self, msg: Message) {
        lock(&self.buf).push(msg);
    }

    fn drain(&self) -> Vec<Message> {
        std::mem::take(&mut *lock(&self.buf))
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.buf).len()
    }
}

pub(crate) struct ProxyEntry {
    type_tag: String,
    listeners: Mutex<HashMap<String, Vec<(ListenerId, EventListener)>>>,
}

pub(crate) struct HostEntry {
    host: Mutex<Box<dyn ElementHost>>,
}

pub(crate) enum DirectoryEntry {
    /// Local stand-in for a far-side object.
    Proxy(ProxyEntry),
    /// Real object materialized here on behalf of a far-side proxy.
    Host(HostEntry),
}

struct QueueInner {
    outbox: Outbox,
    handlers: DashMap<MessageKind, KindHandler>,
    directory: DashMap<ProxyId, DirectoryEntry>,
    transport: Mutex<Box<dyn Transport>>,
    bridge: EventBridge,
    soft_batch_cap: usize,
}

/// Cheap-clone handle to one channel queue.
#[derive(Clone)]
pub struct ChannelQueue {
    inner: Arc<QueueInner>,
}

/// Non-owning queue handle for handler closures, so the handler table never
/// keeps its own queue alive.
#[derive(Clone)]
pub struct WeakQueue {
    inner: Weak<QueueInner>,
}

impl WeakQueue {
    pub fn upgrade(&self) -> Option<ChannelQueue> {
        self.inner.upgrade().map(|inner| ChannelQueue { inner })
    }
}

impl ChannelQueue {
    /// Build a queue over a transport, bound to the local event target.
    pub fn new(transport: Box<dyn Transport>, target: Arc<dyn EventTarget>) -> Self {
        Self::with_config(transport, target, &ChannelConfig::default())
    }

    pub fn with_config(
        transport: Box<dyn Transport>,
        target: Arc<dyn EventTarget>,
        cfg: &ChannelConfig,
    ) -> Self {
        let outbox = Outbox::default();
        let bridge = EventBridge::new(outbox.clone(), target);
        let queue = Self {
            inner: Arc::new(QueueInner {
                outbox,
                handlers: DashMap::new(),
                directory: DashMap::new(),
                transport: Mutex::new(transport),
                bridge,
                soft_batch_cap: cfg.max_batch_len,
            }),
        };
        queue.install_builtins();
        queue
    }

    /// Pre-wire the listener-mirroring handlers to the bound event target.
    fn install_builtins(&self) {
        let bridge = self.inner.bridge.clone();
        self.register_handler(MessageKind::AddListener, move |msg| {
            if let Some(ty) = msg.payload.get("type").and_then(Value::as_str) {
                bridge.subscribe_remote(ty);
            }
        });

        let bridge = self.inner.bridge.clone();
        self.register_handler(MessageKind::RemoveListener, move |msg| {
            if let Some(ty) = msg.payload.get("type").and_then(Value::as_str) {
                bridge.unsubscribe_remote(ty);
            }
        });

        let bridge = self.inner.bridge.clone();
        self.register_handler(MessageKind::Event, move |msg| {
            bridge.dispatch_payload(&msg.payload);
        });
    }

    pub fn downgrade(&self) -> WeakQueue {
        WeakQueue {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // --------------------
    // Outbound
    // --------------------

    /// Append to the outbound buffer. Never blocks; serializability is only
    /// checked at flush time.
    pub fn enqueue(&self, msg: Message) {
        self.inner.outbox.push(msg);
    }

    /// Drain and ship the current batch.
    ///
    /// No-op when empty. The buffer is cleared whether or not the send
    /// succeeds: encode and transport failures are logged and the batch is
    /// lost, never retried. Occasional dropped input is tolerable in this
    /// domain; a stuck queue is not.
    pub fn flush(&self) {
        let batch = self.inner.outbox.drain();
        if batch.is_empty() {
            return;
        }
        if batch.len() > self.inner.soft_batch_cap {
            tracing::warn!(
                len = batch.len(),
                cap = self.inner.soft_batch_cap,
                "batch exceeds soft cap"
            );
        }
        let frame = match encode_batch(batch) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "batch encode failed; batch dropped");
                return;
            }
        };
        if let Err(e) = lock(&self.inner.transport).send(frame) {
            tracing::warn!(error = %e, "transport send failed; batch dropped");
        }
    }

    /// Outbound messages waiting for the next flush.
    pub fn pending_outbound(&self) -> usize {
        self.inner.outbox.len()
    }

    /// Enqueue a frame tick for the far side's frame driver.
    pub fn push_tick(&self) {
        self.enqueue(Message::new(MessageKind::Tick, Value::Object(Default::default())));
    }

    // --------------------
    // Inbound
    // --------------------

    /// Decode and dispatch one received frame. Malformed frames are logged
    /// and dropped whole.
    pub fn on_frame(&self, frame: BatchFrame) {
        match decode_batch(frame) {
            Ok(batch) => self.on_batch(batch),
            Err(e) => tracing::warn!(error = %e, "inbound frame undecodable; dropped"),
        }
    }

    /// Dispatch a decoded batch in order.
    pub fn on_batch(&self, batch: Vec<Message>) {
        for msg in batch {
            match msg.proxy_id {
                Some(id) => self.dispatch_directory(id, msg),
                None => self.dispatch_kind(msg),
            }
        }
    }

    /// Register (or replace) the handler for a queue-targeted kind.
    pub fn register_handler(
        &self,
        kind: MessageKind,
        f: impl FnMut(Message) + Send + 'static,
    ) {
        self.inner
            .handlers
            .insert(kind, Arc::new(Mutex::new(f)) as KindHandler);
    }

    /// Register the far side's frame-tick hook.
    pub fn on_tick(&self, mut f: impl FnMut() + Send + 'static) {
        self.register_handler(MessageKind::Tick, move |_| f());
    }

    fn dispatch_kind(&self, msg: Message) {
        let Some(handler) = self.inner.handlers.get(&msg.kind).map(|h| h.value().clone())
        else {
            tracing::debug!(kind = ?msg.kind, "no handler registered; message dropped");
            return;
        };
        let mut f = lock(&handler);
        (*f)(msg);
    }

    fn dispatch_directory(&self, id: ProxyId, msg: Message) {
        let Some(entry) = self.inner.directory.get(&id) else {
            tracing::debug!(proxy = %id, kind = ?msg.kind, "unknown identity; message dropped");
            return;
        };
        match entry.value() {
            DirectoryEntry::Proxy(p) => {
                if msg.kind != MessageKind::Event {
                    tracing::debug!(proxy = %id, kind = ?msg.kind, "unexpected kind for proxy entry");
                    return;
                }
                let ev = RemoteEvent::from_payload(&msg.payload);
                let targets: Vec<EventListener> = lock(&p.listeners)
                    .get(ev.event_type())
                    .map(|v| v.iter().map(|(_, l)| l.clone()).collect())
                    .unwrap_or_default();
                // Listeners may touch the directory; release the shard first.
                drop(entry);
                for l in targets {
                    let mut f = lock(&l);
                    (*f)(&ev);
                }
            }
            DirectoryEntry::Host(h) => {
                let mut host = lock(&h.host);
                match msg.kind {
                    MessageKind::ObjectMethodCall => {
                        let name = msg.payload.get("name").and_then(Value::as_str).unwrap_or_default();
                        let args = msg
                            .payload
                            .get("args")
                            .and_then(Value::as_array)
                            .cloned()
                            .unwrap_or_default();
                        host.invoke(name, &args);
                    }
                    MessageKind::ObjectPropertySet => {
                        let name = msg.payload.get("name").and_then(Value::as_str).unwrap_or_default();
                        let value = msg.payload.get("value").cloned().unwrap_or(Value::Null);
                        host.set_property(name, &value);
                    }
                    MessageKind::ObjectAddListener => {
                        if let Some(ty) = msg.payload.get("type").and_then(Value::as_str) {
                            let sink = EventSink::new(self.inner.outbox.clone(), id);
                            host.attach_listener(ty, sink);
                        }
                    }
                    MessageKind::ObjectRemoveListener => {
                        if let Some(ty) = msg.payload.get("type").and_then(Value::as_str) {
                            host.detach_listener(ty);
                        }
                    }
                    _ => {
                        tracing::debug!(proxy = %id, kind = ?msg.kind, "unexpected kind for host entry");
                    }
                }
            }
        }
    }

    // --------------------
    // Bridge passthrough
    // --------------------

    pub fn bridge(&self) -> &EventBridge {
        &self.inner.bridge
    }

    /// Listen for events forwarded from the far side's real input source.
    pub fn add_event_listener(
        &self,
        ty: &str,
        f: impl FnMut(&RemoteEvent) + Send + 'static,
    ) -> ListenerId {
        self.inner.bridge.add_event_listener(ty, f)
    }

    pub fn remove_event_listener(&self, ty: &str, id: ListenerId) {
        self.inner.bridge.remove_event_listener(ty, id);
    }

    // --------------------
    // Directory
    // --------------------

    pub(crate) fn register_proxy(&self, id: ProxyId, type_tag: &str) {
        self.inner.directory.insert(
            id,
            DirectoryEntry::Proxy(ProxyEntry {
                type_tag: type_tag.to_string(),
                listeners: Mutex::new(HashMap::new()),
            }),
        );
    }

    pub(crate) fn insert_host(&self, id: ProxyId, host: Box<dyn ElementHost>) {
        if self
            .inner
            .directory
            .insert(id, DirectoryEntry::Host(HostEntry { host: Mutex::new(host) }))
            .is_some()
        {
            tracing::debug!(proxy = %id, "duplicate create replaced existing directory entry");
        }
    }

    pub(crate) fn add_proxy_listener(
        &self,
        id: ProxyId,
        ty: &str,
        lid: ListenerId,
        l: EventListener,
    ) {
        if let Some(entry) = self.inner.directory.get(&id) {
            if let DirectoryEntry::Proxy(p) = entry.value() {
                lock(&p.listeners)
                    .entry(ty.to_string())
                    .or_default()
                    .push((lid, l));
            }
        }
    }

    pub(crate) fn remove_proxy_listener(&self, id: ProxyId, ty: &str, lid: ListenerId) {
        if let Some(entry) = self.inner.directory.get(&id) {
            if let DirectoryEntry::Proxy(p) = entry.value() {
                if let Some(entries) = lock(&p.listeners).get_mut(ty) {
                    entries.retain(|(other, _)| *other != lid);
                }
            }
        }
    }

    pub(crate) fn outbox(&self) -> Outbox {
        self.inner.outbox.clone()
    }

    /// Type tag recorded for an identity, if the directory knows it as a
    /// proxy.
    pub fn directory_type_tag(&self, id: ProxyId) -> Option<String> {
        self.inner.directory.get(&id).and_then(|e| match e.value() {
            DirectoryEntry::Proxy(p) => Some(p.type_tag.clone()),
            DirectoryEntry::Host(_) => None,
        })
    }

    pub fn directory_len(&self) -> usize {
        self.inner.directory.len()
    }
}
