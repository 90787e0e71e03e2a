//! Remote object proxies and their far-side hosts.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use framelink_bridge::proxy::host::{install_element_host, ElementHost, EventSink};
use framelink_bridge::proxy::{capability_for, RemoteObjectProxy, VIDEO_CAPABILITY};
use framelink_bridge::queue::ChannelQueue;
use framelink_bridge::transport::{in_proc, Transport};
use framelink_bridge::LocalEventHub;
use framelink_core::protocol::{decode_batch, BatchFrame, Message, MessageKind};
use framelink_core::{ProxyId, Result};

#[derive(Clone, Default)]
struct CollectTransport {
    frames: Arc<Mutex<Vec<BatchFrame>>>,
}

impl Transport for CollectTransport {
    fn send(&mut self, frame: BatchFrame) -> Result<()> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }
}

fn hub() -> Arc<LocalEventHub> {
    Arc::new(LocalEventHub::new())
}

#[derive(Clone, Default)]
struct Recording {
    invocations: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
    properties: Arc<Mutex<Vec<(String, Value)>>>,
}

struct RecordingHost {
    record: Recording,
    sinks: Vec<(String, EventSink)>,
}

impl ElementHost for RecordingHost {
    fn invoke(&mut self, method: &str, args: &[Value]) {
        self.record
            .invocations
            .lock()
            .unwrap()
            .push((method.to_string(), args.to_vec()));
        if method == "play" {
            for (ty, sink) in &self.sinks {
                if ty == "playing" {
                    sink.emit("playing", json!({ "currentTime": 0.0 }));
                }
            }
        }
    }

    fn set_property(&mut self, name: &str, value: &Value) {
        self.record
            .properties
            .lock()
            .unwrap()
            .push((name.to_string(), value.clone()));
    }

    fn attach_listener(&mut self, ty: &str, sink: EventSink) {
        self.sinks.push((ty.to_string(), sink));
    }

    fn detach_listener(&mut self, ty: &str) {
        self.sinks.retain(|(t, _)| t != ty);
    }
}

#[test]
fn proxies_get_distinct_identities_and_directory_entries() {
    let q = ChannelQueue::new(Box::new(CollectTransport::default()), hub());
    let proxies: Vec<RemoteObjectProxy> = (0..8)
        .map(|_| RemoteObjectProxy::create(&q, &VIDEO_CAPABILITY))
        .collect();

    let ids: HashSet<ProxyId> = proxies.iter().map(RemoteObjectProxy::id).collect();
    assert_eq!(ids.len(), 8);
    assert_eq!(q.directory_len(), 8);
    for p in &proxies {
        assert_eq!(q.directory_type_tag(p.id()).as_deref(), Some("video"));
    }
}

#[test]
fn play_emits_exactly_one_method_call_message() {
    let transport = CollectTransport::default();
    let q = ChannelQueue::new(Box::new(transport.clone()), hub());

    let video = RemoteObjectProxy::create(&q, &VIDEO_CAPABILITY);
    q.flush(); // drain the OBJECT_CREATE batch
    transport.frames.lock().unwrap().clear();

    video.call_method("play", vec![]).unwrap();
    q.flush();

    let mut frames = transport.frames.lock().unwrap();
    assert_eq!(frames.len(), 1);
    let batch = decode_batch(frames.pop().unwrap()).unwrap();
    assert_eq!(batch.len(), 1);
    let msg = &batch[0];
    assert_eq!(msg.kind, MessageKind::ObjectMethodCall);
    assert_eq!(msg.proxy_id, Some(video.id()));
    assert_eq!(msg.payload["name"], json!("play"));
    assert_eq!(msg.payload["args"], json!([]));
}

#[test]
fn create_precedes_first_operation_in_the_same_batch() {
    let transport = CollectTransport::default();
    let q = ChannelQueue::new(Box::new(transport.clone()), hub());

    let video = RemoteObjectProxy::create(&q, &VIDEO_CAPABILITY);
    video.set_property("src", json!("clip.webm")).unwrap();
    q.flush();

    let mut frames = transport.frames.lock().unwrap();
    let batch = decode_batch(frames.pop().unwrap()).unwrap();
    assert_eq!(batch[0].kind, MessageKind::ObjectCreate);
    assert_eq!(batch[1].kind, MessageKind::ObjectPropertySet);
}

#[test]
fn capability_gates_methods_and_properties() {
    let q = ChannelQueue::new(Box::new(CollectTransport::default()), hub());
    let div = RemoteObjectProxy::create(&q, capability_for("div").unwrap());

    assert!(div.call_method("play", vec![]).is_err());
    assert!(div.set_property("src", json!("x")).is_err());

    let video = RemoteObjectProxy::create(&q, &VIDEO_CAPABILITY);
    assert!(video.call_method("play", vec![]).is_ok());
    assert!(video.call_method("load", vec![]).is_err());
}

#[test]
fn unsupported_tag_has_no_capability() {
    assert!(capability_for("marquee").is_none());
    assert!(capability_for("video").is_some());
}

#[test]
fn host_round_trip_through_two_queues() {
    let (proxy_ep, host_ep) = in_proc::pair();
    let proxy_side = ChannelQueue::new(Box::new(proxy_ep.transport), hub());
    let host_side = ChannelQueue::new(Box::new(host_ep.transport), hub());
    let mut proxy_inbound = proxy_ep.inbound;
    let mut host_inbound = host_ep.inbound;

    let record = Recording::default();
    let r = record.clone();
    install_element_host(&host_side, move |tag: &str| match tag {
        "video" => Some(Box::new(RecordingHost {
            record: r.clone(),
            sinks: Vec::new(),
        }) as Box<dyn ElementHost>),
        _ => None,
    });

    let video = RemoteObjectProxy::create(&proxy_side, &VIDEO_CAPABILITY);
    let played = Arc::new(Mutex::new(Vec::new()));
    let sink = played.clone();
    video.add_event_listener("playing", move |ev| {
        sink.lock()
            .unwrap()
            .push(ev.number("currentTime").unwrap());
    });
    video.set_property("src", json!("clip.webm")).unwrap();
    video.call_method("play", vec![]).unwrap();

    proxy_side.flush();
    while let Ok(frame) = host_inbound.try_recv() {
        host_side.on_frame(frame);
    }
    host_side.flush();
    while let Ok(frame) = proxy_inbound.try_recv() {
        proxy_side.on_frame(frame);
    }

    assert_eq!(
        *record.invocations.lock().unwrap(),
        vec![("play".to_string(), vec![])]
    );
    assert_eq!(
        *record.properties.lock().unwrap(),
        vec![("src".to_string(), json!("clip.webm"))]
    );
    // The host's playing event came back addressed to this proxy.
    assert_eq!(*played.lock().unwrap(), vec![0.0]);
}

#[test]
fn unknown_identity_does_not_derail_the_batch() {
    let q = ChannelQueue::new(Box::new(CollectTransport::default()), hub());
    let hits = Arc::new(Mutex::new(0u32));
    let n = hits.clone();
    q.on_tick(move || *n.lock().unwrap() += 1);

    q.on_batch(vec![
        Message::for_proxy(MessageKind::Event, ProxyId::generate(), json!({ "type": "x" })),
        Message::for_proxy(
            MessageKind::ObjectMethodCall,
            ProxyId::generate(),
            json!({ "name": "play", "args": [] }),
        ),
        Message::new(MessageKind::Tick, json!({})),
    ]);

    assert_eq!(*hits.lock().unwrap(), 1);
}
