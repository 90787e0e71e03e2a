//! Pump-driven end-to-end: subscription mirroring and event forwarding.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use framelink_bridge::queue::ChannelQueue;
use framelink_bridge::transport::in_proc;
use framelink_bridge::{pump, ChannelConfig, LocalEventHub, RemoteEvent};

async fn settle<F: Fn() -> bool>(cond: F) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition never settled");
}

fn fast() -> ChannelConfig {
    ChannelConfig {
        flush_interval_ms: 1,
        ..ChannelConfig::default()
    }
}

#[tokio::test]
async fn click_subscription_is_mirrored_then_events_flow_back() {
    let cfg = fast();
    let (initiator_ep, receiver_ep) = in_proc::pair();

    let input = LocalEventHub::new();
    let initiator = ChannelQueue::with_config(
        Box::new(initiator_ep.transport),
        Arc::new(input.clone()),
        &cfg,
    );
    let receiver = ChannelQueue::with_config(
        Box::new(receiver_ep.transport),
        Arc::new(LocalEventHub::new()),
        &cfg,
    );

    let seen: Arc<Mutex<Vec<RemoteEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    receiver.add_event_listener("click", move |ev| {
        sink.lock().unwrap().push(ev.clone());
    });
    // A second local listener for the same type: still one real
    // subscription on the input source.
    receiver.add_event_listener("click", |_| {});

    tokio::spawn(pump::run(initiator.clone(), initiator_ep.inbound, cfg.clone()));
    tokio::spawn(pump::run(receiver.clone(), receiver_ep.inbound, cfg.clone()));

    // The real input source is subscribed before any event is observable.
    let hub = input.clone();
    settle(move || hub.is_subscribed("click")).await;
    assert_eq!(input.subscription_count(), 1);
    assert!(seen.lock().unwrap().is_empty());

    input.fire(
        "click",
        json!({
            "clientX": 101,
            "clientY": 57,
            "button": 0,
            "target": { "tag": "canvas" },
        }),
    );

    let sink = seen.clone();
    settle(move || !sink.lock().unwrap().is_empty()).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let ev = &seen[0];
    assert_eq!(ev.event_type(), "click");
    assert_eq!(ev.number("clientX"), Some(101.0));
    assert_eq!(ev.number("clientY"), Some(57.0));
    // The structured target never crosses; only scalar fields survive.
    assert!(ev.get("target").is_none());
    ev.prevent_default();
}

#[tokio::test]
async fn remove_listener_unsubscribes_the_real_source() {
    let cfg = fast();
    let (initiator_ep, receiver_ep) = in_proc::pair();

    let input = LocalEventHub::new();
    let initiator = ChannelQueue::with_config(
        Box::new(initiator_ep.transport),
        Arc::new(input.clone()),
        &cfg,
    );
    let receiver = ChannelQueue::with_config(
        Box::new(receiver_ep.transport),
        Arc::new(LocalEventHub::new()),
        &cfg,
    );

    let id = receiver.add_event_listener("wheel", |_| {});

    tokio::spawn(pump::run(initiator.clone(), initiator_ep.inbound, cfg.clone()));
    tokio::spawn(pump::run(receiver.clone(), receiver_ep.inbound, cfg.clone()));

    let hub = input.clone();
    settle(move || hub.is_subscribed("wheel")).await;

    receiver.remove_event_listener("wheel", id);
    let hub = input.clone();
    settle(move || !hub.is_subscribed("wheel")).await;
}
