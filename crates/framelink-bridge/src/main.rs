//! Two-context demo.
//!
//! Wires a primary context (real input, real surface) to a secondary
//! context (rendering collaborator) over the in-process transport: surface
//! handoff first, then forwarded pointer input, frame ticks, a remote video
//! element, and a resize.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

use framelink_bridge::handoff::{self, SurfaceDescriptor};
use framelink_bridge::proxy::host::{install_element_host, ElementHost, EventSink};
use framelink_bridge::queue::ChannelQueue;
use framelink_bridge::transport::in_proc;
use framelink_bridge::{ChannelConfig, LocalEventHub};
use framelink_core::surface::{PixelSurface, SurfaceGeometry, SurfaceHandle};

/// Primary-side stand-in for a real media element.
#[derive(Default)]
struct DemoVideoHost {
    src: Option<String>,
    sinks: Vec<(String, EventSink)>,
}

impl ElementHost for DemoVideoHost {
    fn invoke(&mut self, method: &str, args: &[Value]) {
        tracing::info!(method, ?args, src = ?self.src, "video host invoked");
        if method == "play" {
            for (ty, sink) in &self.sinks {
                if ty == "playing" {
                    sink.emit("playing", json!({ "currentTime": 0.0 }));
                }
            }
        }
    }

    fn set_property(&mut self, name: &str, value: &Value) {
        tracing::info!(name, %value, "video host property set");
        if name == "src" {
            self.src = value.as_str().map(str::to_string);
        }
    }

    fn attach_listener(&mut self, ty: &str, sink: EventSink) {
        self.sinks.push((ty.to_string(), sink));
    }

    fn detach_listener(&mut self, ty: &str) {
        self.sinks.retain(|(t, _)| t != ty);
    }
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = ChannelConfig::default();
    let (primary_ep, secondary_ep) = in_proc::pair();

    // ---- primary context: owns the real input source and the surface
    let input = LocalEventHub::new();
    let primary = ChannelQueue::with_config(
        Box::new(primary_ep.transport),
        Arc::new(input.clone()),
        &cfg,
    );
    install_element_host(&primary, |tag: &str| match tag {
        "video" => Some(Box::new(DemoVideoHost::default()) as Box<dyn ElementHost>),
        _ => None,
    });

    let geometry = SurfaceGeometry {
        width: 640,
        height: 480,
        left: 0,
        top: 0,
        pixel_ratio: 1.0,
    };
    if let Err(e) = handoff::send_surface(
        &primary,
        SurfaceHandle::new(PixelSurface::new(geometry.width, geometry.height)),
        geometry,
    ) {
        tracing::error!(error = %e, "surface handoff failed");
        return;
    }
    tokio::spawn(framelink_bridge::pump::run(
        primary.clone(),
        primary_ep.inbound,
        cfg.clone(),
    ));

    // ---- secondary context: the rendering collaborator
    let secondary = ChannelQueue::with_config(
        Box::new(secondary_ep.transport),
        Arc::new(LocalEventHub::new()),
        &cfg,
    );
    let surface: Arc<Mutex<Option<SurfaceDescriptor>>> = Arc::new(Mutex::new(None));
    let slot = surface.clone();
    let shim = handoff::install_receiver(&secondary, move |desc| {
        tracing::info!(width = desc.width, height = desc.height, "collaborator ready");
        if let Ok(mut s) = slot.lock() {
            *s = Some(desc);
        }
    });

    shim.add_event_listener("pointermove", |ev| {
        tracing::info!(
            x = ev.number("clientX"),
            y = ev.number("clientY"),
            "pointer forwarded"
        );
    });

    let slot = surface.clone();
    secondary.on_tick(move || {
        if let Ok(mut s) = slot.lock() {
            if let Some(desc) = s.as_mut() {
                if let Some(px) = desc.handle.downcast_mut::<PixelSurface>() {
                    px.fill([32, 32, 48, 255]);
                }
            }
        }
    });

    if let Some(video) = shim.create_element("video") {
        video.add_event_listener("playing", |_| tracing::info!("video is playing"));
        let _ = video.set_property("src", json!("demo.webm"));
        let _ = video.call_method("play", vec![]);
    }
    tokio::spawn(framelink_bridge::pump::run(
        secondary.clone(),
        secondary_ep.inbound,
        cfg.clone(),
    ));

    // ---- drive some input and frames from the primary side
    for frame in 0..30u32 {
        input.fire(
            "pointermove",
            json!({ "clientX": 10 + frame, "clientY": 20, "button": 0 }),
        );
        primary.push_tick();
        tokio::time::sleep(tokio::time::Duration::from_millis(16)).await;
    }

    let resized = SurfaceGeometry {
        width: 800,
        height: 600,
        ..geometry
    };
    if let Err(e) = handoff::push_resize(&primary, resized) {
        tracing::warn!(error = %e, "resize push failed");
    }

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    tracing::info!("demo complete");
}
