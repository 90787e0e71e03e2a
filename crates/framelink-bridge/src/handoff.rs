//! Surface handoff.
//!
//! Exactly one per channel: the initiator detaches its surface into a
//! transferable handle and ships it, with geometry, as the very first
//! message. Geometry changes afterwards travel as ordinary `EVENT`s with
//! the reserved `"resize"` type, never as a second handoff.

use serde_json::Value;

use framelink_core::protocol::{Message, MessageKind, Transferable};
use framelink_core::surface::{SurfaceGeometry, SurfaceHandle};
use framelink_core::{FramelinkError, Result};

use crate::queue::ChannelQueue;
use crate::shim::ViewportShim;

/// What the collaborator's ready callback receives.
#[derive(Debug)]
pub struct SurfaceDescriptor {
    pub handle: SurfaceHandle,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

/// Initiator side: enqueue the handoff. Call before starting the pump so
/// it rides the first batch the receiver ever processes.
pub fn send_surface(
    queue: &ChannelQueue,
    handle: SurfaceHandle,
    geometry: SurfaceGeometry,
) -> Result<()> {
    let payload = serde_json::to_value(geometry)
        .map_err(|e| FramelinkError::BadMessage(format!("geometry not serializable: {e}")))?;
    queue.enqueue(
        Message::new(MessageKind::SurfaceHandoff, payload)
            .with_transfer(Transferable::Surface(handle)),
    );
    tracing::info!(
        width = geometry.width,
        height = geometry.height,
        "surface handoff enqueued"
    );
    Ok(())
}

/// Receiver side: register the handoff handler and build the viewport shim.
///
/// On receipt the shim's cached geometry is set, the reserved `"resize"`
/// event keeps it current, and `on_surface_ready` fires exactly once. A
/// duplicate handoff is logged and ignored.
pub fn install_receiver(
    queue: &ChannelQueue,
    on_surface_ready: impl FnOnce(SurfaceDescriptor) + Send + 'static,
) -> ViewportShim {
    let shim = ViewportShim::new(queue.clone());

    let geometry = shim.geometry_cell();
    queue.add_event_listener("resize", move |ev| {
        let mut geom = crate::queue::lock(&geometry);
        if let Some(w) = ev.number("width") {
            geom.width = w as u32;
        }
        if let Some(h) = ev.number("height") {
            geom.height = h as u32;
        }
        if let Some(left) = ev.number("left") {
            geom.left = left as i32;
        }
        if let Some(top) = ev.number("top") {
            geom.top = top as i32;
        }
    });

    let geometry = shim.geometry_cell();
    let mut on_ready = Some(on_surface_ready);
    queue.register_handler(MessageKind::SurfaceHandoff, move |mut msg| {
        let Some(ready) = on_ready.take() else {
            tracing::warn!("duplicate surface handoff ignored");
            return;
        };
        let Some(handle) = take_surface(&mut msg) else {
            tracing::warn!("surface handoff without a transferred surface; ignored");
            on_ready = Some(ready);
            return;
        };
        let geom: SurfaceGeometry = serde_json::from_value(msg.payload).unwrap_or_default();
        *crate::queue::lock(&geometry) = geom;
        tracing::info!(width = geom.width, height = geom.height, "surface received");
        ready(SurfaceDescriptor {
            handle,
            width: geom.width,
            height: geom.height,
            pixel_ratio: geom.pixel_ratio,
        });
    });

    shim
}

fn take_surface(msg: &mut Message) -> Option<SurfaceHandle> {
    msg.transfer.drain(..).find_map(|t| match t {
        Transferable::Surface(handle) => Some(handle),
    })
}

/// Initiator-side geometry update, shipped as the reserved resize event.
pub fn push_resize(queue: &ChannelQueue, geometry: SurfaceGeometry) -> Result<()> {
    let mut payload = serde_json::to_value(geometry)
        .map_err(|e| FramelinkError::BadMessage(format!("geometry not serializable: {e}")))?;
    if let Value::Object(fields) = &mut payload {
        fields.insert("type".to_string(), Value::String("resize".to_string()));
    }
    queue.enqueue(Message::new(MessageKind::Event, payload));
    Ok(())
}
