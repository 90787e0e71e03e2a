//! Viewport shim.
//!
//! A synthetic window/document for the receiving side, built entirely on
//! the event bridge. It is a constructed value passed into collaborator
//! initialization, never assigned into ambient globals, so one process can
//! run any number of independent channels.

use std::sync::{Arc, Mutex};

use framelink_core::surface::SurfaceGeometry;

use crate::bridge::{ListenerId, RemoteEvent};
use crate::proxy::{capability_for, RemoteObjectProxy};
use crate::queue::{lock, ChannelQueue};

/// Bounding rectangle computed from cached geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub right: i32,
    pub bottom: i32,
}

/// Synthetic viewport handle for collaborator rendering code.
#[derive(Clone)]
pub struct ViewportShim {
    queue: ChannelQueue,
    geometry: Arc<Mutex<SurfaceGeometry>>,
}

impl ViewportShim {
    pub(crate) fn new(queue: ChannelQueue) -> Self {
        Self {
            queue,
            geometry: Arc::new(Mutex::new(SurfaceGeometry::default())),
        }
    }

    pub(crate) fn geometry_cell(&self) -> Arc<Mutex<SurfaceGeometry>> {
        self.geometry.clone()
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        *lock(&self.geometry)
    }

    pub fn client_width(&self) -> u32 {
        self.geometry().width
    }

    pub fn client_height(&self) -> u32 {
        self.geometry().height
    }

    pub fn inner_width(&self) -> u32 {
        self.client_width()
    }

    pub fn inner_height(&self) -> u32 {
        self.client_height()
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.geometry().pixel_ratio
    }

    pub fn bounding_client_rect(&self) -> BoundingRect {
        let g = self.geometry();
        BoundingRect {
            left: g.left,
            top: g.top,
            width: g.width,
            height: g.height,
            right: g.left + g.width as i32,
            bottom: g.top + g.height as i32,
        }
    }

    /// No-op; there is nothing to focus in this context.
    pub fn focus(&self) {}

    /// Listener registration, delegated to the bridge.
    pub fn add_event_listener(
        &self,
        ty: &str,
        f: impl FnMut(&RemoteEvent) + Send + 'static,
    ) -> ListenerId {
        self.queue.add_event_listener(ty, f)
    }

    pub fn remove_event_listener(&self, ty: &str, id: ListenerId) {
        self.queue.remove_event_listener(ty, id);
    }

    /// Document-style element factory. Supported tags come back as remote
    /// object proxies; unsupported tags come back as `None`.
    pub fn create_element(&self, tag: &str) -> Option<RemoteObjectProxy> {
        let capability = capability_for(tag)?;
        Some(RemoteObjectProxy::create(&self.queue, capability))
    }
}
