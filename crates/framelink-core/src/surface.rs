//! Render surfaces and the ownership-transfer handle.
//!
//! The surface is the one resource a channel ever moves instead of copies.
//! `SurfaceHandle` owns the surface; putting it into a
//! [`Transferable`](crate::protocol::Transferable) consumes the sender's
//! binding, which is exactly the transfer semantics the protocol requires.

use std::any::Any;
use std::fmt;

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

/// An off-context-renderable target.
///
/// Collaborator rendering code draws into this; the channel only ever asks
/// for its dimensions and resizes it on geometry events.
pub trait RenderSurface: Send {
    /// Current (width, height) in pixels.
    fn dimensions(&self) -> (u32, u32);
    /// Resize the backing store.
    fn set_dimensions(&mut self, width: u32, height: u32);
    /// Downcast hook for collaborators that know the concrete surface.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Owned handle to a render surface.
pub struct SurfaceHandle(Box<dyn RenderSurface>);

impl SurfaceHandle {
    pub fn new(surface: impl RenderSurface + 'static) -> Self {
        Self(Box::new(surface))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn surface_mut(&mut self) -> &mut dyn RenderSurface {
        self.0.as_mut()
    }

    /// Borrow the concrete surface type, if it matches.
    pub fn downcast_mut<T: RenderSurface + 'static>(&mut self) -> Option<&mut T> {
        self.0.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "SurfaceHandle({w}x{h})")
    }
}

/// Geometry of a surface as observed in the initiating context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceGeometry {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub pixel_ratio: f64,
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            left: 0,
            top: 0,
            pixel_ratio: 1.0,
        }
    }
}

/// CPU pixel surface backed by an RGBA buffer.
///
/// The built-in surface used by the demo and by tests; real deployments
/// supply their own `RenderSurface`.
pub struct PixelSurface {
    width: u32,
    height: u32,
    buf: BytesMut,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buf: BytesMut::zeroed((width as usize) * (height as usize) * 4),
        }
    }

    /// Raw RGBA frame contents.
    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    /// Flood the frame with one color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.buf.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }
}

impl RenderSurface for PixelSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.buf = BytesMut::zeroed((width as usize) * (height as usize) * 4);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn pixel_surface_resizes_backing_store() {
        let mut s = PixelSurface::new(4, 2);
        assert_eq!(s.frame().len(), 32);
        s.set_dimensions(2, 2);
        assert_eq!(s.dimensions(), (2, 2));
        assert_eq!(s.frame().len(), 16);
    }

    #[test]
    fn handle_downcasts_to_concrete_surface() {
        let mut handle = SurfaceHandle::new(PixelSurface::new(8, 8));
        let px = handle.downcast_mut::<PixelSurface>().unwrap();
        px.fill([255, 0, 0, 255]);
        assert_eq!(&px.frame()[..4], &[255, 0, 0, 255]);
    }
}
