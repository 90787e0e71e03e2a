//! framelink core: transport-agnostic message primitives, identity, and the
//! event serializer.
//!
//! This crate defines the wire-level contracts shared by both sides of a
//! channel: the batched message model, the transferable-resource envelope,
//! proxy identities, and the scalar-only event serializer. It intentionally
//! carries no runtime or transport dependencies so either endpoint of a
//! channel can reuse it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `FramelinkError`/`Result`; a malformed
//! batch from the far side must never crash the receiving context.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod identity;
pub mod protocol;
pub mod simplify;
pub mod surface;

pub use error::{FramelinkError, Result};
pub use identity::ProxyId;
pub use protocol::{BatchFrame, Message, MessageKind, Transferable};
pub use surface::{PixelSurface, RenderSurface, SurfaceGeometry, SurfaceHandle};
