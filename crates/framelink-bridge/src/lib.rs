//! framelink bridge: the channel-queue runtime.
//!
//! This crate wires the batched channel queue, the event-forwarding bridge,
//! remote object proxies and their far-side hosts, the surface handoff, and
//! the viewport shim into a cohesive runtime. It is consumed by the demo
//! binary (`main.rs`) and by integration tests.

pub mod bridge;
pub mod config;
pub mod handoff;
pub mod proxy;
pub mod pump;
pub mod queue;
pub mod shim;
pub mod transport;

pub use bridge::{EventBridge, EventTarget, ListenerId, LocalEventHub, RemoteEvent};
pub use config::ChannelConfig;
pub use handoff::{install_receiver, send_surface, SurfaceDescriptor};
pub use proxy::{capability_for, Capability, RemoteObjectProxy};
pub use queue::ChannelQueue;
pub use shim::ViewportShim;
