//! Top-level facade crate for framelink.
//!
//! Re-exports the core protocol types and the bridge runtime so users can
//! depend on a single crate.

pub mod core {
    pub use framelink_core::*;
}

pub mod bridge {
    pub use framelink_bridge::*;
}
