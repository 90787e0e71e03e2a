//! Proxy identities.
//!
//! Every remote object proxy is addressed by an opaque token that must stay
//! collision-free for the lifetime of a channel. UUID v4 gives that without
//! any cross-context coordination.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a remote object proxy within one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyId(Uuid);

impl ProxyId {
    /// Allocate a fresh identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
