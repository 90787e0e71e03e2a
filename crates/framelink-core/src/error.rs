//! Shared error type across framelink crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, FramelinkError>;

/// Unified error type used by core and bridge.
///
/// The channel itself is tolerant by design: most of these never propagate
/// past a flush or dispatch boundary, they are logged and the offending
/// message is dropped.
#[derive(Debug, Error)]
pub enum FramelinkError {
    /// A message or payload did not have the expected shape.
    #[error("bad message: {0}")]
    BadMessage(String),
    /// Batch encode/decode failure.
    #[error("codec: {0}")]
    Codec(String),
    /// The far endpoint is gone; the batch cannot be delivered.
    #[error("transport closed")]
    TransportClosed,
    /// Operation not exposed by the target's capability descriptor.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Configuration failed strict parsing or validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Internal invariant failure.
    #[error("internal: {0}")]
    Internal(String),
}
