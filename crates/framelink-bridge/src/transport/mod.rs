//! Transport seam.
//!
//! A transport carries one encoded batch at a time, fire-and-forget. The
//! queue never waits on delivery and never retries; a failed send means the
//! batch is gone.

use framelink_core::protocol::BatchFrame;
use framelink_core::Result;

pub mod in_proc;

/// One-way, fire-and-forget batch carrier.
pub trait Transport: Send {
    /// Attempt delivery of one batch. Must not block.
    fn send(&mut self, frame: BatchFrame) -> Result<()>;
}
