//! Channel protocol: the message model and the batch codec.
//!
//! One batch per flush tick; messages within a batch keep enqueue order.
//! Transferable resources ride next to the wire text and are rebound to
//! their owning message at decode time.
//!
//! All parsers are panic-free: malformed input is reported as
//! `FramelinkError` instead of panicking, keeping a context resilient to a
//! misbehaving peer.

pub mod codec;
pub mod message;

pub use codec::{decode_batch, encode_batch, BatchFrame};
pub use message::{Message, MessageKind, Transferable};
