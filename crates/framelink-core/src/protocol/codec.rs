//! Batch encode/decode.
//!
//! The wire text is a JSON array of `{kind, proxy_id?, payload,
//! transfer_len}` records. Transferables cannot serialize; they travel in a
//! frame-level list, in message order, and `transfer_len` says how many each
//! message contributed so decode can rebind them positionally.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FramelinkError, Result};
use crate::identity::ProxyId;
use crate::protocol::message::{Message, MessageKind, Transferable};

/// Serialized form of one message.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireMessage {
    kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxy_id: Option<ProxyId>,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    transfer_len: u32,
}

/// One flush worth of traffic.
#[derive(Debug)]
pub struct BatchFrame {
    /// JSON array of wire messages, in enqueue order.
    pub wire: String,
    /// Transferred resources, concatenated in message order.
    pub transfer: Vec<Transferable>,
}

/// Encode a drained batch. Consumes the messages; transferables move into
/// the frame.
pub fn encode_batch(batch: Vec<Message>) -> Result<BatchFrame> {
    let mut wire = Vec::with_capacity(batch.len());
    let mut transfer = Vec::new();
    for msg in batch {
        wire.push(WireMessage {
            kind: msg.kind,
            proxy_id: msg.proxy_id,
            payload: msg.payload,
            transfer_len: msg.transfer.len() as u32,
        });
        transfer.extend(msg.transfer);
    }
    let wire = serde_json::to_string(&wire)
        .map_err(|e| FramelinkError::Codec(format!("batch encode failed: {e}")))?;
    Ok(BatchFrame { wire, transfer })
}

/// Decode a received frame back into messages, rebinding transferables.
pub fn decode_batch(frame: BatchFrame) -> Result<Vec<Message>> {
    let wire: Vec<WireMessage> = serde_json::from_str(&frame.wire)
        .map_err(|e| FramelinkError::Codec(format!("batch decode failed: {e}")))?;

    let declared: u64 = wire.iter().map(|m| u64::from(m.transfer_len)).sum();
    if declared != frame.transfer.len() as u64 {
        return Err(FramelinkError::Codec(format!(
            "transfer list mismatch: declared {declared}, got {}",
            frame.transfer.len()
        )));
    }

    let mut resources = frame.transfer.into_iter();
    let mut out = Vec::with_capacity(wire.len());
    for wm in wire {
        let transfer: Vec<Transferable> =
            resources.by_ref().take(wm.transfer_len as usize).collect();
        out.push(Message {
            kind: wm.kind,
            proxy_id: wm.proxy_id,
            payload: wm.payload,
            transfer,
        });
    }
    Ok(out)
}
