//! In-process channel pair.
//!
//! Two contexts living in one process are paired over unbounded mpsc
//! channels; each endpoint owns a sender toward the peer and a receiver the
//! pump drains. Dropping either endpoint closes the pairing, which the peer
//! observes as `TransportClosed` on send and end-of-stream on receive.

use tokio::sync::mpsc;

use framelink_core::protocol::BatchFrame;
use framelink_core::{FramelinkError, Result};

use super::Transport;

/// Sender half of an in-process pairing.
pub struct InProcTransport {
    tx: mpsc::UnboundedSender<BatchFrame>,
}

impl Transport for InProcTransport {
    fn send(&mut self, frame: BatchFrame) -> Result<()> {
        self.tx
            .send(frame)
            .map_err(|_| FramelinkError::TransportClosed)
    }
}

/// One side of an in-process context pairing.
pub struct Endpoint {
    /// Outbound half, handed to the channel queue.
    pub transport: InProcTransport,
    /// Inbound half, drained by the pump.
    pub inbound: mpsc::UnboundedReceiver<BatchFrame>,
}

/// Build two connected endpoints.
pub fn pair() -> (Endpoint, Endpoint) {
    let (a_tx, b_rx) = mpsc::unbounded_channel();
    let (b_tx, a_rx) = mpsc::unbounded_channel();
    (
        Endpoint {
            transport: InProcTransport { tx: a_tx },
            inbound: a_rx,
        },
        Endpoint {
            transport: InProcTransport { tx: b_tx },
            inbound: b_rx,
        },
    )
}
