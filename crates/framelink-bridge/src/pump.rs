//! The per-context event loop.
//!
//! One pump task per queue: a fixed-cadence flush tick interleaved with
//! inbound frame delivery on a single `select!` loop. Nothing else touches
//! the queue concurrently while its pump runs, mirroring the one-event-loop
//! cooperative model on each side of the channel.

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use framelink_core::protocol::BatchFrame;

use crate::config::ChannelConfig;
use crate::queue::ChannelQueue;

/// Drive one queue until the peer endpoint closes.
pub async fn run(
    queue: ChannelQueue,
    mut inbound: mpsc::UnboundedReceiver<BatchFrame>,
    cfg: ChannelConfig,
) {
    let mut tick = interval(Duration::from_millis(cfg.flush_interval_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick.tick() => queue.flush(),
            frame = inbound.recv() => match frame {
                Some(frame) => queue.on_frame(frame),
                None => {
                    // Final flush is best-effort; the peer is already gone.
                    queue.flush();
                    tracing::info!("peer endpoint closed; pump exiting");
                    break;
                }
            }
        }
    }
}
