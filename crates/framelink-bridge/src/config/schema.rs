use serde::Deserialize;

use framelink_core::{FramelinkError, Result};

/// Channel runtime configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Flush cadence. 16 ms ≈ the nominal 60 flushes per second.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Soft cap on messages per batch; exceeding it logs a warning at flush
    /// time but never drops traffic.
    #[serde(default = "default_max_batch_len")]
    pub max_batch_len: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: default_flush_interval_ms(),
            max_batch_len: default_max_batch_len(),
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.flush_interval_ms) {
            return Err(FramelinkError::InvalidConfig(
                "flush_interval_ms must be between 1 and 1000".into(),
            ));
        }
        if self.max_batch_len == 0 {
            return Err(FramelinkError::InvalidConfig(
                "max_batch_len must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_flush_interval_ms() -> u64 {
    16
}

fn default_max_batch_len() -> usize {
    1024
}
