use crate::error::{GossipError, Result};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delivery characteristics of a `MockNetwork`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Fixed delay applied to every hop.
    pub latency: Duration,

    /// Upper bound of an extra uniformly distributed delay per hop.
    pub jitter: Duration,

    /// Probability in [0, 1] that a send is silently discarded.
    pub drop_rate: f64,

    /// Seed for the drop and jitter decisions. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(5),
            jitter: Duration::ZERO,
            drop_rate: 0.0,
            seed: None,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        validate_drop_rate(self.drop_rate)
    }
}

/// Rejects NaN and anything outside [0, 1].
pub fn validate_drop_rate(rate: f64) -> Result<()> {
    if (0.0..=1.0).contains(&rate) {
        Ok(())
    } else {
        Err(GossipError::InvalidDropRate(rate))
    }
}

/// Snapshot of the network counters.
///
/// `messages_sent` counts every `send` call. Each send ends up in exactly one
/// of the other three buckets once its delivery task has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub messages_sent: u64,
    pub messages_dropped: u64,
    pub messages_delivered: u64,
    /// Target was not registered at delivery time, or no runtime was available.
    pub messages_undeliverable: u64,
}

impl NetworkStats {
    /// Sends whose outcome is not known yet.
    pub fn in_flight(&self) -> u64 {
        self.messages_sent.saturating_sub(
            self.messages_dropped + self.messages_delivered + self.messages_undeliverable,
        )
    }
}
