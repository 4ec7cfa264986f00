use crate::error::{GossipError, Result};
use crate::network::types::{NetworkConfig, validate_drop_rate};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything needed to build a `Simulator`.
///
/// Deserializable so a driver can load it from a JSON file; missing fields
/// fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub node_count: usize,
    pub fanout: usize,
    /// Per-hop delay in microseconds.
    pub latency_us: u64,
    /// Upper bound of the extra random per-hop delay, in microseconds.
    pub jitter_us: u64,
    pub drop_rate: f64,
    /// Seeds topology, peer selection and loss. `None` uses entropy.
    pub seed: Option<u64>,
    /// Extra re-push rounds per learned message. Zero disables them.
    pub rumor_rounds: u32,
    pub rumor_interval_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            node_count: 10,
            fanout: 3,
            latency_us: 5_000,
            jitter_us: 0,
            drop_rate: 0.0,
            seed: None,
            rumor_rounds: 8,
            rumor_interval_ms: 25,
        }
    }
}

impl SimulatorConfig {
    pub fn new(node_count: usize, fanout: usize, latency: Duration, drop_rate: f64) -> Self {
        Self {
            node_count,
            fanout,
            latency_us: u64::try_from(latency.as_micros()).unwrap_or(u64::MAX),
            drop_rate,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_count == 0 {
            return Err(GossipError::InvalidConfig(
                "node_count must be positive".to_string(),
            ));
        }

        if self.fanout == 0 {
            return Err(GossipError::InvalidConfig("fanout must be positive".to_string()));
        }

        if self.rumor_rounds > 0 && self.rumor_interval_ms == 0 {
            return Err(GossipError::InvalidConfig(
                "rumor_interval_ms must be positive when rumor rounds are enabled".to_string(),
            ));
        }

        validate_drop_rate(self.drop_rate)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_micros(self.latency_us)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_micros(self.jitter_us)
    }

    pub fn rumor_interval(&self) -> Duration {
        Duration::from_millis(self.rumor_interval_ms)
    }

    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            latency: self.latency(),
            jitter: self.jitter(),
            drop_rate: self.drop_rate,
            // Decorrelate loss from topology while staying reproducible.
            seed: self.seed.map(|seed| seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        }
    }
}

/// Post-hoc statistics of a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Every `send` attempt, dropped ones included.
    pub message_count: u64,
    pub dropped_count: u64,
    pub delivered_count: u64,
    pub undeliverable_count: u64,
    /// Sum over nodes of deliveries that carried something new.
    pub accepted_count: u64,
    /// Sum over nodes of deliveries filtered as duplicates.
    pub duplicate_count: u64,
    /// Sum over nodes of forward batches handed to the network.
    pub forward_count: u64,
}
