use crate::node::GossipNode;

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default interval between two convergence checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Deadline used when `started + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Outcome of one convergence check for a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub key: String,
    pub total_nodes: usize,
    /// Nodes holding the most common value for the key.
    pub agreeing_nodes: usize,
    /// Nodes that have no value for the key at all.
    pub missing_nodes: usize,
    /// The most common value, if any node holds the key.
    pub value: Option<serde_json::Value>,
}

impl ConvergenceReport {
    /// Every node holds the key, all with the same value.
    pub fn is_converged(&self) -> bool {
        self.total_nodes > 0 && self.agreeing_nodes == self.total_nodes
    }
}

pub struct ConvergenceDetector {
    nodes: Vec<Arc<GossipNode>>,
    poll_interval: Duration,
}

impl ConvergenceDetector {
    pub fn new(nodes: Vec<Arc<GossipNode>>) -> Self {
        Self {
            nodes,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Snapshots every node and tallies the values stored under `key`.
    ///
    /// Ties between equally common values go to the one seen first, in node
    /// order.
    pub fn report(&self, key: &str) -> ConvergenceReport {
        let mut tally: Vec<(serde_json::Value, usize)> = Vec::new();
        let mut missing_nodes = 0;

        for node in &self.nodes {
            match node.get_state().remove(key) {
                Some(value) => match tally.iter_mut().find(|(seen, _)| *seen == value) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((value, 1)),
                },
                None => missing_nodes += 1,
            }
        }

        let mut best: Option<(serde_json::Value, usize)> = None;
        for (value, count) in tally {
            if best.as_ref().is_none_or(|(_, top)| count > *top) {
                best = Some((value, count));
            }
        }

        let (value, agreeing_nodes) = match best {
            Some((value, count)) => (Some(value), count),
            None => (None, 0),
        };

        ConvergenceReport {
            key: key.to_string(),
            total_nodes: self.nodes.len(),
            agreeing_nodes,
            missing_nodes,
            value,
        }
    }

    /// Returns whether every node agrees on `key`, together with the number of
    /// nodes holding the most common value.
    pub fn is_converged(&self, key: &str) -> (bool, usize) {
        let report = self.report(key);
        (report.is_converged(), report.agreeing_nodes)
    }

    /// Polls until the nodes agree on `key` or `timeout` elapses.
    ///
    /// The deadline is enforced with its own timer, so a slow poll cannot push
    /// the return past it by more than one check. `Duration::MAX` waits
    /// without a practical limit.
    pub async fn wait_for_convergence(&self, key: &str, timeout: Duration) -> bool {
        let started = Instant::now();
        let deadline = started
            .checked_add(timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let report = self.report(key);

            if report.is_converged() {
                info!(
                    "Key '{}' converged on {} node(s) after {:?}",
                    key,
                    report.total_nodes,
                    started.elapsed()
                );
                return true;
            }

            if Instant::now() >= deadline {
                info!(
                    "Key '{}' did not converge within {:?}: {}/{} agree, {} missing",
                    key, timeout, report.agreeing_nodes, report.total_nodes, report.missing_nodes
                );
                return false;
            }

            debug!(
                "Key '{}': {}/{} nodes agree",
                key, report.agreeing_nodes, report.total_nodes
            );

            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::time::sleep_until(deadline) => {}
            }
        }
    }
}
