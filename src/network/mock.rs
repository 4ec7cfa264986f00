use super::transport::{Endpoint, Transport};
use super::types::{NetworkConfig, NetworkStats, validate_drop_rate};
use crate::error::{GossipError, Result};
use crate::message::types::{Message, NodeId};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    dropped: AtomicU64,
    delivered: AtomicU64,
    undeliverable: AtomicU64,
}

/// Simulated point-to-point transport for one simulation run.
pub struct MockNetwork {
    /// Registered endpoints. Write-once per ID.
    nodes: Arc<DashMap<NodeId, Arc<dyn Endpoint>>>,
    config: RwLock<NetworkConfig>,
    /// Drives both the drop decision and jitter.
    rng: Mutex<StdRng>,
    counters: Arc<Counters>,
}

impl MockNetwork {
    pub fn new(config: NetworkConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Arc::new(Self {
            nodes: Arc::new(DashMap::new()),
            config: RwLock::new(config),
            rng: Mutex::new(rng),
            counters: Arc::new(Counters::default()),
        }))
    }

    /// Adds an endpoint to the registry.
    ///
    /// A second registration under an ID that is already present is rejected
    /// with `GossipError::DuplicateNode`; the original endpoint stays in place.
    pub fn register_node(&self, node: Arc<dyn Endpoint>) -> Result<()> {
        let id = node.id().clone();

        match self.nodes.entry(id.clone()) {
            Entry::Occupied(_) => {
                warn!("Rejected duplicate registration of {}", id);
                Err(GossipError::DuplicateNode(id.0))
            }
            Entry::Vacant(slot) => {
                slot.insert(node);
                debug!("Registered node {} ({} total)", id, self.nodes.len());
                Ok(())
            }
        }
    }

    /// Removes an endpoint. Deliveries still in flight to it become undeliverable.
    pub fn unregister_node(&self, id: &NodeId) -> bool {
        let removed = self.nodes.remove(id).is_some();
        if removed {
            info!("Unregistered node {}", id);
        }
        removed
    }

    pub fn is_registered(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn set_latency(&self, latency: Duration) {
        self.config.write().latency = latency;
    }

    pub fn set_jitter(&self, jitter: Duration) {
        self.config.write().jitter = jitter;
    }

    /// Updates the loss probability. Values outside [0, 1] (and NaN) are
    /// rejected and the previous rate is kept.
    pub fn set_drop_rate(&self, rate: f64) -> Result<()> {
        validate_drop_rate(rate)?;
        self.config.write().drop_rate = rate;
        Ok(())
    }

    pub fn config(&self) -> NetworkConfig {
        self.config.read().clone()
    }

    /// Cumulative number of `send` calls, dropped ones included.
    pub fn message_count(&self) -> u64 {
        self.counters.sent.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> NetworkStats {
        // Outcomes first: every outcome is preceded by its `sent` increment,
        // so reading `sent` last keeps `in_flight` from going negative.
        let messages_dropped = self.counters.dropped.load(Ordering::SeqCst);
        let messages_delivered = self.counters.delivered.load(Ordering::SeqCst);
        let messages_undeliverable = self.counters.undeliverable.load(Ordering::SeqCst);

        NetworkStats {
            messages_sent: self.counters.sent.load(Ordering::SeqCst),
            messages_dropped,
            messages_delivered,
            messages_undeliverable,
        }
    }

    /// Decides the fate of one send: `None` if dropped, otherwise the delay.
    fn roll(&self) -> Option<Duration> {
        let (latency, jitter, drop_rate) = {
            let config = self.config.read();
            (config.latency, config.jitter, config.drop_rate)
        };

        let mut rng = self.rng.lock();

        if drop_rate > 0.0 && rng.gen_bool(drop_rate) {
            return None;
        }

        let extra = match u64::try_from(jitter.as_micros()) {
            Ok(0) => Duration::ZERO,
            Ok(max) => Duration::from_micros(rng.gen_range(0..=max)),
            Err(_) => jitter,
        };

        Some(latency.saturating_add(extra))
    }
}

impl Transport for MockNetwork {
    fn send(&self, from: &NodeId, to: &NodeId, msg: Message) {
        self.counters.sent.fetch_add(1, Ordering::SeqCst);

        let Some(delay) = self.roll() else {
            self.counters.dropped.fetch_add(1, Ordering::SeqCst);
            debug!("Dropped {} on {} -> {}", msg.id(), from, to);
            return;
        };

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                self.counters.undeliverable.fetch_add(1, Ordering::SeqCst);
                warn!("No async runtime available, discarding {} -> {}", from, to);
                return;
            }
        };

        let nodes = self.nodes.clone();
        let counters = self.counters.clone();
        let from = from.clone();
        let to = to.clone();

        handle.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            // Clone out of the map so no shard lock is held while the target
            // runs, since it may send (and register lookups) in turn.
            let target = nodes.get(&to).map(|entry| entry.value().clone());

            match target {
                Some(node) => {
                    counters.delivered.fetch_add(1, Ordering::SeqCst);
                    let fresh = node.receive_message(msg, &from);
                    debug!("Delivered {} -> {} (new={})", from, to, fresh);
                }
                None => {
                    counters.undeliverable.fetch_add(1, Ordering::SeqCst);
                    debug!("Target {} is not registered, message lost", to);
                }
            }
        });
    }
}
