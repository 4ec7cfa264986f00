use super::topology::random_topology;
use super::types::{SimulationStats, SimulatorConfig};
use crate::convergence::{ConvergenceDetector, ConvergenceReport};
use crate::error::{GossipError, Result};
use crate::message::types::{MessageId, NodeId, Payload};
use crate::network::MockNetwork;
use crate::node::GossipNode;
use crate::protocol::{GossipProtocol, PushProtocol};

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Builds and drives one simulated gossip network.
pub struct Simulator {
    config: SimulatorConfig,
    network: Arc<MockNetwork>,
    nodes: Vec<Arc<GossipNode>>,
    index: HashMap<NodeId, usize>,
    edges: Vec<(NodeId, NodeId)>,
    detector: ConvergenceDetector,
    rumor_task: Option<JoinHandle<()>>,
}

impl Simulator {
    /// Creates a simulation of `node_count` push-gossip nodes with default
    /// settings for everything else.
    pub fn new(node_count: usize, fanout: usize, latency: Duration, drop_rate: f64) -> Result<Self> {
        Self::with_config(SimulatorConfig::new(node_count, fanout, latency, drop_rate))
    }

    /// Builds the network, the nodes and a random connected topology.
    ///
    /// Rumor rounds are driven by a background task, which needs a tokio
    /// runtime; outside one the simulation still works without them.
    pub fn with_config(config: SimulatorConfig) -> Result<Self> {
        config.validate()?;

        let network = MockNetwork::new(config.network_config())?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let protocol: Arc<dyn GossipProtocol> = match config.seed {
            Some(seed) => Arc::new(PushProtocol::with_seed(config.fanout, seed.wrapping_add(1))),
            None => Arc::new(PushProtocol::new(config.fanout)),
        };

        let mut nodes = Vec::with_capacity(config.node_count);
        let mut index = HashMap::with_capacity(config.node_count);

        for i in 0..config.node_count {
            let id = NodeId(format!("node-{}", i));
            let node = Arc::new(
                GossipNode::new(id.clone(), protocol.clone(), &network)
                    .with_rumor_rounds(config.rumor_rounds),
            );

            network.register_node(node.clone())?;
            index.insert(id, i);
            nodes.push(node);
        }

        let mut edges = Vec::new();
        for (a, b) in random_topology(config.node_count, &mut rng) {
            nodes[a].add_peer(nodes[b].id().clone());
            nodes[b].add_peer(nodes[a].id().clone());
            edges.push((nodes[a].id().clone(), nodes[b].id().clone()));
        }

        info!(
            "Simulation ready: {} nodes, {} links, fanout {}, latency {:?}, drop rate {}",
            nodes.len(),
            edges.len(),
            config.fanout,
            config.latency(),
            config.drop_rate
        );

        let rumor_task = if config.rumor_rounds > 0 {
            spawn_rumor_rounds(nodes.clone(), config.rumor_interval())
        } else {
            None
        };

        let detector = ConvergenceDetector::new(nodes.clone());

        Ok(Self {
            config,
            network,
            nodes,
            index,
            edges,
            detector,
            rumor_task,
        })
    }

    /// Starts a broadcast at `node_id`.
    ///
    /// An unknown ID fails before anything is sent.
    pub fn broadcast_from(
        &self,
        node_id: &str,
        msg_type: &str,
        payload: Payload,
    ) -> Result<MessageId> {
        let node = self
            .node(node_id)
            .ok_or_else(|| GossipError::UnknownNode(node_id.to_string()))?;

        node.broadcast(msg_type, payload)
    }

    pub async fn wait_for_convergence(&self, key: &str, timeout: Duration) -> bool {
        self.detector.wait_for_convergence(key, timeout).await
    }

    pub fn is_converged(&self, key: &str) -> (bool, usize) {
        self.detector.is_converged(key)
    }

    pub fn convergence_report(&self, key: &str) -> ConvergenceReport {
        self.detector.report(key)
    }

    pub fn get_stats(&self) -> SimulationStats {
        let network = self.network.stats();

        let mut accepted_count = 0;
        let mut duplicate_count = 0;
        let mut forward_count = 0;
        for node in &self.nodes {
            let stats = node.stats();
            accepted_count += stats.received;
            duplicate_count += stats.duplicates;
            forward_count += stats.forwards;
        }

        SimulationStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            message_count: network.messages_sent,
            dropped_count: network.messages_dropped,
            delivered_count: network.messages_delivered,
            undeliverable_count: network.messages_undeliverable,
            accepted_count,
            duplicate_count,
            forward_count,
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&Arc<GossipNode>> {
        self.index
            .get(&NodeId::new(node_id))
            .map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> &[Arc<GossipNode>] {
        &self.nodes
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id().clone()).collect()
    }

    /// Undirected links, each listed once.
    pub fn topology(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    pub fn network(&self) -> &Arc<MockNetwork> {
        &self.network
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Shuts every node down and stops rumor rounds. Deliveries already in
    /// flight still arrive and are dropped by their targets.
    pub fn shutdown(&self) {
        if let Some(task) = &self.rumor_task {
            task.abort();
        }

        for node in &self.nodes {
            node.shutdown();
        }

        info!("Simulation shut down ({} nodes)", self.nodes.len());
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        if let Some(task) = self.rumor_task.take() {
            task.abort();
        }
    }
}

fn spawn_rumor_rounds(nodes: Vec<Arc<GossipNode>>, interval: Duration) -> Option<JoinHandle<()>> {
    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            warn!("No async runtime available, rumor rounds disabled");
            return None;
        }
    };

    Some(handle.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so round one comes after the
        // initial forward wave has had a chance to land.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if nodes.iter().all(|node| node.is_shut_down()) {
                break;
            }

            for node in &nodes {
                node.gossip_round();
            }
        }
    }))
}
