use super::types::{Counters, LocalState, NodeStats, Rumor};
use crate::error::{GossipError, Result};
use crate::message::types::{Message, MessageId, NodeId, Payload};
use crate::network::transport::{Endpoint, Transport};
use crate::protocol::GossipProtocol;

use parking_lot::{Mutex, RwLock};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// A participant in the gossip network.
///
/// The node only holds a weak reference to its transport: the network owns the
/// nodes through its registry, and a strong back-reference would keep both
/// alive forever.
pub struct GossipNode {
    id: NodeId,
    peers: RwLock<BTreeSet<NodeId>>,
    local: Mutex<LocalState>,
    protocol: Arc<dyn GossipProtocol>,
    transport: Weak<dyn Transport>,
    rumor_rounds: u32,
    shut_down: AtomicBool,
    counters: Counters,
}

impl GossipNode {
    pub fn new<T>(id: NodeId, protocol: Arc<dyn GossipProtocol>, transport: &Arc<T>) -> Self
    where
        T: Transport + 'static,
    {
        let transport: Weak<T> = Arc::downgrade(transport);
        let transport: Weak<dyn Transport> = transport;

        Self {
            id,
            peers: RwLock::new(BTreeSet::new()),
            local: Mutex::new(LocalState::default()),
            protocol,
            transport,
            rumor_rounds: 0,
            shut_down: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// Number of extra rounds each newly learned message is re-pushed for when
    /// `gossip_round` is driven. Zero (the default) disables rumor rounds.
    pub fn with_rumor_rounds(mut self, rounds: u32) -> Self {
        self.rumor_rounds = rounds;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn fanout(&self) -> usize {
        self.protocol.fanout()
    }

    /// Adds a neighbour. Re-adding a known peer or the node itself is a no-op.
    ///
    /// Returns whether the peer set changed.
    pub fn add_peer(&self, peer: NodeId) -> bool {
        if peer == self.id {
            debug!("Node {} ignored request to peer with itself", self.id);
            return false;
        }

        self.peers.write().insert(peer)
    }

    pub fn peers(&self) -> Vec<NodeId> {
        self.peers.read().iter().cloned().collect()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    /// Originates a new message.
    ///
    /// The update is visible in this node's state before the call returns. With
    /// no peers there is nobody to tell, which is not an error. Fails only if
    /// there are peers to reach but the network has already been torn down.
    pub fn broadcast(&self, msg_type: &str, payload: Payload) -> Result<MessageId> {
        let msg = Message::new(msg_type, self.id.clone(), payload);
        let msg_id = msg.id().clone();

        if self.is_shut_down() {
            debug!("Node {} is shut down, broadcast {} not sent", self.id, msg_id);
            return Ok(msg_id);
        }

        {
            let mut local = self.local.lock();
            local.seen.insert(msg_id.clone());
            local.merge(msg.payload());
            self.remember(&mut local, &msg);
        }
        Counters::bump(&self.counters.originated);

        let peers = self.peers();
        if peers.is_empty() {
            debug!("Node {} has no peers, {} applied locally only", self.id, msg_id);
            return Ok(msg_id);
        }

        let transport = self
            .transport
            .upgrade()
            .ok_or(GossipError::NetworkUnavailable)?;

        let targets = self.protocol.select_peers(&peers, None);
        debug!(
            "Node {} broadcasting {} ({}) to {} peer(s)",
            self.id,
            msg_id,
            msg.msg_type(),
            targets.len()
        );
        self.send_all(&*transport, &targets, &msg);

        Ok(msg_id)
    }

    /// Core protocol step. Safe to call from any number of tasks at once.
    ///
    /// Returns `true` only for the first delivery of a given message ID. Later
    /// deliveries change nothing and trigger no forwarding. A shut-down node
    /// drops everything and returns `false`.
    pub fn receive_message(&self, msg: Message, from: &NodeId) -> bool {
        if self.is_shut_down() {
            debug!("Node {} is shut down, dropping {}", self.id, msg.id());
            return false;
        }

        let forward = {
            let mut local = self.local.lock();

            if !local.seen.insert(msg.id().clone()) {
                Counters::bump(&self.counters.duplicates);
                return false;
            }

            local.merge(msg.payload());

            let forward = self.protocol.should_forward(&msg);
            if forward {
                self.remember(&mut local, &msg);
            }
            forward
        };
        Counters::bump(&self.counters.received);

        if forward {
            self.forward(&msg, Some(from));
        } else {
            debug!("Node {} applied {} without forwarding", self.id, msg.id());
        }

        true
    }

    /// Runs one rumor round: re-pushes every message that still has rounds
    /// left to a fresh random selection of peers.
    ///
    /// Returns how many messages were re-pushed.
    pub fn gossip_round(&self) -> usize {
        if self.is_shut_down() {
            return 0;
        }

        let due: Vec<Message> = {
            let mut local = self.local.lock();
            let due = local
                .rumors
                .iter()
                .map(|rumor| rumor.message.clone())
                .collect();

            for rumor in local.rumors.iter_mut() {
                rumor.rounds_left -= 1;
            }
            local.rumors.retain(|rumor| rumor.rounds_left > 0);

            due
        };

        for msg in &due {
            self.forward(msg, None);
        }

        due.len()
    }

    /// Snapshot of the local state. Never exposes the live map.
    pub fn get_state(&self) -> Payload {
        self.local.lock().values.clone()
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.local.lock().values.get(key).cloned()
    }

    pub fn has_seen(&self, id: &MessageId) -> bool {
        self.local.lock().seen.contains(id)
    }

    pub fn seen_count(&self) -> usize {
        self.local.lock().seen.len()
    }

    /// Messages still scheduled for rumor rounds.
    pub fn pending_rumors(&self) -> usize {
        self.local.lock().rumors.len()
    }

    pub fn stats(&self) -> NodeStats {
        self.counters.snapshot()
    }

    /// Marks the node inert. Deliveries already in flight are dropped on
    /// arrival; nothing panics.
    pub fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Node {} shut down", self.id);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn remember(&self, local: &mut LocalState, msg: &Message) {
        if self.rumor_rounds > 0 {
            local.rumors.push(Rumor {
                message: msg.clone(),
                rounds_left: self.rumor_rounds,
            });
        }
    }

    fn forward(&self, msg: &Message, exclude: Option<&NodeId>) {
        let peers = self.peers();
        let targets = self.protocol.select_peers(&peers, exclude);
        if targets.is_empty() {
            return;
        }

        match self.transport.upgrade() {
            Some(transport) => self.send_all(&*transport, &targets, msg),
            None => debug!("Node {} lost its network, {} not forwarded", self.id, msg.id()),
        }
    }

    fn send_all(&self, transport: &dyn Transport, targets: &[NodeId], msg: &Message) {
        if targets.is_empty() {
            return;
        }

        for target in targets {
            transport.send(&self.id, target, msg.clone());
        }
        Counters::bump(&self.counters.forwards);
    }
}

impl Endpoint for GossipNode {
    fn id(&self) -> &NodeId {
        &self.id
    }

    fn receive_message(&self, msg: Message, from: &NodeId) -> bool {
        GossipNode::receive_message(self, msg, from)
    }
}
