use crate::message::types::{Message, MessageId, Payload};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-node traffic counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    /// Broadcasts this node started.
    pub originated: u64,
    /// Deliveries that carried a message this node had not seen.
    pub received: u64,
    /// Deliveries filtered out by the seen-set.
    pub duplicates: u64,
    /// Forward batches handed to the transport (one per message per wave or round).
    pub forwards: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub originated: AtomicU64,
    pub received: AtomicU64,
    pub duplicates: AtomicU64,
    pub forwards: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> NodeStats {
        NodeStats {
            originated: self.originated.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            forwards: self.forwards.load(Ordering::Relaxed),
        }
    }
}

/// A message still being re-pushed during rumor rounds.
#[derive(Debug, Clone)]
pub(crate) struct Rumor {
    pub message: Message,
    pub rounds_left: u32,
}

/// Everything guarded by the node's single state lock.
#[derive(Debug, Default)]
pub(crate) struct LocalState {
    pub seen: HashSet<MessageId>,
    pub values: Payload,
    pub rumors: Vec<Rumor>,
}

impl LocalState {
    /// Last-write-wins merge of `payload` into the local values.
    pub fn merge(&mut self, payload: &Payload) {
        for (key, value) in payload {
            self.values.insert(key.clone(), value.clone());
        }
    }
}
