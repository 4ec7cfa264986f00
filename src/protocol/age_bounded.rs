use super::policy::GossipProtocol;
use crate::message::types::{Message, NodeId};

use std::time::Duration;

/// Stops forwarding messages older than `max_age`.
///
/// Peer selection is delegated unchanged to the wrapped policy. Nodes still
/// apply stale messages locally; they just do not re-send them.
pub struct AgeBoundedProtocol<P> {
    inner: P,
    max_age: Duration,
}

impl<P: GossipProtocol> AgeBoundedProtocol<P> {
    pub fn new(inner: P, max_age: Duration) -> Self {
        Self { inner, max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl<P: GossipProtocol> GossipProtocol for AgeBoundedProtocol<P> {
    fn fanout(&self) -> usize {
        self.inner.fanout()
    }

    fn select_peers(&self, all_peers: &[NodeId], exclude: Option<&NodeId>) -> Vec<NodeId> {
        self.inner.select_peers(all_peers, exclude)
    }

    fn should_forward(&self, msg: &Message) -> bool {
        u128::from(msg.age_ms()) <= self.max_age.as_millis() && self.inner.should_forward(msg)
    }
}
