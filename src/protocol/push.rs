use super::policy::{GossipProtocol, candidates, fisher_yates};
use crate::message::types::{Message, NodeId};

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Push-based gossip: every new message is forwarded to `fanout` random peers.
pub struct PushProtocol {
    fanout: usize,
    rng: Mutex<StdRng>,
}

impl PushProtocol {
    /// Creates a protocol backed by an entropy-seeded random source.
    pub fn new(fanout: usize) -> Self {
        Self::from_rng(fanout, StdRng::from_entropy())
    }

    /// Creates a protocol whose selections are reproducible for a given seed.
    pub fn with_seed(fanout: usize, seed: u64) -> Self {
        Self::from_rng(fanout, StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(fanout: usize, rng: StdRng) -> Self {
        Self {
            fanout,
            rng: Mutex::new(rng),
        }
    }
}

impl GossipProtocol for PushProtocol {
    fn fanout(&self) -> usize {
        self.fanout
    }

    fn select_peers(&self, all_peers: &[NodeId], exclude: Option<&NodeId>) -> Vec<NodeId> {
        let mut eligible = candidates(all_peers, exclude);

        fisher_yates(&mut eligible, &mut *self.rng.lock());
        eligible.truncate(self.fanout);

        eligible
    }

    fn should_forward(&self, _msg: &Message) -> bool {
        true
    }
}
