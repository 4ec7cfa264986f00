use crate::message::types::{Message, NodeId};
use rand::Rng;

/// Forwarding policy shared (read-only) by every node of a simulation.
///
/// Implementations must be stateless apart from configuration and a random
/// source, so one instance can serve all nodes concurrently.
pub trait GossipProtocol: Send + Sync {
    /// Number of peers targeted per forward.
    fn fanout(&self) -> usize;

    /// Picks at most `fanout()` distinct peers from `all_peers`, never `exclude`.
    fn select_peers(&self, all_peers: &[NodeId], exclude: Option<&NodeId>) -> Vec<NodeId>;

    /// Whether a newly seen message should be re-sent at all.
    fn should_forward(&self, msg: &Message) -> bool;
}

/// In-place Fisher-Yates (Durstenfeld) shuffle.
///
/// Every permutation is equally likely given a uniform `rng`.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Removes `exclude` and duplicate entries.
///
/// Output is sorted, so a seeded shuffle over it is reproducible regardless of
/// the order peers were added in.
pub(crate) fn candidates(all_peers: &[NodeId], exclude: Option<&NodeId>) -> Vec<NodeId> {
    let mut candidates: Vec<NodeId> = all_peers
        .iter()
        .filter(|peer| Some(*peer) != exclude)
        .cloned()
        .collect();
    candidates.sort();
    candidates.dedup();
    candidates
}
