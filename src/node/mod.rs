//! Gossip Node Module
//!
//! The stateful participant of the simulation.
//!
//! ## Core Mechanisms
//! - **Deduplication**: The seen-set check-and-insert and the payload merge happen in
//!   one critical section, so concurrent deliveries of the same message can never both
//!   be treated as new. This bounds re-transmission to one forward wave per node.
//! - **Last-Write-Wins State**: Payload entries overwrite local keys with no ordering
//!   across concurrent messages. Convergence is eventual only.
//! - **Push Forwarding**: New messages are re-sent through the transport to peers picked
//!   by the node's `GossipProtocol`, excluding the peer it came from.
//! - **Rumor Rounds**: Optionally, recently learned messages are pushed again for a few
//!   rounds, so a node missed by the first wave still hears about them.

pub mod gossip_node;
pub mod types;

pub use gossip_node::GossipNode;
pub use types::NodeStats;
