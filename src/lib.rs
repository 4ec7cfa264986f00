//! Gossip Network Simulator Library
//!
//! An in-process simulation of an epidemic (push-based) gossip network running
//! over a mock transport with configurable latency and packet loss, plus the
//! tooling to detect when every node has converged on a piece of state.
//!
//! ## Architecture Modules
//! Composed bottom-up:
//!
//! - **`message`**: The immutable `Message` gossiped between nodes, deduplicated by ID.
//! - **`network`**: The `MockNetwork` transport. Owns the node registry, counts every
//!   send, drops a configurable fraction and delivers the rest after a simulated delay
//!   on spawned tokio tasks.
//! - **`protocol`**: Forwarding policies behind the `GossipProtocol` trait: Fisher-Yates
//!   peer selection with a seedable random source, and the forward/skip decision.
//! - **`node`**: `GossipNode`, the stateful participant. Atomic dedup, last-write-wins
//!   state, push forwarding and optional rumor rounds.
//! - **`convergence`**: Polling-based `ConvergenceDetector`.
//! - **`simulator`**: Builds a network of nodes over a random connected topology and
//!   drives broadcasts, convergence checks and statistics.

pub mod convergence;
pub mod error;
pub mod message;
pub mod network;
pub mod node;
pub mod protocol;
pub mod simulator;

pub use error::{GossipError, Result};
