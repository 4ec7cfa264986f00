//! Mock Network Module
//!
//! An in-process stand-in for a real transport. It owns the registry of nodes
//! taking part in one simulation and delivers messages between them with a
//! configurable per-hop latency and drop probability.
//!
//! ## Delivery Model
//! - **Fire-and-forget**: `send` never fails and never blocks. Every call is counted,
//!   then the message is either dropped or handed to a spawned task that sleeps for
//!   the simulated latency and invokes the target's `receive_message`.
//! - **Loss is not an error**: Drops, unregistered targets and shut-down nodes are
//!   recorded in counters and logged at debug level only.
//! - **Owned, not global**: Each `MockNetwork` is an independent instance, so any
//!   number of simulations can run side by side.

pub mod mock;
pub mod transport;
pub mod types;

pub use mock::MockNetwork;
pub use transport::{Endpoint, Transport};
pub use types::{NetworkConfig, NetworkStats};

#[cfg(test)]
mod tests;
