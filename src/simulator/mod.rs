//! Simulator Module
//!
//! The orchestration layer. A `Simulator` owns one `MockNetwork`, the nodes
//! registered on it and the random topology linking them; tests and drivers
//! only ever talk to the simulation through it.
//!
//! ## Responsibilities
//! - **Topology**: Each node links to ~30% of the population (~log2(N) for large
//!   populations), links are bidirectional, and leftover islands are stitched together.
//! - **Driving**: Broadcasts are started by node ID; rumor rounds tick in the background.
//! - **Measuring**: Convergence polling and aggregated network/node statistics.

pub mod simulator;
pub mod topology;
pub mod types;

pub use simulator::Simulator;
pub use types::{SimulationStats, SimulatorConfig};
