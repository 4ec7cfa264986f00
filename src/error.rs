use thiserror::Error;

/// Errors surfaced synchronously by the simulation.
///
/// Packet loss and duplicate deliveries are normal protocol outcomes and never
/// show up here; they are reported through booleans and counters instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GossipError {
    #[error("Drop rate must be within [0, 1], got {0}")]
    InvalidDropRate(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Node already registered: {0}")]
    DuplicateNode(String),

    #[error("Network is no longer available")]
    NetworkUnavailable,
}

pub type Result<T> = std::result::Result<T, GossipError>;
