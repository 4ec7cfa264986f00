//! Convergence Module
//!
//! Convergence is a global property with no single owner to notify, so it is
//! measured by polling: snapshot every node's state and compare the value held
//! under one key.

pub mod detector;

pub use detector::{ConvergenceDetector, ConvergenceReport};
