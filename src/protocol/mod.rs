//! Gossip Protocol Module
//!
//! Pure decision policies consumed by `GossipNode`: which peers receive a
//! forwarded message and whether a message is forwarded at all.
//!
//! ## Submodules
//! - **`policy`**: The `GossipProtocol` trait and the explicit Fisher-Yates shuffle
//!   every selection goes through.
//! - **`push`**: Basic push gossip. Always forwards, to `fanout` random peers.
//! - **`age_bounded`**: Wraps another policy and stops forwarding stale messages.

pub mod age_bounded;
pub mod policy;
pub mod push;

pub use age_bounded::AgeBoundedProtocol;
pub use policy::{GossipProtocol, fisher_yates};
pub use push::PushProtocol;
