//! Message Module
//!
//! The immutable unit of information that travels between gossip nodes.
//!
//! A `Message` is identified solely by its `MessageId`: two deliveries carrying
//! the same ID are the same logical broadcast, whatever their payload. Receivers
//! rely on that to deduplicate, so callers must never reuse an ID for different
//! content.

pub mod types;
