use crate::message::types::{Message, NodeId};

/// Outbound side of the network, as seen by a node.
pub trait Transport: Send + Sync {
    /// Queues `msg` for delivery from `from` to `to`. Must not block.
    fn send(&self, from: &NodeId, to: &NodeId, msg: Message);
}

/// Inbound side of the network: anything a message can be delivered to.
pub trait Endpoint: Send + Sync {
    fn id(&self) -> &NodeId;

    /// Handles one delivery. `from` is the immediate sender, which may differ
    /// from `msg.from()`. Returns `true` if the message was new to this endpoint.
    fn receive_message(&self, msg: Message, from: &NodeId) -> bool;
}
