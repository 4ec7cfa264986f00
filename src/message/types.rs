use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Ordered mapping merged into a receiver's state.
pub type Payload = BTreeMap<String, serde_json::Value>;

/// Identifier of a participant in the simulated network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier of one logical broadcast.
///
/// Wrapper around a UUID v4 string. Deduplication at every receiver keys on
/// this value alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generates a new random UUID v4-based MessageId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A gossiped update.
///
/// Fields are private so a message cannot be altered once built; forwarding
/// clones the value and keeps the ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    msg_type: String,
    from: NodeId,
    payload: Payload,
    timestamp: u64,
}

impl Message {
    /// Builds a message with a freshly generated ID, stamped with the current time.
    pub fn new(msg_type: impl Into<String>, from: NodeId, payload: Payload) -> Self {
        Self::with_id(MessageId::new(), msg_type, from, payload)
    }

    /// Builds a message with a caller-supplied ID.
    ///
    /// Used for replaying a known broadcast; the caller is responsible for not
    /// pairing an existing ID with different content.
    pub fn with_id(
        id: MessageId,
        msg_type: impl Into<String>,
        from: NodeId,
        payload: Payload,
    ) -> Self {
        Self {
            id,
            msg_type: msg_type.into(),
            from,
            payload,
            timestamp: now_ms(),
        }
    }

    /// Overrides the creation time. Consumes the builder value, so a message
    /// that has already been sent cannot be re-stamped.
    pub fn stamped_at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Application-level tag, opaque to the protocol.
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// The node that originated the broadcast (not the last hop).
    pub fn from(&self) -> &NodeId {
        &self.from
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Creation time in milliseconds since the Unix epoch, from `now_ms`.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Milliseconds elapsed since the message was created.
    pub fn age_ms(&self) -> u64 {
        now_ms().saturating_sub(self.timestamp)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

/// Process-wide clock: the wall time at first use, advanced by a monotonic
/// `Instant` so later readings never step backwards.
static CLOCK: OnceLock<(Instant, u64)> = OnceLock::new();

/// Milliseconds since the Unix epoch, never decreasing within a process.
pub fn now_ms() -> u64 {
    let (base, epoch_ms) = CLOCK.get_or_init(|| {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();
        (Instant::now(), epoch_ms)
    });

    let elapsed = u64::try_from(base.elapsed().as_millis()).unwrap_or(u64::MAX);
    epoch_ms.saturating_add(elapsed)
}
