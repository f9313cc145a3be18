use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::QueueError;

/// Identifier assigned to a message when it is published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A claimed message. It stays invisible to other consumers until it is
/// acknowledged, rejected, or its visibility timeout lapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: MessageId,
    pub queue: String,
    pub payload: serde_json::Value,
    /// Number of times this message has been claimed, including this one.
    pub attempts: i32,
    pub published_at: NaiveDateTime,
}

impl Delivery {
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, QueueError> {
        serde_json::from_value(self.payload.clone()).map_err(QueueError::from)
    }

    /// Reads the `type` discriminator that producers put on every payload.
    pub fn message_type(&self) -> Option<&str> {
        self.payload.get("type").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueHealth {
    pub connected: bool,
    pub pending: i64,
    pub inflight: i64,
    pub acked: i64,
    pub dead: i64,
}
