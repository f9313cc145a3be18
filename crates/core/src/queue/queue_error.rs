use thiserror::Error;

/// Errors raised by [`MessageQueue`](super::MessageQueue) implementations.
#[derive(Error, Debug, Clone)]
pub enum QueueError {
    /// The backing store could not be reached.
    #[error("Connection error: {0}")]
    ConnectionFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Acknowledge failed: {0}")]
    AckFailed(String),

    /// The payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Queue closed: {0}")]
    Closed(String),
}

impl QueueError {
    /// Returns `true` when retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::ReceiveFailed(_))
    }

    /// Short error kind for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionFailed(_) => "connection",
            Self::PublishFailed(_) => "publish",
            Self::ReceiveFailed(_) => "receive",
            Self::AckFailed(_) => "ack",
            Self::Serialization(_) => "serialization",
            Self::Closed(_) => "closed",
        }
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(QueueError::ConnectionFailed("down".into()).is_transient());
        assert!(QueueError::ReceiveFailed("busy".into()).is_transient());
        assert!(!QueueError::Serialization("bad".into()).is_transient());
        assert!(!QueueError::Closed("bye".into()).is_transient());
    }

    #[test]
    fn kind_labels() {
        assert_eq!(QueueError::AckFailed("x".into()).kind(), "ack");
        assert_eq!(QueueError::PublishFailed("x".into()).kind(), "publish");
    }
}
