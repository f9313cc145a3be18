use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

use super::{Delivery, MessageId, QueueError, QueueHealth};

/// Durable work queue with explicit acknowledgement.
///
/// `receive` claims at most one message at a time (prefetch of one). Every
/// claimed message must be passed back to `ack` or `nack`.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Publishes a JSON payload and returns the id assigned to it.
    async fn publish(
        &self,
        queue: &str,
        payload: &serde_json::Value,
    ) -> Result<MessageId, QueueError>;

    /// Claims the oldest available message, if any.
    async fn receive(&self, queue: &str) -> Result<Option<Delivery>, QueueError>;

    /// Marks a claimed message as processed.
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// Rejects a claimed message. With `requeue` it becomes available again
    /// unless it has exhausted its attempts, otherwise it is dead-lettered.
    async fn nack(&self, delivery: &Delivery, requeue: bool) -> Result<(), QueueError>;

    async fn health_check(&self) -> Result<QueueHealth, QueueError>;

    /// Drops acked messages settled before `acked_before`. Returns how many
    /// were removed.
    async fn purge_acked(&self, acked_before: NaiveDateTime) -> Result<usize, QueueError>;
}

/// Serializes `payload` and publishes it.
pub async fn publish_json<T: Serialize + Sync + ?Sized>(
    queue: &dyn MessageQueue,
    name: &str,
    payload: &T,
) -> Result<MessageId, QueueError> {
    let value = serde_json::to_value(payload)?;
    queue.publish(name, &value).await
}
