use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use log::{debug, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::model::{
    QueueMessageDB, STATUS_ACKED, STATUS_DEAD, STATUS_INFLIGHT, STATUS_PENDING,
};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::queue_messages;
use cybersentinel_core::queue::{Delivery, MessageId, MessageQueue, QueueError, QueueHealth};
use cybersentinel_core::Result;

#[derive(Debug, Clone, Copy)]
pub struct QueueOptions {
    /// How long a claimed message stays invisible before it can be claimed
    /// again.
    pub visibility_timeout: Duration,
    /// Claims allowed before a message is dead-lettered.
    pub max_attempts: i32,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::minutes(10),
            max_attempts: 5,
        }
    }
}

/// Queue rows live in the same SQLite file as everything else. Claims go
/// through the single writer, so two consumers never receive the same
/// message while it is inflight.
pub struct SqliteMessageQueue {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    options: QueueOptions,
}

impl SqliteMessageQueue {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self::with_options(pool, writer, QueueOptions::default())
    }

    pub fn with_options(pool: Arc<DbPool>, writer: WriteHandle, options: QueueOptions) -> Self {
        Self {
            pool,
            writer,
            options: QueueOptions {
                max_attempts: options.max_attempts.max(1),
                ..options
            },
        }
    }
}

fn to_delivery(row: QueueMessageDB) -> Result<Delivery> {
    Ok(Delivery {
        id: MessageId::new(row.id),
        queue: row.queue,
        payload: serde_json::from_str(&row.payload).into_core()?,
        attempts: row.attempts,
        published_at: row.created_at,
    })
}

#[async_trait]
impl MessageQueue for SqliteMessageQueue {
    async fn publish(
        &self,
        queue: &str,
        payload: &serde_json::Value,
    ) -> std::result::Result<MessageId, QueueError> {
        let now = Utc::now().naive_utc();
        let row = QueueMessageDB {
            id: Uuid::new_v4().to_string(),
            queue: queue.to_string(),
            payload: serde_json::to_string(payload)?,
            status: STATUS_PENDING.to_string(),
            attempts: 0,
            available_at: now,
            locked_at: None,
            created_at: now,
        };
        let id = MessageId::new(row.id.clone());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(queue_messages::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
            .map_err(|e| QueueError::PublishFailed(e.to_string()))?;
        debug!("Published message {} to {}", id, queue);
        Ok(id)
    }

    async fn receive(&self, queue: &str) -> std::result::Result<Option<Delivery>, QueueError> {
        let queue = queue.to_string();
        let options = self.options;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<Delivery>> {
                let now = Utc::now().naive_utc();
                let lapsed = now - options.visibility_timeout;
                loop {
                    let candidate = queue_messages::table
                        .filter(queue_messages::queue.eq(&queue))
                        .filter(
                            queue_messages::status
                                .eq(STATUS_PENDING)
                                .and(queue_messages::available_at.le(now))
                                .or(queue_messages::status
                                    .eq(STATUS_INFLIGHT)
                                    .and(queue_messages::locked_at.le(lapsed))),
                        )
                        .order((queue_messages::created_at.asc(), queue_messages::id.asc()))
                        .select(QueueMessageDB::as_select())
                        .first(conn)
                        .optional()
                        .map_err(StorageError::from)?;

                    let Some(mut row) = candidate else {
                        return Ok(None);
                    };

                    // A lapsed claim that already used every attempt is not handed out again.
                    if row.status == STATUS_INFLIGHT && row.attempts >= options.max_attempts {
                        warn!("Message {} exhausted its attempts, dead-lettering", row.id);
                        diesel::update(queue_messages::table.find(&row.id))
                            .set(queue_messages::status.eq(STATUS_DEAD))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        continue;
                    }

                    row.attempts += 1;
                    row.status = STATUS_INFLIGHT.to_string();
                    row.locked_at = Some(now);
                    diesel::update(queue_messages::table.find(&row.id))
                        .set((
                            queue_messages::status.eq(STATUS_INFLIGHT),
                            queue_messages::attempts.eq(row.attempts),
                            queue_messages::locked_at.eq(row.locked_at),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    return to_delivery(row).map(Some);
                }
            })
            .await
            .map_err(|e| QueueError::ReceiveFailed(e.to_string()))
    }

    async fn ack(&self, delivery: &Delivery) -> std::result::Result<(), QueueError> {
        let id = delivery.id.as_str().to_string();
        let settled = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::update(
                    queue_messages::table
                        .filter(queue_messages::id.eq(id))
                        .filter(queue_messages::status.eq(STATUS_INFLIGHT)),
                )
                .set((
                    queue_messages::status.eq(STATUS_ACKED),
                    queue_messages::locked_at.eq(Some(Utc::now().naive_utc())),
                ))
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
            .map_err(|e| QueueError::AckFailed(e.to_string()))?;
        if settled == 0 {
            return Err(QueueError::AckFailed(format!(
                "message {} is not inflight",
                delivery.id
            )));
        }
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery, requeue: bool) -> std::result::Result<(), QueueError> {
        let id = delivery.id.as_str().to_string();
        let max_attempts = self.options.max_attempts;
        let found = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let row = queue_messages::table
                    .find(&id)
                    .filter(queue_messages::status.eq(STATUS_INFLIGHT))
                    .select(QueueMessageDB::as_select())
                    .first(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                let Some(row) = row else {
                    return Ok(false);
                };
                let target = queue_messages::table.find(&row.id);
                if requeue && row.attempts < max_attempts {
                    diesel::update(target)
                        .set((
                            queue_messages::status.eq(STATUS_PENDING),
                            queue_messages::locked_at.eq(None::<chrono::NaiveDateTime>),
                            queue_messages::available_at.eq(Utc::now().naive_utc()),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                } else {
                    diesel::update(target)
                        .set(queue_messages::status.eq(STATUS_DEAD))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(true)
            })
            .await
            .map_err(|e| QueueError::AckFailed(e.to_string()))?;
        if !found {
            return Err(QueueError::AckFailed(format!(
                "message {} is not inflight",
                delivery.id
            )));
        }
        Ok(())
    }

    async fn health_check(&self) -> std::result::Result<QueueHealth, QueueError> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;
        let grouped = queue_messages::table
            .group_by(queue_messages::status)
            .select((queue_messages::status, diesel::dsl::count_star()))
            .load::<(String, i64)>(&mut conn)
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;

        let mut health = QueueHealth {
            connected: true,
            pending: 0,
            inflight: 0,
            acked: 0,
            dead: 0,
        };
        for (status, count) in grouped {
            match status.as_str() {
                STATUS_PENDING => health.pending = count,
                STATUS_INFLIGHT => health.inflight = count,
                STATUS_ACKED => health.acked = count,
                STATUS_DEAD => health.dead = count,
                _ => {}
            }
        }
        Ok(health)
    }

    async fn purge_acked(
        &self,
        acked_before: NaiveDateTime,
    ) -> std::result::Result<usize, QueueError> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    queue_messages::table
                        .filter(queue_messages::status.eq(STATUS_ACKED))
                        .filter(queue_messages::locked_at.lt(acked_before)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))
    }
}
