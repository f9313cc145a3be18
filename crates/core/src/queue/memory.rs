//! In-memory [`MessageQueue`] used by tests and single-process runs.
//!
//! Messages are lost on drop and there is no visibility timeout: an
//! inflight message only becomes available again through `nack`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::{Delivery, MessageId, MessageQueue, QueueError, QueueHealth};

const DEFAULT_MAX_ATTEMPTS: i32 = 5;

#[derive(Default)]
struct State {
    ready: HashMap<String, VecDeque<Delivery>>,
    inflight: HashMap<MessageId, Delivery>,
    acked: Vec<(MessageId, NaiveDateTime)>,
    dead: Vec<Delivery>,
}

pub struct InMemoryMessageQueue {
    state: Mutex<State>,
    counter: AtomicU64,
    max_attempts: i32,
    unavailable: AtomicBool,
}

impl Default for InMemoryMessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageQueue {
    pub fn new() -> Self {
        Self::with_max_attempts(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(max_attempts: i32) -> Self {
        Self {
            state: Mutex::new(State::default()),
            counter: AtomicU64::new(0),
            max_attempts: max_attempts.max(1),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent publish fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Payloads waiting in `queue`, oldest first.
    pub async fn pending(&self, queue: &str) -> Vec<serde_json::Value> {
        let state = self.state.lock().await;
        state
            .ready
            .get(queue)
            .map(|q| q.iter().map(|d| d.payload.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn is_acked(&self, id: &MessageId) -> bool {
        self.state
            .lock()
            .await
            .acked
            .iter()
            .any(|(acked, _)| acked == id)
    }

    pub async fn dead_letters(&self) -> Vec<Delivery> {
        self.state.lock().await.dead.clone()
    }

    fn next_id(&self) -> MessageId {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        MessageId::new(format!("mem-{}", n))
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn publish(
        &self,
        queue: &str,
        payload: &serde_json::Value,
    ) -> Result<MessageId, QueueError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(QueueError::ConnectionFailed(
                "in-memory queue marked unavailable".to_string(),
            ));
        }
        let id = self.next_id();
        let delivery = Delivery {
            id: id.clone(),
            queue: queue.to_string(),
            payload: payload.clone(),
            attempts: 0,
            published_at: chrono::Utc::now().naive_utc(),
        };
        let mut state = self.state.lock().await;
        state
            .ready
            .entry(queue.to_string())
            .or_default()
            .push_back(delivery);
        Ok(id)
    }

    async fn receive(&self, queue: &str) -> Result<Option<Delivery>, QueueError> {
        let mut state = self.state.lock().await;
        let next = state.ready.get_mut(queue).and_then(|q| q.pop_front());
        Ok(next.map(|mut delivery| {
            delivery.attempts += 1;
            state.inflight.insert(delivery.id.clone(), delivery.clone());
            delivery
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        if state.inflight.remove(&delivery.id).is_none() {
            return Err(QueueError::AckFailed(format!(
                "message {} is not inflight",
                delivery.id
            )));
        }
        state
            .acked
            .push((delivery.id.clone(), chrono::Utc::now().naive_utc()));
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery, requeue: bool) -> Result<(), QueueError> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.inflight.remove(&delivery.id) else {
            return Err(QueueError::AckFailed(format!(
                "message {} is not inflight",
                delivery.id
            )));
        };
        if requeue && stored.attempts < self.max_attempts {
            state
                .ready
                .entry(stored.queue.clone())
                .or_default()
                .push_back(stored);
        } else {
            state.dead.push(stored);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<QueueHealth, QueueError> {
        let state = self.state.lock().await;
        Ok(QueueHealth {
            connected: !self.unavailable.load(Ordering::SeqCst),
            pending: state.ready.values().map(|q| q.len() as i64).sum(),
            inflight: state.inflight.len() as i64,
            acked: state.acked.len() as i64,
            dead: state.dead.len() as i64,
        })
    }

    async fn purge_acked(&self, acked_before: NaiveDateTime) -> Result<usize, QueueError> {
        let mut state = self.state.lock().await;
        let before = state.acked.len();
        state.acked.retain(|(_, at)| *at >= acked_before);
        Ok(before - state.acked.len())
    }
}
