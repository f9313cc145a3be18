//! Queue consumers. Each loop claims one message at a time, hands it to a
//! handler and settles it according to the handler's verdict.

mod asm;
mod vs;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cybersentinel_core::queue::{Delivery, MessageQueue};
use tokio::sync::watch;
use tracing::{error, info, warn};

pub use asm::AsmTriggerHandler;
pub use vs::ScanJobHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    /// Make the message available again.
    Requeue,
    /// Dead-letter the message.
    Reject,
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, delivery: &Delivery) -> Disposition;
}

/// Sleeps for `period` unless shutdown is signalled first. Returns true when
/// the consumer should stop.
async fn idle(shutdown: &mut watch::Receiver<bool>, period: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(period) => *shutdown.borrow(),
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}

pub async fn run_consumer(
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
    handler: Arc<dyn MessageHandler>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Consumer for {} started", queue_name);
    loop {
        if *shutdown.borrow() {
            break;
        }

        let delivery = match queue.receive(&queue_name).await {
            Ok(Some(delivery)) => delivery,
            Ok(None) => {
                if idle(&mut shutdown, poll_interval).await {
                    break;
                }
                continue;
            }
            Err(e) => {
                warn!("Receiving from {} failed: {}", queue_name, e);
                if idle(&mut shutdown, poll_interval).await {
                    break;
                }
                continue;
            }
        };

        let settled = match handler.handle(&delivery).await {
            Disposition::Ack => queue.ack(&delivery).await,
            Disposition::Requeue => queue.nack(&delivery, true).await,
            Disposition::Reject => queue.nack(&delivery, false).await,
        };
        if let Err(e) = settled {
            error!("Settling message {} on {} failed: {}", delivery.id, queue_name, e);
        }
    }
    info!("Consumer for {} stopped", queue_name);
}
