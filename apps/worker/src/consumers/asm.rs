use std::sync::Arc;

use async_trait::async_trait;
use cybersentinel_core::asm::AsmTrigger;
use cybersentinel_core::queue::Delivery;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::{Disposition, MessageHandler};
use crate::dispatcher::{DispatchOutcome, JobDispatcher};

/// Routes discovery triggers to the job dispatcher.
pub struct AsmTriggerHandler {
    dispatcher: Arc<dyn JobDispatcher>,
}

impl AsmTriggerHandler {
    pub fn new(dispatcher: Arc<dyn JobDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl MessageHandler for AsmTriggerHandler {
    async fn handle(&self, delivery: &Delivery) -> Disposition {
        match delivery.payload.get("type").and_then(Value::as_str) {
            Some(AsmTrigger::KIND) => {}
            Some(other) => {
                warn!("Ignoring message {} of type {}", delivery.id, other);
                return Disposition::Ack;
            }
            None => {
                error!("Message {} has no type; dropping", delivery.id);
                return Disposition::Reject;
            }
        }

        let trigger: AsmTrigger = match delivery.deserialize() {
            Ok(trigger) => trigger,
            Err(e) => {
                error!("Malformed trigger {}: {}", delivery.id, e);
                return Disposition::Reject;
            }
        };

        match self.dispatcher.dispatch(&trigger).await {
            Ok(DispatchOutcome::Accepted) => {
                info!(
                    "Discovery {} dispatched ({} attempt {})",
                    trigger.asm_discovery_id, trigger.triggered_by, delivery.attempts
                );
                Disposition::Ack
            }
            Ok(DispatchOutcome::Duplicate) => {
                debug!("Discovery {} already running", trigger.asm_discovery_id);
                Disposition::Ack
            }
            Err(e) if e.is_permanent() => {
                warn!("Dropping trigger for {}: {}", trigger.asm_discovery_id, e);
                Disposition::Ack
            }
            Err(e) => {
                warn!("Dispatch of {} failed, requeueing: {}", trigger.asm_discovery_id, e);
                Disposition::Requeue
            }
        }
    }
}
