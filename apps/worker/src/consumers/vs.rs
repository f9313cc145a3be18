use std::sync::Arc;

use async_trait::async_trait;
use cybersentinel_core::queue::Delivery;
use cybersentinel_core::scans::{ScanJob, ScanServiceTrait, Scanner};
use tracing::{error, info, warn};

use super::{Disposition, MessageHandler};

/// Runs vulnerability scans published by the API.
pub struct ScanJobHandler {
    scan_service: Arc<dyn ScanServiceTrait>,
    scanner: Arc<dyn Scanner>,
}

impl ScanJobHandler {
    pub fn new(scan_service: Arc<dyn ScanServiceTrait>, scanner: Arc<dyn Scanner>) -> Self {
        Self {
            scan_service,
            scanner,
        }
    }
}

#[async_trait]
impl MessageHandler for ScanJobHandler {
    async fn handle(&self, delivery: &Delivery) -> Disposition {
        let job: ScanJob = match delivery.deserialize() {
            Ok(job) => job,
            Err(e) => {
                error!("Malformed scan job {}: {}", delivery.id, e);
                return Disposition::Reject;
            }
        };
        if job.kind != ScanJob::KIND {
            warn!("Ignoring message {} of type {}", delivery.id, job.kind);
            return Disposition::Ack;
        }

        match self.scan_service.run_scan(&job, self.scanner.as_ref()).await {
            Ok(Some(status)) => {
                info!("Scan {} finished as {}", job.scan_id, status.as_str());
                Disposition::Ack
            }
            Ok(None) => Disposition::Ack,
            Err(e) => {
                warn!("Scan {} could not be recorded, requeueing: {}", job.scan_id, e);
                Disposition::Requeue
            }
        }
    }
}
