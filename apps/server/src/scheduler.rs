//! Background scheduler for interval discoveries.
//!
//! Each tick publishes triggers for due INTERVAL discoveries, drops expired
//! pipeline documents and purges old acked queue messages.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use cybersentinel_core::constants::ACKED_MESSAGE_RETENTION_HOURS;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Delay before the first tick so start-up work settles.
const INITIAL_DELAY_SECS: u64 = 5;

/// Starts the discovery scheduler.
pub fn start_discovery_scheduler(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Discovery scheduler started ({}s interval)", every.as_secs());
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_scheduled_tick(&state).await;
        }
    })
}

/// Runs one scheduling pass.
pub async fn run_scheduled_tick(state: &AppState) {
    let now = Utc::now().naive_utc();
    match state.asm_service.trigger_due(now).await {
        Ok(0) => debug!("No interval discoveries due"),
        Ok(count) => info!("Scheduled {} interval discoveries", count),
        Err(e) => warn!("Interval discovery scheduling failed: {}", e),
    }

    match state.pipeline_store.purge_expired().await {
        Ok(0) => {}
        Ok(count) => debug!("Purged {} expired pipeline documents", count),
        Err(e) => warn!("Pipeline purge failed: {}", e),
    }

    let cutoff = now - ChronoDuration::hours(ACKED_MESSAGE_RETENTION_HOURS);
    match state.queue.purge_acked(cutoff).await {
        Ok(0) => {}
        Ok(count) => debug!("Purged {} acked queue messages", count),
        Err(e) => warn!("Queue purge failed: {}", e),
    }
}
