//! In-memory registry of discovery jobs.
//!
//! A job id is the discovery id, so one discovery never runs twice at the
//! same time on this worker. Execution is bounded by a semaphore and a
//! per-job timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use cybersentinel_core::asm::{
    AsmDiscovery, AsmDiscoveryRun, AsmServiceTrait, AsmTrigger, RunMode, TriggeredBy,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::sync::{RwLock, Semaphore};
use tracing::{error, info, warn};

use crate::executor::Executor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub run_id: Option<String>,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Body of a job start request, on the wire and in process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub id: String,
    #[serde(default)]
    pub triggered_by: TriggeredBy,
    #[serde(default)]
    pub run_mode: RunMode,
}

impl From<&AsmTrigger> for JobRequest {
    fn from(trigger: &AsmTrigger) -> Self {
        Self {
            kind: trigger.kind.clone(),
            user_id: trigger.user_id.clone(),
            id: trigger.asm_discovery_id.clone(),
            triggered_by: trigger.triggered_by,
            run_mode: trigger.run_mode,
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("unsupported job type: {0}")]
    UnsupportedType(String),
    #[error("job already exists: {0}")]
    Duplicate(String),
    #[error("discovery not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Core(#[from] cybersentinel_core::Error),
}

pub struct JobManager {
    jobs: RwLock<HashMap<String, Job>>,
    asm_service: Arc<dyn AsmServiceTrait>,
    executor: Arc<Executor>,
    permits: Semaphore,
    timeout: Duration,
}

impl JobManager {
    pub fn new(
        asm_service: Arc<dyn AsmServiceTrait>,
        executor: Arc<Executor>,
        max_concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            asm_service,
            executor,
            permits: Semaphore::new(max_concurrency.max(1)),
            timeout,
        }
    }

    /// Registers the job, prepares its run and starts it in the background.
    pub async fn register(self: &Arc<Self>, request: JobRequest) -> Result<Job, JobError> {
        if request.kind != AsmTrigger::KIND {
            return Err(JobError::UnsupportedType(request.kind));
        }

        {
            let mut jobs = self.jobs.write().await;
            if jobs.get(&request.id).is_some_and(|j| !j.state.is_finished()) {
                return Err(JobError::Duplicate(request.id));
            }
            let now = Utc::now().naive_utc();
            jobs.insert(
                request.id.clone(),
                Job {
                    id: request.id.clone(),
                    kind: request.kind.clone(),
                    user_id: request.user_id.clone(),
                    run_id: None,
                    state: JobState::Pending,
                    error: None,
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        let discovery = match self.asm_service.find_discovery(&request.id) {
            Ok(discovery) => discovery,
            Err(e) => {
                self.forget(&request.id).await;
                return Err(if e.is_not_found() {
                    JobError::NotFound(request.id)
                } else {
                    JobError::Core(e)
                });
            }
        };

        let run = match self
            .asm_service
            .begin_run(&discovery, request.triggered_by, request.run_mode)
            .await
        {
            Ok((run, document)) => {
                info!(
                    "Job {} registered: run {} with {} tools",
                    request.id,
                    run.id,
                    document.pipeline.len()
                );
                run
            }
            Err(e) => {
                self.forget(&request.id).await;
                return Err(JobError::Core(e));
            }
        };

        let job = self
            .transition(&request.id, JobState::Running, Some(run.id.clone()), None)
            .await;

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            manager.execute(discovery, run).await;
        });

        job.ok_or(JobError::NotFound(request.id))
    }

    async fn execute(&self, discovery: AsmDiscovery, run: AsmDiscoveryRun) {
        let Ok(_permit) = self.permits.acquire().await else {
            warn!("Job {} dropped: executor pool closed", discovery.id);
            return;
        };

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.executor.execute(&discovery, &run),
        )
        .await
        {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => {
                let message = format!("job timed out after {}s", self.timeout.as_secs());
                if let Err(e) = self.executor.abort(&discovery, &message).await {
                    warn!("Closing pipeline of job {} failed: {}", discovery.id, e);
                }
                Err(message)
            }
        };

        match outcome {
            Ok(report) => {
                let summary = json!({
                    "hosts_found": report.hosts_found,
                    "new_assets": report.new_assets,
                    "tools_run": report.tools_run,
                });
                match self.asm_service.complete_run(run, summary).await {
                    Ok(run) => {
                        info!("Job {} completed (run {})", discovery.id, run.id);
                        self.transition(&discovery.id, JobState::Done, None, None)
                            .await;
                    }
                    Err(e) => {
                        error!("Job {} finished but could not be recorded: {}", discovery.id, e);
                        self.transition(&discovery.id, JobState::Failed, None, Some(e.to_string()))
                            .await;
                    }
                }
            }
            Err(message) => {
                error!("Job {} failed: {}", discovery.id, message);
                if let Err(e) = self.asm_service.fail_run(run, &message).await {
                    error!("Recording failure of job {} failed: {}", discovery.id, e);
                }
                self.transition(&discovery.id, JobState::Failed, None, Some(message))
                    .await;
            }
        }
    }

    async fn transition(
        &self,
        id: &str,
        state: JobState,
        run_id: Option<String>,
        error: Option<String>,
    ) -> Option<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(id)?;
        job.state = state;
        if run_id.is_some() {
            job.run_id = run_id;
        }
        job.error = error;
        job.updated_at = Utc::now().naive_utc();
        Some(job.clone())
    }

    async fn forget(&self, id: &str) {
        self.jobs.write().await.remove(id);
    }

    pub async fn get(&self, id: &str) -> Option<Job> {
        self.jobs.read().await.get(id).cloned()
    }

    pub async fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        jobs
    }
}
