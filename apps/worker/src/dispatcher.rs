use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cybersentinel_core::asm::AsmTrigger;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::job_manager::{JobError, JobManager, JobRequest};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Accepted,
    /// The job is already running somewhere.
    Duplicate,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("discovery not found: {0}")]
    NotFound(String),
    #[error("job rejected: {0}")]
    Rejected(String),
    #[error("control plane request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dispatch failed: {0}")]
    Failed(String),
}

impl DispatchError {
    /// Whether retrying the same message can never succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, DispatchError::NotFound(_) | DispatchError::Rejected(_))
    }
}

/// Hands ASM triggers to whatever runs the jobs.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    async fn dispatch(&self, trigger: &AsmTrigger) -> Result<DispatchOutcome, DispatchError>;
}

/// Runs jobs in this process.
pub struct LocalDispatcher {
    manager: Arc<JobManager>,
}

impl LocalDispatcher {
    pub fn new(manager: Arc<JobManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl JobDispatcher for LocalDispatcher {
    async fn dispatch(&self, trigger: &AsmTrigger) -> Result<DispatchOutcome, DispatchError> {
        match self.manager.register(JobRequest::from(trigger)).await {
            Ok(_) => Ok(DispatchOutcome::Accepted),
            Err(JobError::Duplicate(_)) => Ok(DispatchOutcome::Duplicate),
            Err(JobError::NotFound(id)) => Err(DispatchError::NotFound(id)),
            Err(e @ JobError::UnsupportedType(_)) => Err(DispatchError::Rejected(e.to_string())),
            Err(e) => Err(DispatchError::Failed(e.to_string())),
        }
    }
}

/// Forwards jobs to a remote control plane.
pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDispatcher {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl JobDispatcher for HttpDispatcher {
    async fn dispatch(&self, trigger: &AsmTrigger) -> Result<DispatchOutcome, DispatchError> {
        let url = format!("{}/asm/jobs/start", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&JobRequest::from(trigger))
            .send()
            .await?;

        let status = response.status();
        debug!("POST {} -> {}", url, status);
        match status {
            StatusCode::ACCEPTED => Ok(DispatchOutcome::Accepted),
            StatusCode::CONFLICT => Ok(DispatchOutcome::Duplicate),
            StatusCode::NOT_FOUND => Err(DispatchError::NotFound(
                trigger.asm_discovery_id.clone(),
            )),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(DispatchError::Rejected(body))
            }
            other => Err(DispatchError::Failed(format!(
                "unexpected status {}",
                other
            ))),
        }
    }
}
