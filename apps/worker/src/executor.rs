//! Walks a discovery pipeline tool by tool.
//!
//! The pipeline document is saved after every transition so the API can
//! report progress while the run is in flight. The first failing tool ends
//! the run and every tool after it is marked skipped.

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cybersentinel_core::asm::{
    AsmDiscovery, AsmDiscoveryRun, PipelineDocument, RunStatus, TargetSource, ToolStatus,
    ToolUpdate,
};
use cybersentinel_core::assets::{AssetType, DiscoveredHost};
use cybersentinel_core::users::User;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::main_lib::WorkerContext;
use crate::tools::{ToolError, ToolInput, ToolRegistry};

const LOAD_ATTEMPTS: u32 = 3;
const LOAD_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("pipeline not found for job {0}")]
    PipelineMissing(String),
    #[error("no targets to discover")]
    NoTargets,
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Core(#[from] cybersentinel_core::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub hosts_found: usize,
    pub new_assets: usize,
    pub tools_run: usize,
}

pub struct Executor {
    ctx: WorkerContext,
    tools: Arc<ToolRegistry>,
}

impl Executor {
    pub fn new(ctx: WorkerContext, tools: Arc<ToolRegistry>) -> Self {
        Self { ctx, tools }
    }

    async fn load_pipeline(&self, job_id: &str) -> Result<PipelineDocument, ExecutorError> {
        for attempt in 1..=LOAD_ATTEMPTS {
            match self.ctx.pipeline_store.load(job_id) {
                Ok(Some(document)) => return Ok(document),
                Ok(None) => debug!("Pipeline {} not available yet (attempt {})", job_id, attempt),
                Err(e) => warn!("Loading pipeline {} failed (attempt {}): {}", job_id, attempt, e),
            }
            if attempt < LOAD_ATTEMPTS {
                tokio::time::sleep(LOAD_BACKOFF * attempt).await;
            }
        }
        Err(ExecutorError::PipelineMissing(job_id.to_string()))
    }

    fn targets(&self, discovery: &AsmDiscovery, user: &User) -> Vec<String> {
        match discovery.target_source {
            TargetSource::ManualEntry => discovery.manual_targets.clone(),
            TargetSource::FromAsset => discovery
                .asset_ids
                .iter()
                .filter_map(|id| match self.ctx.asset_service.get_asset(user, id) {
                    Ok(asset) => Some(asset.name),
                    Err(e) => {
                        warn!("Skipping asset {} of discovery {}: {}", id, discovery.id, e);
                        None
                    }
                })
                .collect(),
        }
    }

    async fn save(&self, document: &PipelineDocument) -> Result<(), ExecutorError> {
        self.ctx.pipeline_store.save(document).await?;
        Ok(())
    }

    pub async fn execute(
        &self,
        discovery: &AsmDiscovery,
        run: &AsmDiscoveryRun,
    ) -> Result<ExecutionReport, ExecutorError> {
        let user = self.ctx.users.get_by_id(&discovery.user_id)?;
        let mut document = self.load_pipeline(&discovery.id).await?;
        let mut targets = self.targets(discovery, &user);
        if targets.is_empty() {
            return Err(ExecutorError::NoTargets);
        }

        let steps: Vec<(usize, String)> = document
            .pipeline
            .iter()
            .filter(|t| t.status == ToolStatus::Pending)
            .map(|t| (t.order, t.tool.clone()))
            .collect();

        let mut found = BTreeSet::new();
        let mut tools_run = 0;
        for (order, name) in steps {
            document.update_tool_status(order, ToolUpdate::status(ToolStatus::Running));
            self.save(&document).await?;

            let started = Instant::now();
            let input = ToolInput {
                targets: targets.clone(),
            };
            let outcome = match self.tools.get(&name) {
                Ok(tool) => tool.run(&input).await,
                Err(e) => Err(e),
            };
            let elapsed = started.elapsed().as_millis() as i64;
            tools_run += 1;

            match outcome {
                Ok(output) => {
                    debug!("{} finished in {}ms for run {}", name, elapsed, run.id);
                    for host in &output.hosts {
                        if found.insert(host.clone()) && !targets.contains(host) {
                            targets.push(host.clone());
                        }
                    }
                    document.update_tool_status(
                        order,
                        ToolUpdate::completed(elapsed, output.summary, output.result),
                    );
                    self.save(&document).await?;
                }
                Err(e) => {
                    warn!("{} failed for run {}: {}", name, run.id, e);
                    document.update_tool_status(order, ToolUpdate::failed(elapsed, e.to_string()));
                    document.skip_remaining();
                    document.status = RunStatus::Failed.as_str().to_string();
                    self.save(&document).await?;
                    return Err(e.into());
                }
            }
        }

        document.status = RunStatus::Completed.as_str().to_string();
        self.save(&document).await?;

        let hosts: Vec<DiscoveredHost> = found.iter().map(|h| discovered_host(h)).collect();
        let hosts_found = hosts.len();
        let new_assets = self
            .ctx
            .asset_service
            .record_discovered(&user, hosts)
            .await?;
        info!(
            "Run {} finished: {} hosts found, {} new assets",
            run.id, hosts_found, new_assets
        );

        Ok(ExecutionReport {
            hosts_found,
            new_assets,
            tools_run,
        })
    }
    /// Closes the pipeline of a run that was cut short: the tool in flight
    /// is failed with `message` and the rest are skipped.
    pub async fn abort(&self, discovery: &AsmDiscovery, message: &str) -> Result<(), ExecutorError> {
        let Some(mut document) = self.ctx.pipeline_store.load(&discovery.id)? else {
            return Err(ExecutorError::PipelineMissing(discovery.id.clone()));
        };
        let in_flight: Vec<usize> = document
            .pipeline
            .iter()
            .filter(|t| t.status == ToolStatus::Running)
            .map(|t| t.order)
            .collect();
        for order in in_flight {
            document.update_tool_status(
                order,
                ToolUpdate {
                    error: Some(message.to_string()),
                    ..ToolUpdate::status(ToolStatus::Failed)
                },
            );
        }
        document.skip_remaining();
        document.status = RunStatus::Failed.as_str().to_string();
        self.save(&document).await
    }
}

fn discovered_host(name: &str) -> DiscoveredHost {
    let asset_type = if name.parse::<IpAddr>().is_ok() {
        AssetType::Ip
    } else {
        AssetType::Domain
    };
    DiscoveredHost {
        name: name.to_string(),
        asset_type,
    }
}
