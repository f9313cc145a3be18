#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cybersentinel_core::asm::{AsmDiscovery, NewAsmDiscovery};
use cybersentinel_core::companies::NewCompany;
use cybersentinel_core::users::{NewProfile, NewUser, Role, User};
use cybersentinel_worker::{
    build_context,
    config::WorkerConfig,
    executor::Executor,
    job_manager::{Job, JobManager},
    tools::{DiscoveryTool, ToolError, ToolInput, ToolOutput, ToolRegistry},
    WorkerContext,
};
use serde_json::json;
use tempfile::TempDir;

pub struct Harness {
    pub ctx: WorkerContext,
    pub user: User,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> WorkerConfig {
    WorkerConfig {
        db_path: dir.path().join("worker.db").to_string_lossy().into_owned(),
        control_plane_addr: "127.0.0.1:0".parse().unwrap(),
        asm_service_endpoint: None,
        job_max_concurrency: 2,
        task_timeout: Duration::from_secs(30),
        executor_bin_path: None,
        poll_interval: Duration::from_millis(10),
        visibility_timeout: Duration::from_secs(60),
        max_attempts: 3,
        asm_queue: "asm.triggers".to_string(),
        vs_queue: "vs.scans".to_string(),
    }
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ctx = build_context(&test_config(&dir)).await.unwrap();
        let user = ctx
            .users
            .create_with_company(
                NewCompany {
                    id: "c1".to_string(),
                    name: "Acme".to_string(),
                    plan: "starter".to_string(),
                    assets_limit: 100,
                },
                NewUser {
                    id: "u1".to_string(),
                    company_id: "c1".to_string(),
                    email: "ops@example.com".to_string(),
                    name: "Ops".to_string(),
                    hashed_password: "x".to_string(),
                    role: Role::Analyst,
                },
                NewProfile {
                    id: "p1".to_string(),
                    user_id: "u1".to_string(),
                    full_name: "Ops".to_string(),
                    email: "ops@example.com".to_string(),
                    role: "analyst".to_string(),
                    country: None,
                },
            )
            .await
            .unwrap();
        Self {
            ctx,
            user,
            _dir: dir,
        }
    }

    pub async fn discovery(&self, targets: &[&str]) -> AsmDiscovery {
        let request: NewAsmDiscovery = serde_json::from_value(json!({
            "name": "Perimeter",
            "asset_type": "domain",
            "target_source": "MANUAL_ENTRY",
            "manual_targets": targets,
            "intensity": "LIGHT"
        }))
        .unwrap();
        self.ctx
            .asm_service
            .create_discovery(&self.user, request)
            .await
            .unwrap()
    }

    pub fn manager(&self, registry: ToolRegistry, timeout: Duration) -> Arc<JobManager> {
        let executor = Arc::new(Executor::new(self.ctx.clone(), Arc::new(registry)));
        Arc::new(JobManager::new(
            self.ctx.asm_service.clone(),
            executor,
            2,
            timeout,
        ))
    }
}

/// Tool that returns fixed hosts, optionally after a delay or with an error.
pub struct FakeTool {
    pub name: &'static str,
    pub hosts: Vec<&'static str>,
    pub echo_targets: bool,
    pub fail: bool,
    pub delay: Duration,
}

impl FakeTool {
    pub fn finding(name: &'static str, hosts: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            name,
            hosts,
            echo_targets: false,
            fail: false,
            delay: Duration::ZERO,
        })
    }

    pub fn echo(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            hosts: Vec::new(),
            echo_targets: true,
            fail: false,
            delay: Duration::ZERO,
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            hosts: Vec::new(),
            echo_targets: false,
            fail: true,
            delay: Duration::ZERO,
        })
    }

    pub fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            hosts: Vec::new(),
            echo_targets: false,
            fail: false,
            delay,
        })
    }
}

#[async_trait]
impl DiscoveryTool for FakeTool {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, input: &ToolInput) -> Result<ToolOutput, ToolError> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(ToolError::Execution {
                tool: self.name.to_string(),
                message: "exit status 1".to_string(),
            });
        }
        let hosts: Vec<String> = if self.echo_targets {
            input.targets.clone()
        } else {
            self.hosts.iter().map(|h| h.to_string()).collect()
        };
        Ok(ToolOutput {
            summary: json!({ "hosts": hosts.len() }),
            result: hosts.iter().map(|h| json!({ "host": h })).collect(),
            hosts,
        })
    }
}

pub async fn wait_until_finished(manager: &JobManager, id: &str) -> Job {
    for _ in 0..200 {
        if let Some(job) = manager.get(id).await {
            if job.state.is_finished() {
                return job;
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("job {} did not finish", id);
}
