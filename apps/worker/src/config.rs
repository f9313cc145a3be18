use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use cybersentinel_core::constants::{ASM_TRIGGERS_QUEUE, VS_SCANS_QUEUE};

pub const DEFAULT_CONTROL_PLANE_PORT: u16 = 8090;

pub struct WorkerConfig {
    pub db_path: String,
    pub control_plane_addr: SocketAddr,
    /// When set, ASM triggers are forwarded to this control plane instead
    /// of the in-process job manager.
    pub asm_service_endpoint: Option<String>,
    pub job_max_concurrency: usize,
    pub task_timeout: Duration,
    /// Directory holding external tool binaries. Empty means `PATH`.
    pub executor_bin_path: Option<PathBuf>,
    pub poll_interval: Duration,
    pub visibility_timeout: Duration,
    pub max_attempts: i32,
    pub asm_queue: String,
    pub vs_queue: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let host = env_or("CONTROL_PLANE_HOST", "0.0.0.0");
        let port: u16 = env_parse("CONTROL_PLANE_PORT", DEFAULT_CONTROL_PLANE_PORT);
        let control_plane_addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("Invalid CONTROL_PLANE_HOST/CONTROL_PLANE_PORT")?;

        let timeout_secs: u64 = env_parse("TASK_TIMEOUT_SECONDS", 900);
        let poll_ms: u64 = env_parse("QUEUE_POLL_INTERVAL_MS", 1000);
        let visibility_secs: u64 = env_parse("QUEUE_VISIBILITY_TIMEOUT_SECS", 300);

        Ok(Self {
            db_path: env_or("CS_DB_PATH", "./db/cybersentinel.db"),
            control_plane_addr,
            asm_service_endpoint: env_non_empty("ASM_SERVICE_ENDPOINT")
                .map(|e| e.trim_end_matches('/').to_string()),
            job_max_concurrency: env_parse::<usize>("JOB_MAX_CONCURRENCY", 3).max(1),
            task_timeout: Duration::from_secs(timeout_secs.max(1)),
            executor_bin_path: env_non_empty("EXECUTOR_BIN_PATH").map(PathBuf::from),
            poll_interval: Duration::from_millis(poll_ms.max(10)),
            visibility_timeout: Duration::from_secs(visibility_secs.max(1)),
            max_attempts: env_parse("QUEUE_MAX_ATTEMPTS", 5),
            asm_queue: env_or("ASM_QUEUE_NAME", ASM_TRIGGERS_QUEUE),
            vs_queue: env_or("VS_QUEUE_NAME", VS_SCANS_QUEUE),
        })
    }
}
