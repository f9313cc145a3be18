use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use cybersentinel_core::constants::{ASM_TRIGGERS_QUEUE, VS_SCANS_QUEUE};

use crate::auth::decode_secret_key;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub jwt_secret: Vec<u8>,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub scheduler_interval: Duration,
    pub scheduler_enabled: bool,
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

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("CS_LISTEN_ADDR", "0.0.0.0:8000")
            .parse()
            .context("Invalid CS_LISTEN_ADDR")?;
        let db_path = env_or("CS_DB_PATH", "./db/cybersentinel.db");
        let cors_allow = env_or("CS_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_parse("CS_REQUEST_TIMEOUT_MS", 30_000);

        let raw_secret = std::env::var("JWT_SECRET")
            .or_else(|_| std::env::var("SECRET_KEY"))
            .context("JWT_SECRET (or SECRET_KEY) must be set")?;
        let jwt_secret = decode_secret_key(&raw_secret)?;

        let access_minutes: u64 = env_parse("ACCESS_TOKEN_EXPIRE_MINUTES", 30);
        let refresh_days: u64 = env_parse("REFRESH_TOKEN_EXPIRE_DAYS", 7);
        let scheduler_secs: u64 = env_parse("CS_SCHEDULER_INTERVAL_SECS", 60);

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            access_token_ttl: Duration::from_secs(access_minutes * 60),
            refresh_token_ttl: Duration::from_secs(refresh_days * 24 * 60 * 60),
            scheduler_interval: Duration::from_secs(scheduler_secs.max(1)),
            scheduler_enabled: env_parse("CS_SCHEDULER_ENABLED", true),
            asm_queue: env_or("ASM_QUEUE_NAME", ASM_TRIGGERS_QUEUE),
            vs_queue: env_or("VS_QUEUE_NAME", VS_SCANS_QUEUE),
        })
    }
}
