/// Queue carrying attack surface discovery triggers.
pub const ASM_TRIGGERS_QUEUE: &str = "asm.triggers";

/// Queue carrying vulnerability scan jobs.
pub const VS_SCANS_QUEUE: &str = "vs.scans";

/// Plan assigned to a company at signup.
pub const DEFAULT_PLAN: &str = "starter";

/// Maximum number of assets a company may hold unless its plan says otherwise.
pub const DEFAULT_ASSETS_LIMIT: i32 = 500;

/// Acked queue messages are kept this many hours before being purged.
pub const ACKED_MESSAGE_RETENTION_HOURS: i64 = 24;

/// Pipeline documents expire this many hours after their last write.
pub const PIPELINE_TTL_HOURS: i64 = 24;

/// Placeholder score reported by the ASM dashboard.
pub const ATTACK_SURFACE_SCORE: i32 = 75;

/// Mean time to remediate reported by the VS dashboard once findings exist.
pub const AVG_MTTR_DAYS: f64 = 4.2;

/// Tag put on assets created by a discovery run.
pub const DISCOVERED_ASSET_TAG: &str = "discovered";

/// Short-lived token lifetime for password reset and magic links.
pub const ONE_TIME_TOKEN_MINUTES: i64 = 15;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;
