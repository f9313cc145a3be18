use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::schedule::parse_interval;
use crate::utils::validation::require_non_empty;
use crate::{Error, Result};

/// Declares a closed set of values together with their wire and column form.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(Error::invalid(format!(
                        "Invalid {}: {}",
                        stringify!($name),
                        s
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Kinds of assets a discovery can start from.
    DiscoveryAssetType {
        Domain => "domain",
        Cloud => "cloud",
        Saas => "saas",
    }
);

wire_enum!(TargetSource {
    FromAsset => "FROM_ASSET",
    ManualEntry => "MANUAL_ENTRY",
});

wire_enum!(Intensity {
    Light => "LIGHT",
    Normal => "NORMAL",
    Deep => "DEEP",
});

wire_enum!(ScheduleType {
    Quick => "QUICK",
    Interval => "INTERVAL",
    Cron => "CRON",
});

wire_enum!(DiscoveryStatus {
    Pending => "PENDING",
    Active => "ACTIVE",
    Running => "RUNNING",
    Paused => "PAUSED",
    Failed => "FAILED",
    Deleted => "DELETED",
});

wire_enum!(RunStatus {
    Pending => "PENDING",
    Running => "RUNNING",
    Completed => "COMPLETED",
    Failed => "FAILED",
});

wire_enum!(TriggeredBy {
    Ui => "UI",
    Cron => "CRON",
    Api => "API",
});

wire_enum!(RunMode {
    Quick => "QUICK",
    Scheduled => "SCHEDULED",
});

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Normal
    }
}

impl Default for ScheduleType {
    fn default() -> Self {
        ScheduleType::Quick
    }
}

impl Default for TriggeredBy {
    fn default() -> Self {
        TriggeredBy::Ui
    }
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Quick
    }
}

/// A saved discovery definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsmDiscovery {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub name: String,
    pub asset_type: DiscoveryAssetType,
    pub target_source: TargetSource,
    pub asset_ids: Vec<String>,
    pub manual_targets: Vec<String>,
    pub intensity: Intensity,
    pub schedule_type: ScheduleType,
    pub schedule_value: Option<String>,
    pub status: DiscoveryStatus,
    pub last_run_at: Option<NaiveDateTime>,
    pub next_run_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Request body for creating a discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsmDiscovery {
    pub name: String,
    pub asset_type: DiscoveryAssetType,
    pub target_source: TargetSource,
    pub asset_ids: Option<Vec<String>>,
    pub manual_targets: Option<Vec<String>>,
    #[serde(default)]
    pub intensity: Intensity,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    pub schedule_value: Option<String>,
}

fn clean_list(values: &Option<Vec<String>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values.iter().flatten() {
        let v = v.trim();
        if !v.is_empty() && !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

impl NewAsmDiscovery {
    pub fn validate(&self) -> Result<()> {
        require_non_empty(&self.name, "Discovery name")?;
        match self.target_source {
            TargetSource::FromAsset if self.asset_ids().is_empty() => {
                return Err(Error::invalid("asset_ids are required for FROM_ASSET"));
            }
            TargetSource::ManualEntry if self.manual_targets().is_empty() => {
                return Err(Error::invalid(
                    "manual_targets are required for MANUAL_ENTRY",
                ));
            }
            _ => {}
        }
        validate_schedule(self.schedule_type, self.schedule_value.as_deref())
    }

    /// Trimmed, de-duplicated asset ids.
    pub fn asset_ids(&self) -> Vec<String> {
        clean_list(&self.asset_ids)
    }

    /// Trimmed, de-duplicated manual targets.
    pub fn manual_targets(&self) -> Vec<String> {
        clean_list(&self.manual_targets)
    }
}

pub(crate) fn validate_schedule(schedule_type: ScheduleType, value: Option<&str>) -> Result<()> {
    match schedule_type {
        ScheduleType::Interval => {
            let value = value.ok_or_else(|| {
                Error::invalid("schedule_value is required for INTERVAL schedules")
            })?;
            parse_interval(value).map(|_| ())
        }
        ScheduleType::Cron => {
            let value = value.unwrap_or_default();
            require_non_empty(value, "schedule_value")
        }
        ScheduleType::Quick => Ok(()),
    }
}

/// Partial update of a discovery. Only ACTIVE and PAUSED may be set as status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AsmDiscoveryUpdate {
    pub name: Option<String>,
    pub intensity: Option<Intensity>,
    pub schedule_type: Option<ScheduleType>,
    pub schedule_value: Option<String>,
    pub status: Option<DiscoveryStatus>,
}

impl AsmDiscoveryUpdate {
    /// Applies the update on top of `current` and validates the result.
    pub fn apply(self, current: &AsmDiscovery) -> Result<AsmDiscovery> {
        let mut next = current.clone();
        if let Some(name) = self.name {
            require_non_empty(&name, "Discovery name")?;
            next.name = name.trim().to_string();
        }
        if let Some(intensity) = self.intensity {
            next.intensity = intensity;
        }
        if let Some(schedule_type) = self.schedule_type {
            next.schedule_type = schedule_type;
        }
        if self.schedule_value.is_some() {
            next.schedule_value = self.schedule_value;
        }
        if let Some(status) = self.status {
            if !matches!(status, DiscoveryStatus::Active | DiscoveryStatus::Paused) {
                return Err(Error::invalid("status must be ACTIVE or PAUSED"));
            }
            next.status = status;
        }
        validate_schedule(next.schedule_type, next.schedule_value.as_deref())?;
        Ok(next)
    }
}

/// One execution of a discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsmDiscoveryRun {
    pub id: String,
    pub asm_discovery_id: String,
    pub user_id: String,
    pub triggered_by: TriggeredBy,
    pub run_mode: RunMode,
    pub status: RunStatus,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub summary: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

/// Message published on the ASM trigger queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsmTrigger {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: String,
    pub asm_discovery_id: String,
    pub asset_type: DiscoveryAssetType,
    pub target_source: TargetSource,
    pub intensity: Intensity,
    #[serde(default)]
    pub triggered_by: TriggeredBy,
    #[serde(default)]
    pub run_mode: RunMode,
}

impl AsmTrigger {
    pub const KIND: &'static str = "asm";

    pub fn for_discovery(
        discovery: &AsmDiscovery,
        triggered_by: TriggeredBy,
        run_mode: RunMode,
    ) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            user_id: discovery.user_id.clone(),
            asm_discovery_id: discovery.id.clone(),
            asset_type: discovery.asset_type,
            target_source: discovery.target_source,
            intensity: discovery.intensity,
            triggered_by,
            run_mode,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AsmDashboard {
    pub attack_surface_score: i32,
    pub total_discoveries: i64,
    pub active_discoveries: i64,
    pub last_discovery_run: Option<NaiveDateTime>,
}
