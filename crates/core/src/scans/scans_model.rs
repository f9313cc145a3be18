use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::validation::require_non_empty;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }
}

impl FromStr for ScanStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "running" => Ok(ScanStatus::Running),
            "completed" => Ok(ScanStatus::Completed),
            "failed" => Ok(ScanStatus::Failed),
            _ => Err(Error::invalid(format!("Invalid scan status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(Error::invalid(format!("Invalid severity: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scan {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub name: String,
    pub target: String,
    pub scan_type: String,
    pub frequency: Option<String>,
    pub status: ScanStatus,
    pub created_at: NaiveDateTime,
}

fn default_scan_type() -> String {
    "external".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewScan {
    pub name: String,
    pub target: String,
    #[serde(default = "default_scan_type")]
    pub scan_type: String,
    pub frequency: Option<String>,
}

impl NewScan {
    pub fn validate(&self) -> Result<()> {
        require_non_empty(&self.name, "Scan name")?;
        require_non_empty(&self.target, "Target")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub cve: String,
    pub severity: Severity,
    pub exploitability_score: f64,
    pub description: String,
    pub remediation: String,
}

/// A scan together with its findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanDetail {
    pub id: String,
    pub scan_type: String,
    pub target: String,
    pub status: ScanStatus,
    pub results: Vec<Finding>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanAccepted {
    pub scan_id: String,
    pub status: ScanStatus,
}

impl From<&Scan> for ScanAccepted {
    fn from(scan: &Scan) -> Self {
        Self {
            scan_id: scan.id.clone(),
            status: scan.status,
        }
    }
}

/// Message published on the VS queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanJob {
    #[serde(rename = "type")]
    pub kind: String,
    pub scan_id: String,
    pub user_id: String,
    pub target: String,
    pub scan_type: String,
}

impl ScanJob {
    pub const KIND: &'static str = "vs";

    pub fn for_scan(scan: &Scan) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            scan_id: scan.id.clone(),
            user_id: scan.user_id.clone(),
            target: scan.target.clone(),
            scan_type: scan.scan_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

impl SeverityCounts {
    pub fn total(&self) -> i64 {
        self.critical + self.high + self.medium + self.low
    }

    pub fn add(&mut self, severity: Severity, count: i64) {
        match severity {
            Severity::Critical => self.critical += count,
            Severity::High => self.high += count,
            Severity::Medium => self.medium += count,
            Severity::Low => self.low += count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VsDashboard {
    pub total_vulnerabilities: i64,
    pub critical: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
    pub avg_mttr_days: f64,
    pub scan_coverage: i64,
}

impl VsDashboard {
    pub fn empty() -> Self {
        Self {
            total_vulnerabilities: 0,
            critical: 0,
            high: 0,
            medium: 0,
            low: 0,
            avg_mttr_days: 0.0,
            scan_coverage: 0,
        }
    }
}
