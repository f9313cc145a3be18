use async_trait::async_trait;

use super::scans_model::{Finding, Severity};
use crate::errors::Result;

/// Produces findings for one scan target.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, target: &str, scan_type: &str) -> Result<Vec<Finding>>;
}

/// Reports the same critical finding for every target.
#[derive(Debug, Default, Clone)]
pub struct StubScanner;

#[async_trait]
impl Scanner for StubScanner {
    async fn scan(&self, _target: &str, _scan_type: &str) -> Result<Vec<Finding>> {
        Ok(vec![Finding {
            cve: "CVE-2024-0001".to_string(),
            severity: Severity::Critical,
            exploitability_score: 9.8,
            description: "Remote code execution vulnerability".to_string(),
            remediation: "Update to version 2.0.1".to_string(),
        }])
    }
}
