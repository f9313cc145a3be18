use async_trait::async_trait;

use super::scanner::Scanner;
use super::scans_model::{
    Finding, NewScan, Scan, ScanDetail, ScanJob, ScanStatus, SeverityCounts, VsDashboard,
};
use crate::errors::Result;
use crate::users::User;

#[async_trait]
pub trait ScanRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str, scan_id: &str) -> Result<Scan>;
    /// Unscoped lookup used by the worker.
    fn find(&self, scan_id: &str) -> Result<Option<Scan>>;
    fn list(&self, user_id: &str, skip: i64, limit: i64) -> Result<Vec<Scan>>;
    fn list_findings(&self, scan_id: &str) -> Result<Vec<Finding>>;
    fn severity_counts(&self, user_id: &str) -> Result<SeverityCounts>;
    fn count_scans(&self, user_id: &str, status: Option<ScanStatus>) -> Result<i64>;

    async fn insert(&self, scan: Scan) -> Result<Scan>;
    async fn set_status(&self, scan_id: &str, status: ScanStatus) -> Result<()>;
    async fn replace_findings(&self, scan_id: &str, findings: Vec<Finding>) -> Result<()>;
    /// Deletes the scan and its findings.
    async fn delete(&self, user_id: &str, scan_id: &str) -> Result<usize>;
}

#[async_trait]
pub trait ScanServiceTrait: Send + Sync {
    async fn create_scan(&self, user: &User, new_scan: NewScan) -> Result<Scan>;
    fn list_scans(&self, user: &User, skip: i64, limit: i64) -> Result<Vec<Scan>>;
    fn get_scan(&self, user: &User, scan_id: &str) -> Result<ScanDetail>;
    async fn retest_scan(&self, user: &User, scan_id: &str) -> Result<Scan>;
    async fn delete_scan(&self, user: &User, scan_id: &str) -> Result<()>;
    fn dashboard(&self, user: &User) -> Result<VsDashboard>;

    /// Runs a queued scan job. Returns `None` when the scan no longer exists.
    async fn run_scan(&self, job: &ScanJob, scanner: &dyn Scanner) -> Result<Option<ScanStatus>>;
}
