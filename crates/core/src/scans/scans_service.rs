use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::scanner::Scanner;
use super::scans_model::{NewScan, Scan, ScanDetail, ScanJob, ScanStatus, VsDashboard};
use super::scans_traits::{ScanRepositoryTrait, ScanServiceTrait};
use crate::activity::{ActivityKind, ActivityServiceTrait, NewActivity};
use crate::constants::{AVG_MTTR_DAYS, VS_SCANS_QUEUE};
use crate::errors::{Error, Result};
use crate::queue::{publish_json, MessageQueue};
use crate::users::User;

pub struct ScanService {
    repository: Arc<dyn ScanRepositoryTrait>,
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
    activity: Arc<dyn ActivityServiceTrait>,
}

impl ScanService {
    pub fn new(
        repository: Arc<dyn ScanRepositoryTrait>,
        queue: Arc<dyn MessageQueue>,
        activity: Arc<dyn ActivityServiceTrait>,
    ) -> Self {
        Self {
            repository,
            queue,
            queue_name: VS_SCANS_QUEUE.to_string(),
            activity,
        }
    }

    pub fn with_queue_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = name.into();
        self
    }

    fn not_found(e: Error) -> Error {
        if e.is_not_found() {
            Error::not_found("Scan not found")
        } else {
            e
        }
    }

    async fn enqueue(&self, scan: &Scan) -> Result<()> {
        publish_json(self.queue.as_ref(), &self.queue_name, &ScanJob::for_scan(scan))
            .await
            .map_err(|e| {
                error!("Failed to publish scan {}: {}", scan.id, e);
                Error::Unexpected("Not able to schedule this scan".to_string())
            })?;
        Ok(())
    }
}

#[async_trait]
impl ScanServiceTrait for ScanService {
    async fn create_scan(&self, user: &User, new_scan: NewScan) -> Result<Scan> {
        new_scan.validate()?;
        let scan = self
            .repository
            .insert(Scan {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                name: new_scan.name.trim().to_string(),
                target: new_scan.target.trim().to_string(),
                scan_type: new_scan.scan_type,
                frequency: new_scan.frequency,
                status: ScanStatus::Running,
                created_at: Utc::now().naive_utc(),
            })
            .await?;

        if let Err(e) = self.enqueue(&scan).await {
            if let Err(cleanup) = self.repository.delete(&user.id, &scan.id).await {
                warn!("Failed to roll back scan {}: {}", scan.id, cleanup);
            }
            return Err(e);
        }

        self.activity
            .record(NewActivity::new(
                user.id.clone(),
                Some(user.company_id.clone()),
                ActivityKind::ScanCreated,
                format!("Started scan {} against {}", scan.name, scan.target),
            ))
            .await;
        Ok(scan)
    }

    fn list_scans(&self, user: &User, skip: i64, limit: i64) -> Result<Vec<Scan>> {
        self.repository.list(&user.id, skip, limit)
    }

    fn get_scan(&self, user: &User, scan_id: &str) -> Result<ScanDetail> {
        let scan = self
            .repository
            .get_by_id(&user.id, scan_id)
            .map_err(Self::not_found)?;
        let results = self.repository.list_findings(&scan.id)?;
        Ok(ScanDetail {
            id: scan.id,
            scan_type: scan.scan_type,
            target: scan.target,
            status: scan.status,
            results,
            created_at: scan.created_at,
        })
    }

    async fn retest_scan(&self, user: &User, scan_id: &str) -> Result<Scan> {
        let mut scan = self
            .repository
            .get_by_id(&user.id, scan_id)
            .map_err(Self::not_found)?;
        let previous_status = scan.status;
        let previous_findings = self.repository.list_findings(&scan.id)?;

        self.repository.replace_findings(&scan.id, Vec::new()).await?;
        self.repository
            .set_status(&scan.id, ScanStatus::Running)
            .await?;
        scan.status = ScanStatus::Running;

        if let Err(e) = self.enqueue(&scan).await {
            let restored = self
                .repository
                .replace_findings(&scan.id, previous_findings)
                .await;
            let restored = match restored {
                Ok(()) => self.repository.set_status(&scan.id, previous_status).await,
                Err(e) => Err(e),
            };
            if let Err(cleanup) = restored {
                warn!("Failed to restore scan {} after retest: {}", scan.id, cleanup);
            }
            return Err(e);
        }
        Ok(scan)
    }

    async fn delete_scan(&self, user: &User, scan_id: &str) -> Result<()> {
        match self.repository.delete(&user.id, scan_id).await? {
            0 => Err(Error::not_found("Scan not found")),
            _ => Ok(()),
        }
    }

    fn dashboard(&self, user: &User) -> Result<VsDashboard> {
        let counts = self.repository.severity_counts(&user.id)?;
        let total = counts.total();
        if total == 0 {
            return Ok(VsDashboard::empty());
        }

        let scans = self.repository.count_scans(&user.id, None)?;
        let completed = self
            .repository
            .count_scans(&user.id, Some(ScanStatus::Completed))?;
        let scan_coverage = if scans == 0 {
            0
        } else {
            (completed * 100 + scans / 2) / scans
        };

        Ok(VsDashboard {
            total_vulnerabilities: total,
            critical: counts.critical,
            high: counts.high,
            medium: counts.medium,
            low: counts.low,
            avg_mttr_days: AVG_MTTR_DAYS,
            scan_coverage,
        })
    }

    async fn run_scan(&self, job: &ScanJob, scanner: &dyn Scanner) -> Result<Option<ScanStatus>> {
        let Some(scan) = self.repository.find(&job.scan_id)? else {
            warn!("Scan {} no longer exists; skipping", job.scan_id);
            return Ok(None);
        };

        let status = match scanner.scan(&scan.target, &scan.scan_type).await {
            Ok(findings) => {
                info!(
                    "Scan {} of {} produced {} findings",
                    scan.id,
                    scan.target,
                    findings.len()
                );
                self.repository.replace_findings(&scan.id, findings).await?;
                ScanStatus::Completed
            }
            Err(e) => {
                error!("Scan {} failed: {}", scan.id, e);
                ScanStatus::Failed
            }
        };
        self.repository.set_status(&scan.id, status).await?;
        Ok(Some(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::InMemoryMessageQueue;
    use crate::scans::{Finding, SeverityCounts, StubScanner};
    use crate::users::test_support::{member, NoopActivityService};
    use crate::users::Role;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockScanRepository {
        scans: Mutex<Vec<Scan>>,
        findings: Mutex<HashMap<String, Vec<Finding>>>,
    }

    #[async_trait]
    impl ScanRepositoryTrait for MockScanRepository {
        fn get_by_id(&self, user_id: &str, scan_id: &str) -> Result<Scan> {
            self.find(scan_id)?
                .filter(|s| s.user_id == user_id)
                .ok_or_else(|| Error::not_found("missing"))
        }
        fn find(&self, scan_id: &str) -> Result<Option<Scan>> {
            Ok(self
                .scans
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == scan_id)
                .cloned())
        }
        fn list(&self, user_id: &str, _: i64, _: i64) -> Result<Vec<Scan>> {
            Ok(self
                .scans
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect())
        }
        fn list_findings(&self, scan_id: &str) -> Result<Vec<Finding>> {
            Ok(self
                .findings
                .lock()
                .unwrap()
                .get(scan_id)
                .cloned()
                .unwrap_or_default())
        }
        fn severity_counts(&self, user_id: &str) -> Result<SeverityCounts> {
            let mut counts = SeverityCounts::default();
            for scan in self.list(user_id, 0, 100)? {
                for f in self.list_findings(&scan.id)? {
                    counts.add(f.severity, 1);
                }
            }
            Ok(counts)
        }
        fn count_scans(&self, user_id: &str, status: Option<ScanStatus>) -> Result<i64> {
            Ok(self
                .list(user_id, 0, 100)?
                .iter()
                .filter(|s| status.map_or(true, |st| s.status == st))
                .count() as i64)
        }
        async fn insert(&self, scan: Scan) -> Result<Scan> {
            self.scans.lock().unwrap().push(scan.clone());
            Ok(scan)
        }
        async fn set_status(&self, scan_id: &str, status: ScanStatus) -> Result<()> {
            if let Some(s) = self
                .scans
                .lock()
                .unwrap()
                .iter_mut()
                .find(|s| s.id == scan_id)
            {
                s.status = status;
            }
            Ok(())
        }
        async fn replace_findings(&self, scan_id: &str, findings: Vec<Finding>) -> Result<()> {
            self.findings
                .lock()
                .unwrap()
                .insert(scan_id.to_string(), findings);
            Ok(())
        }
        async fn delete(&self, user_id: &str, scan_id: &str) -> Result<usize> {
            let mut scans = self.scans.lock().unwrap();
            let before = scans.len();
            scans.retain(|s| !(s.id == scan_id && s.user_id == user_id));
            self.findings.lock().unwrap().remove(scan_id);
            Ok(before - scans.len())
        }
    }

    struct FailingScanner;

    #[async_trait]
    impl Scanner for FailingScanner {
        async fn scan(&self, _: &str, _: &str) -> Result<Vec<Finding>> {
            Err(Error::Unexpected("scanner crashed".into()))
        }
    }

    fn new_scan() -> NewScan {
        serde_json::from_str(r#"{"name":"Edge","target":"api.company.com"}"#).unwrap()
    }

    fn setup() -> (Arc<InMemoryMessageQueue>, ScanService, User) {
        let queue = Arc::new(InMemoryMessageQueue::new());
        let svc = ScanService::new(
            Arc::new(MockScanRepository::default()),
            queue.clone(),
            Arc::new(NoopActivityService),
        );
        (queue, svc, member("u1", "c1", Role::Analyst))
    }

    #[tokio::test]
    async fn create_publishes_job() {
        let (queue, svc, user) = setup();
        let scan = svc.create_scan(&user, new_scan()).await.unwrap();
        assert_eq!(scan.scan_type, "external");
        assert_eq!(scan.status, ScanStatus::Running);

        let pending = queue.pending(VS_SCANS_QUEUE).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["type"], "vs");
        assert_eq!(pending[0]["scan_id"], scan.id.as_str());
        assert!(svc.get_scan(&user, &scan.id).unwrap().results.is_empty());
    }

    #[tokio::test]
    async fn dashboard_is_zero_without_findings() {
        let (_, svc, user) = setup();
        svc.create_scan(&user, new_scan()).await.unwrap();
        assert_eq!(svc.dashboard(&user).unwrap(), VsDashboard::empty());
    }

    #[tokio::test]
    async fn worker_run_stores_findings_and_feeds_dashboard() {
        let (_, svc, user) = setup();
        let first = svc.create_scan(&user, new_scan()).await.unwrap();
        svc.create_scan(&user, new_scan()).await.unwrap();

        let status = svc
            .run_scan(&ScanJob::for_scan(&first), &StubScanner)
            .await
            .unwrap();
        assert_eq!(status, Some(ScanStatus::Completed));

        let detail = svc.get_scan(&user, &first.id).unwrap();
        assert_eq!(detail.status, ScanStatus::Completed);
        assert_eq!(detail.results[0].cve, "CVE-2024-0001");

        let dashboard = svc.dashboard(&user).unwrap();
        assert_eq!(dashboard.total_vulnerabilities, 1);
        assert_eq!(dashboard.critical, 1);
        assert_eq!(dashboard.avg_mttr_days, 4.2);
        assert_eq!(dashboard.scan_coverage, 50);
    }

    #[tokio::test]
    async fn scanner_failure_marks_scan_failed() {
        let (_, svc, user) = setup();
        let scan = svc.create_scan(&user, new_scan()).await.unwrap();
        let status = svc
            .run_scan(&ScanJob::for_scan(&scan), &FailingScanner)
            .await
            .unwrap();
        assert_eq!(status, Some(ScanStatus::Failed));
    }

    #[tokio::test]
    async fn missing_scan_is_skipped() {
        let (_, svc, user) = setup();
        let scan = svc.create_scan(&user, new_scan()).await.unwrap();
        svc.delete_scan(&user, &scan.id).await.unwrap();
        let status = svc
            .run_scan(&ScanJob::for_scan(&scan), &StubScanner)
            .await
            .unwrap();
        assert_eq!(status, None);
        assert_eq!(
            svc.delete_scan(&user, &scan.id).await.unwrap_err().to_string(),
            "Scan not found"
        );
    }

    #[tokio::test]
    async fn retest_clears_findings_and_republishes() {
        let (queue, svc, user) = setup();
        let scan = svc.create_scan(&user, new_scan()).await.unwrap();
        svc.run_scan(&ScanJob::for_scan(&scan), &StubScanner)
            .await
            .unwrap();

        let retested = svc.retest_scan(&user, &scan.id).await.unwrap();
        assert_eq!(retested.status, ScanStatus::Running);
        assert!(svc.get_scan(&user, &scan.id).unwrap().results.is_empty());
        assert_eq!(queue.pending(VS_SCANS_QUEUE).await.len(), 2);

        let stranger = member("u2", "c2", Role::Admin);
        assert!(svc.retest_scan(&stranger, &scan.id).await.is_err());
    }

    #[tokio::test]
    async fn failed_retest_restores_previous_results() {
        let (queue, svc, user) = setup();
        let scan = svc.create_scan(&user, new_scan()).await.unwrap();
        svc.run_scan(&ScanJob::for_scan(&scan), &StubScanner)
            .await
            .unwrap();

        queue.set_unavailable(true);
        let err = svc.retest_scan(&user, &scan.id).await.unwrap_err();
        assert!(matches!(err, Error::Unexpected(_)));

        let detail = svc.get_scan(&user, &scan.id).unwrap();
        assert_eq!(detail.status, ScanStatus::Completed);
        assert_eq!(detail.results.len(), 1);
        assert_eq!(detail.results[0].cve, "CVE-2024-0001");
        assert_eq!(queue.pending(VS_SCANS_QUEUE).await.len(), 1);
    }
}
