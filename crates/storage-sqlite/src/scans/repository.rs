use async_trait::async_trait;
use diesel::prelude::*;
use std::str::FromStr;
use std::sync::Arc;

use super::model::{FindingDB, ScanDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{scan_findings, scans};
use cybersentinel_core::scans::{
    Finding, Scan, ScanRepositoryTrait, ScanStatus, Severity, SeverityCounts,
};
use cybersentinel_core::Result;

pub struct ScanRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ScanRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ScanRepositoryTrait for ScanRepository {
    fn get_by_id(&self, user_id: &str, scan_id: &str) -> Result<Scan> {
        let mut conn = get_connection(&self.pool)?;
        let row = scans::table
            .filter(scans::id.eq(scan_id))
            .filter(scans::user_id.eq(user_id))
            .select(ScanDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Scan::try_from(row)
    }

    fn find(&self, scan_id: &str) -> Result<Option<Scan>> {
        let mut conn = get_connection(&self.pool)?;
        scans::table
            .find(scan_id)
            .select(ScanDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Scan::try_from)
            .transpose()
    }

    fn list(&self, user_id: &str, skip: i64, limit: i64) -> Result<Vec<Scan>> {
        let mut conn = get_connection(&self.pool)?;
        scans::table
            .filter(scans::user_id.eq(user_id))
            .order((scans::created_at.desc(), scans::id.asc()))
            .offset(skip)
            .limit(limit)
            .select(ScanDB::as_select())
            .load::<ScanDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Scan::try_from)
            .collect()
    }

    fn list_findings(&self, scan_id: &str) -> Result<Vec<Finding>> {
        let mut conn = get_connection(&self.pool)?;
        scan_findings::table
            .filter(scan_findings::scan_id.eq(scan_id))
            .order(scan_findings::id.asc())
            .select(FindingDB::as_select())
            .load::<FindingDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Finding::try_from)
            .collect()
    }

    fn severity_counts(&self, user_id: &str) -> Result<SeverityCounts> {
        let mut conn = get_connection(&self.pool)?;
        let grouped = scan_findings::table
            .inner_join(scans::table)
            .filter(scans::user_id.eq(user_id))
            .group_by(scan_findings::severity)
            .select((scan_findings::severity, diesel::dsl::count_star()))
            .load::<(String, i64)>(&mut conn)
            .map_err(StorageError::from)?;

        let mut counts = SeverityCounts::default();
        for (severity, count) in grouped {
            counts.add(Severity::from_str(&severity)?, count);
        }
        Ok(counts)
    }

    fn count_scans(&self, user_id: &str, status: Option<ScanStatus>) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = scans::table.filter(scans::user_id.eq(user_id)).into_boxed();
        if let Some(status) = status {
            query = query.filter(scans::status.eq(status.as_str()));
        }
        Ok(query
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    async fn insert(&self, scan: Scan) -> Result<Scan> {
        let row = ScanDB::from(&scan);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Scan> {
                let inserted = diesel::insert_into(scans::table)
                    .values(&row)
                    .returning(ScanDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Scan::try_from(inserted)
            })
            .await
    }

    async fn set_status(&self, scan_id: &str, status: ScanStatus) -> Result<()> {
        let scan_id = scan_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::update(scans::table.find(&scan_id))
                    .set(scans::status.eq(status.as_str()))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(StorageError::QueryFailed(diesel::result::Error::NotFound).into());
                }
                Ok(())
            })
            .await
    }

    async fn replace_findings(&self, scan_id: &str, findings: Vec<Finding>) -> Result<()> {
        let rows: Vec<FindingDB> = findings
            .into_iter()
            .enumerate()
            .map(|(idx, finding)| FindingDB::new(scan_id, idx, finding))
            .collect();
        let scan_id = scan_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(scan_findings::table.filter(scan_findings::scan_id.eq(&scan_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if !rows.is_empty() {
                    diesel::insert_into(scan_findings::table)
                        .values(&rows)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    async fn delete(&self, user_id: &str, scan_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let scan_id = scan_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let owned = scans::table
                    .filter(scans::id.eq(&scan_id))
                    .filter(scans::user_id.eq(&user_id))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if owned == 0 {
                    return Ok(0);
                }
                diesel::delete(scan_findings::table.filter(scan_findings::scan_id.eq(&scan_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(diesel::delete(
                    scans::table
                        .filter(scans::id.eq(&scan_id))
                        .filter(scans::user_id.eq(&user_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_user, setup_db};
    use chrono::Utc;

    fn scan(id: &str, user_id: &str) -> Scan {
        Scan {
            id: id.to_string(),
            user_id: user_id.to_string(),
            name: "Weekly external".to_string(),
            target: "acme.io".to_string(),
            scan_type: "external".to_string(),
            frequency: Some("weekly".to_string()),
            status: ScanStatus::Running,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn finding(cve: &str, severity: Severity) -> Finding {
        Finding {
            cve: cve.to_string(),
            severity,
            exploitability_score: 7.5,
            description: "desc".to_string(),
            remediation: "patch".to_string(),
        }
    }

    #[tokio::test]
    async fn findings_are_replaced_and_counted() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 10);
        seed_user(&pool, "c1", "u2", 10);
        let repo = ScanRepository::new(Arc::clone(&pool), writer);
        repo.insert(scan("s1", "u1")).await.unwrap();
        repo.insert(scan("s2", "u2")).await.unwrap();

        repo.replace_findings("s1", vec![finding("CVE-1", Severity::High)])
            .await
            .unwrap();
        repo.replace_findings(
            "s1",
            vec![
                finding("CVE-2", Severity::Critical),
                finding("CVE-3", Severity::Critical),
                finding("CVE-4", Severity::Low),
            ],
        )
        .await
        .unwrap();
        repo.replace_findings("s2", vec![finding("CVE-9", Severity::Medium)])
            .await
            .unwrap();

        let listed: Vec<_> = repo
            .list_findings("s1")
            .unwrap()
            .into_iter()
            .map(|f| f.cve)
            .collect();
        assert_eq!(listed, vec!["CVE-2", "CVE-3", "CVE-4"]);

        let counts = repo.severity_counts("u1").unwrap();
        assert_eq!(counts.critical, 2);
        assert_eq!(counts.high, 0);
        assert_eq!(counts.low, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn status_and_scoped_delete() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 10);
        let repo = ScanRepository::new(Arc::clone(&pool), writer);
        repo.insert(scan("s1", "u1")).await.unwrap();

        repo.set_status("s1", ScanStatus::Completed).await.unwrap();
        assert_eq!(repo.count_scans("u1", Some(ScanStatus::Completed)).unwrap(), 1);
        assert_eq!(repo.count_scans("u1", Some(ScanStatus::Running)).unwrap(), 0);
        assert!(repo.set_status("nope", ScanStatus::Failed).await.unwrap_err().is_not_found());

        assert!(repo.get_by_id("u2", "s1").unwrap_err().is_not_found());
        assert_eq!(repo.delete("u2", "s1").await.unwrap(), 0);
        assert!(repo.find("s1").unwrap().is_some());
        assert_eq!(repo.delete("u1", "s1").await.unwrap(), 1);
        assert!(repo.find("s1").unwrap().is_none());
        assert!(repo.list("u1", 0, 10).unwrap().is_empty());
    }
}
