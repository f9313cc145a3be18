use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use cybersentinel_core::errors::{Error, Result};
use cybersentinel_core::scans::{Finding, Scan, ScanStatus, Severity};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::scans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScanDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target: String,
    pub scan_type: String,
    pub frequency: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ScanDB> for Scan {
    type Error = Error;

    fn try_from(db: ScanDB) -> Result<Self> {
        Ok(Self {
            status: ScanStatus::from_str(&db.status)?,
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            target: db.target,
            scan_type: db.scan_type,
            frequency: db.frequency,
            created_at: db.created_at,
        })
    }
}

impl From<&Scan> for ScanDB {
    fn from(scan: &Scan) -> Self {
        Self {
            id: scan.id.clone(),
            user_id: scan.user_id.clone(),
            name: scan.name.clone(),
            target: scan.target.clone(),
            scan_type: scan.scan_type.clone(),
            frequency: scan.frequency.clone(),
            status: scan.status.as_str().to_string(),
            created_at: scan.created_at,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::scan_findings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FindingDB {
    pub id: String,
    pub scan_id: String,
    pub cve: String,
    pub severity: String,
    pub exploitability_score: f64,
    pub description: String,
    pub remediation: String,
}

impl FindingDB {
    /// Finding ids sort in the order the scanner reported them.
    pub fn new(scan_id: &str, index: usize, finding: Finding) -> Self {
        Self {
            id: format!("{}-{:05}", scan_id, index),
            scan_id: scan_id.to_string(),
            cve: finding.cve,
            severity: finding.severity.as_str().to_string(),
            exploitability_score: finding.exploitability_score,
            description: finding.description,
            remediation: finding.remediation,
        }
    }
}

impl TryFrom<FindingDB> for Finding {
    type Error = Error;

    fn try_from(db: FindingDB) -> Result<Self> {
        Ok(Self {
            severity: Severity::from_str(&db.severity)?,
            cve: db.cve,
            exploitability_score: db.exploitability_score,
            description: db.description,
            remediation: db.remediation,
        })
    }
}
