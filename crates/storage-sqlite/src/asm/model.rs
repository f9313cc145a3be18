//! Database models for discoveries, runs and pipeline documents.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use crate::utils::{decode_list, encode_list};
use cybersentinel_core::asm::{
    AsmDiscovery, AsmDiscoveryRun, DiscoveryAssetType, DiscoveryStatus, Intensity, RunMode,
    RunStatus, ScheduleType, TargetSource, TriggeredBy,
};
use cybersentinel_core::errors::{Error, Result};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::asm_discoveries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct AsmDiscoveryDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub asset_type: String,
    pub target_source: String,
    pub asset_ids: String,
    pub manual_targets: String,
    pub intensity: String,
    pub schedule_type: String,
    pub schedule_value: Option<String>,
    pub status: String,
    pub last_run_at: Option<NaiveDateTime>,
    pub next_run_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<AsmDiscoveryDB> for AsmDiscovery {
    type Error = Error;

    fn try_from(db: AsmDiscoveryDB) -> Result<Self> {
        Ok(Self {
            asset_type: DiscoveryAssetType::from_str(&db.asset_type)?,
            target_source: TargetSource::from_str(&db.target_source)?,
            intensity: Intensity::from_str(&db.intensity)?,
            schedule_type: ScheduleType::from_str(&db.schedule_type)?,
            status: DiscoveryStatus::from_str(&db.status)?,
            asset_ids: decode_list(&db.asset_ids),
            manual_targets: decode_list(&db.manual_targets),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            schedule_value: db.schedule_value,
            last_run_at: db.last_run_at,
            next_run_at: db.next_run_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl TryFrom<&AsmDiscovery> for AsmDiscoveryDB {
    type Error = Error;

    fn try_from(d: &AsmDiscovery) -> Result<Self> {
        Ok(Self {
            id: d.id.clone(),
            user_id: d.user_id.clone(),
            name: d.name.clone(),
            asset_type: d.asset_type.as_str().to_string(),
            target_source: d.target_source.as_str().to_string(),
            asset_ids: encode_list(&d.asset_ids)?,
            manual_targets: encode_list(&d.manual_targets)?,
            intensity: d.intensity.as_str().to_string(),
            schedule_type: d.schedule_type.as_str().to_string(),
            schedule_value: d.schedule_value.clone(),
            status: d.status.as_str().to_string(),
            last_run_at: d.last_run_at,
            next_run_at: d.next_run_at,
            created_at: d.created_at,
            updated_at: d.updated_at,
        })
    }
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::asm_discovery_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct AsmDiscoveryRunDB {
    pub id: String,
    pub asm_discovery_id: String,
    pub user_id: String,
    pub triggered_by: String,
    pub run_mode: String,
    pub status: String,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub summary: Option<String>,
    pub created_at: NaiveDateTime,
}

impl TryFrom<AsmDiscoveryRunDB> for AsmDiscoveryRun {
    type Error = Error;

    fn try_from(db: AsmDiscoveryRunDB) -> Result<Self> {
        Ok(Self {
            triggered_by: TriggeredBy::from_str(&db.triggered_by)?,
            run_mode: RunMode::from_str(&db.run_mode)?,
            status: RunStatus::from_str(&db.status)?,
            // An unreadable summary is dropped rather than failing the listing.
            summary: db
                .summary
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok()),
            id: db.id,
            asm_discovery_id: db.asm_discovery_id,
            user_id: db.user_id,
            started_at: db.started_at,
            completed_at: db.completed_at,
            error_message: db.error_message,
            created_at: db.created_at,
        })
    }
}

impl TryFrom<&AsmDiscoveryRun> for AsmDiscoveryRunDB {
    type Error = Error;

    fn try_from(run: &AsmDiscoveryRun) -> Result<Self> {
        let summary = match &run.summary {
            Some(value) => Some(
                serde_json::to_string(value)
                    .map_err(|e| Error::Unexpected(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            id: run.id.clone(),
            asm_discovery_id: run.asm_discovery_id.clone(),
            user_id: run.user_id.clone(),
            triggered_by: run.triggered_by.as_str().to_string(),
            run_mode: run.run_mode.as_str().to_string(),
            status: run.status.as_str().to_string(),
            started_at: run.started_at,
            completed_at: run.completed_at,
            error_message: run.error_message.clone(),
            summary,
            created_at: run.created_at,
        })
    }
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::asm_pipelines)]
#[diesel(primary_key(job_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AsmPipelineDB {
    pub job_id: String,
    pub document: String,
    pub expires_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
