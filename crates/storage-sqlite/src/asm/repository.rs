use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{AsmDiscoveryDB, AsmDiscoveryRunDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{asm_discoveries, asm_discovery_runs};
use cybersentinel_core::asm::{
    AsmDiscovery, AsmDiscoveryRun, AsmRepositoryTrait, DiscoveryStatus, ScheduleType,
};
use cybersentinel_core::utils::{Page, PageRequest};
use cybersentinel_core::Result;

/// Repository for discoveries and their run history.
pub struct AsmRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AsmRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn not_found() -> StorageError {
    StorageError::QueryFailed(diesel::result::Error::NotFound)
}

fn to_discoveries(rows: Vec<AsmDiscoveryDB>) -> Result<Vec<AsmDiscovery>> {
    rows.into_iter().map(AsmDiscovery::try_from).collect()
}

#[async_trait]
impl AsmRepositoryTrait for AsmRepository {
    fn get_discovery(&self, user_id: &str, discovery_id: &str) -> Result<AsmDiscovery> {
        let mut conn = get_connection(&self.pool)?;
        let row = asm_discoveries::table
            .filter(asm_discoveries::id.eq(discovery_id))
            .filter(asm_discoveries::user_id.eq(user_id))
            .select(AsmDiscoveryDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        AsmDiscovery::try_from(row)
    }

    fn find_discovery(&self, discovery_id: &str) -> Result<AsmDiscovery> {
        let mut conn = get_connection(&self.pool)?;
        let row = asm_discoveries::table
            .find(discovery_id)
            .select(AsmDiscoveryDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        AsmDiscovery::try_from(row)
    }

    fn list_discoveries(&self, user_id: &str, page: PageRequest) -> Result<Page<AsmDiscovery>> {
        let mut conn = get_connection(&self.pool)?;
        let total = asm_discoveries::table
            .filter(asm_discoveries::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = asm_discoveries::table
            .filter(asm_discoveries::user_id.eq(user_id))
            .order((asm_discoveries::created_at.desc(), asm_discoveries::id.asc()))
            .offset(page.offset())
            .limit(page.limit())
            .select(AsmDiscoveryDB::as_select())
            .load::<AsmDiscoveryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(page.wrap(to_discoveries(rows)?, total))
    }

    fn list_due_interval(&self, now: NaiveDateTime) -> Result<Vec<AsmDiscovery>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = asm_discoveries::table
            .filter(asm_discoveries::status.eq(DiscoveryStatus::Active.as_str()))
            .filter(asm_discoveries::schedule_type.eq(ScheduleType::Interval.as_str()))
            .filter(asm_discoveries::next_run_at.le(now))
            .order(asm_discoveries::next_run_at.asc())
            .select(AsmDiscoveryDB::as_select())
            .load::<AsmDiscoveryDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_discoveries(rows)
    }

    fn count_discoveries(&self, user_id: &str, status: Option<DiscoveryStatus>) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = asm_discoveries::table
            .filter(asm_discoveries::user_id.eq(user_id))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(asm_discoveries::status.eq(status.as_str()));
        }
        Ok(query
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?)
    }

    fn last_run_started_at(&self, user_id: &str) -> Result<Option<NaiveDateTime>> {
        let mut conn = get_connection(&self.pool)?;
        let latest = asm_discovery_runs::table
            .filter(asm_discovery_runs::user_id.eq(user_id))
            .select(diesel::dsl::max(asm_discovery_runs::started_at))
            .first::<Option<NaiveDateTime>>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(latest)
    }

    fn list_runs(&self, discovery_id: &str) -> Result<Vec<AsmDiscoveryRun>> {
        let mut conn = get_connection(&self.pool)?;
        asm_discovery_runs::table
            .filter(asm_discovery_runs::asm_discovery_id.eq(discovery_id))
            .order(asm_discovery_runs::created_at.desc())
            .select(AsmDiscoveryRunDB::as_select())
            .load::<AsmDiscoveryRunDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(AsmDiscoveryRun::try_from)
            .collect()
    }

    async fn insert_discovery(&self, discovery: AsmDiscovery) -> Result<AsmDiscovery> {
        let row = AsmDiscoveryDB::try_from(&discovery)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AsmDiscovery> {
                let inserted = diesel::insert_into(asm_discoveries::table)
                    .values(&row)
                    .returning(AsmDiscoveryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                AsmDiscovery::try_from(inserted)
            })
            .await
    }

    async fn update_discovery(&self, discovery: AsmDiscovery) -> Result<AsmDiscovery> {
        let mut row = AsmDiscoveryDB::try_from(&discovery)?;
        row.updated_at = Utc::now().naive_utc();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AsmDiscovery> {
                let affected = diesel::update(asm_discoveries::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(not_found().into());
                }
                AsmDiscovery::try_from(row)
            })
            .await
    }

    async fn set_discovery_status(
        &self,
        discovery_id: &str,
        status: DiscoveryStatus,
        last_run_at: Option<NaiveDateTime>,
    ) -> Result<()> {
        let discovery_id = discovery_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let target = asm_discoveries::table.find(&discovery_id);
                let now = Utc::now().naive_utc();
                let affected = match last_run_at {
                    Some(at) => diesel::update(target)
                        .set((
                            asm_discoveries::status.eq(status.as_str()),
                            asm_discoveries::last_run_at.eq(Some(at)),
                            asm_discoveries::updated_at.eq(now),
                        ))
                        .execute(conn),
                    None => diesel::update(target)
                        .set((
                            asm_discoveries::status.eq(status.as_str()),
                            asm_discoveries::updated_at.eq(now),
                        ))
                        .execute(conn),
                }
                .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(not_found().into());
                }
                Ok(())
            })
            .await
    }

    async fn set_next_run_at(&self, discovery_id: &str, next_run_at: NaiveDateTime) -> Result<()> {
        let discovery_id = discovery_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::update(asm_discoveries::table.find(&discovery_id))
                    .set(asm_discoveries::next_run_at.eq(Some(next_run_at)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(not_found().into());
                }
                Ok(())
            })
            .await
    }

    async fn delete_discovery(&self, user_id: &str, discovery_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let discovery_id = discovery_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let exists = asm_discoveries::table
                    .filter(asm_discoveries::id.eq(&discovery_id))
                    .filter(asm_discoveries::user_id.eq(&user_id))
                    .count()
                    .get_result::<i64>(conn)
                    .map_err(StorageError::from)?;
                if exists == 0 {
                    return Ok(0);
                }
                diesel::delete(
                    asm_discovery_runs::table
                        .filter(asm_discovery_runs::asm_discovery_id.eq(&discovery_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(diesel::delete(
                    asm_discoveries::table
                        .filter(asm_discoveries::id.eq(&discovery_id))
                        .filter(asm_discoveries::user_id.eq(&user_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    async fn insert_run(&self, run: AsmDiscoveryRun) -> Result<AsmDiscoveryRun> {
        let row = AsmDiscoveryRunDB::try_from(&run)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AsmDiscoveryRun> {
                let inserted = diesel::insert_into(asm_discovery_runs::table)
                    .values(&row)
                    .returning(AsmDiscoveryRunDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                AsmDiscoveryRun::try_from(inserted)
            })
            .await
    }

    async fn update_run(&self, run: AsmDiscoveryRun) -> Result<AsmDiscoveryRun> {
        let row = AsmDiscoveryRunDB::try_from(&run)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AsmDiscoveryRun> {
                let affected = diesel::update(asm_discovery_runs::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(not_found().into());
                }
                Ok(run)
            })
            .await
    }
}
