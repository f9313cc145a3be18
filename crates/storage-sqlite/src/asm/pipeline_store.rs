use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::model::AsmPipelineDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::asm_pipelines;
use cybersentinel_core::asm::{PipelineDocument, PipelineStoreTrait};
use cybersentinel_core::Result;

/// Pipeline documents expire this long after their last write.
pub const PIPELINE_TTL_HOURS: i64 = 24;

/// Pipeline documents kept as JSON text with an expiry, one row per job.
pub struct SqlitePipelineStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    ttl: Duration,
}

impl SqlitePipelineStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self::with_ttl(pool, writer, Duration::hours(PIPELINE_TTL_HOURS))
    }

    pub fn with_ttl(pool: Arc<DbPool>, writer: WriteHandle, ttl: Duration) -> Self {
        Self { pool, writer, ttl }
    }
}

#[async_trait]
impl PipelineStoreTrait for SqlitePipelineStore {
    fn load(&self, job_id: &str) -> Result<Option<PipelineDocument>> {
        let mut conn = get_connection(&self.pool)?;
        let row = asm_pipelines::table
            .find(job_id)
            .filter(asm_pipelines::expires_at.gt(Utc::now().naive_utc()))
            .select(AsmPipelineDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.document).into_core()?)),
            None => Ok(None),
        }
    }

    async fn save(&self, document: &PipelineDocument) -> Result<()> {
        let now = Utc::now().naive_utc();
        let row = AsmPipelineDB {
            job_id: document.job_id.clone(),
            document: serde_json::to_string(document).into_core()?,
            expires_at: now + self.ttl,
            updated_at: now,
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(asm_pipelines::table)
                    .values(&row)
                    .on_conflict(asm_pipelines::job_id)
                    .do_update()
                    .set((
                        asm_pipelines::document.eq(&row.document),
                        asm_pipelines::expires_at.eq(row.expires_at),
                        asm_pipelines::updated_at.eq(row.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, job_id: &str) -> Result<()> {
        let job_id = job_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(asm_pipelines::table.find(job_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn purge_expired(&self) -> Result<usize> {
        let purged = self
            .writer
            .exec(|conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    asm_pipelines::table
                        .filter(asm_pipelines::expires_at.le(Utc::now().naive_utc())),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await?;
        if purged > 0 {
            debug!("Purged {} expired pipeline documents", purged);
        }
        Ok(purged)
    }
}
