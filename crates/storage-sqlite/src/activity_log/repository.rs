use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use super::model::ActivityDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::activity_log;
use cybersentinel_core::activity::{Activity, ActivityList, ActivityRepositoryTrait, NewActivity};
use cybersentinel_core::Result;

pub struct ActivityRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ActivityRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ActivityRepositoryTrait for ActivityRepository {
    fn list_for_user(&self, user_id: &str, skip: i64, limit: i64) -> Result<ActivityList> {
        let mut conn = get_connection(&self.pool)?;
        let total = activity_log::table
            .filter(activity_log::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let items = activity_log::table
            .filter(activity_log::user_id.eq(user_id))
            .order(activity_log::created_at.desc())
            .offset(skip)
            .limit(limit)
            .select(ActivityDB::as_select())
            .load::<ActivityDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(ActivityList {
            items: items.into_iter().map(Activity::from).collect(),
            total,
        })
    }

    fn list_for_company(&self, company_id: &str, skip: i64, limit: i64) -> Result<ActivityList> {
        let mut conn = get_connection(&self.pool)?;
        let total = activity_log::table
            .filter(activity_log::company_id.eq(company_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let items = activity_log::table
            .filter(activity_log::company_id.eq(company_id))
            .order(activity_log::created_at.desc())
            .offset(skip)
            .limit(limit)
            .select(ActivityDB::as_select())
            .load::<ActivityDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(ActivityList {
            items: items.into_iter().map(Activity::from).collect(),
            total,
        })
    }

    async fn insert(&self, activity: NewActivity) -> Result<Activity> {
        let row = ActivityDB {
            id: Uuid::new_v4().to_string(),
            user_id: activity.user_id,
            company_id: activity.company_id,
            activity_type: activity.kind.as_str().to_string(),
            description: activity.description,
            created_at: Utc::now().naive_utc(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Activity> {
                let inserted = diesel::insert_into(activity_log::table)
                    .values(&row)
                    .returning(ActivityDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }
}
