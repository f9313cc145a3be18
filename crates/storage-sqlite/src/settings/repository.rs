use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use serde_json::Value;
use std::sync::Arc;

use super::model::UserSettingsDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::user_settings;
use cybersentinel_core::errors::Result;
use cybersentinel_core::settings::SettingsRepositoryTrait;

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_settings(&self, user_id: &str) -> Result<Option<Value>> {
        let mut conn = get_connection(&self.pool)?;
        let row = user_settings::table
            .find(user_id)
            .select(UserSettingsDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.settings).into_core()?)),
            None => Ok(None),
        }
    }

    async fn save_settings(&self, user_id: &str, settings: &Value) -> Result<()> {
        let row = UserSettingsDB {
            user_id: user_id.to_string(),
            settings: serde_json::to_string(settings).into_core()?,
            updated_at: Utc::now().naive_utc(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(user_settings::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_user, setup_db};
    use serde_json::json;

    #[tokio::test]
    async fn settings_replace_whole_document() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 10);
        let repo = SettingsRepository::new(Arc::clone(&pool), writer);

        assert!(repo.get_settings("u1").unwrap().is_none());
        repo.save_settings("u1", &json!({"preferences": {"theme": "dark"}}))
            .await
            .unwrap();
        repo.save_settings("u1", &json!({"notifications": {"email": false}}))
            .await
            .unwrap();

        let stored = repo.get_settings("u1").unwrap().unwrap();
        assert_eq!(stored, json!({"notifications": {"email": false}}));
    }
}
