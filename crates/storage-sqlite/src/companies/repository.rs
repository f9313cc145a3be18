use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::CompanyDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::companies;
use cybersentinel_core::companies::{Company, CompanyRepositoryTrait, CompanyUpdate};
use cybersentinel_core::Result;

pub struct CompanyRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CompanyRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CompanyRepositoryTrait for CompanyRepository {
    fn get_by_id(&self, company_id: &str) -> Result<Company> {
        let mut conn = get_connection(&self.pool)?;
        let row = companies::table
            .find(company_id)
            .select(CompanyDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    async fn update(&self, company_id: &str, update: CompanyUpdate) -> Result<Company> {
        let company_id = company_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Company> {
                let mut row = companies::table
                    .find(&company_id)
                    .select(CompanyDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;
                if let Some(name) = update.name {
                    row.name = name;
                }
                if let Some(plan) = update.plan {
                    row.plan = plan;
                }
                row.updated_at = Utc::now().naive_utc();
                diesel::update(companies::table.find(&company_id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_user, setup_db};

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 25);
        let repo = CompanyRepository::new(Arc::clone(&pool), writer);

        let updated = repo
            .update(
                "c1",
                CompanyUpdate {
                    plan: Some("enterprise".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.plan, "enterprise");
        assert_eq!(updated.name, "Acme");
        assert_eq!(repo.get_by_id("c1").unwrap().assets_limit, 25);
        assert!(repo.get_by_id("nope").unwrap_err().is_not_found());
    }
}
