use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::model::AssetDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{assets, users};
use crate::utils::{chunk_for_sqlite, encode_list, like_pattern};
use cybersentinel_core::assets::{
    Asset, AssetFilter, AssetQuota, AssetRepositoryTrait, AssetStatus, AssetUpdate,
    DiscoveredHost, Exposure, NewAsset, ASSET_LIMIT_REACHED,
};
use cybersentinel_core::utils::{Page, PageRequest};
use cybersentinel_core::{Error, Result};

const DISCOVERED_TAG: &str = "discovered";

/// Repository for the per-user asset inventory.
pub struct AssetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AssetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn filtered<'a>(user_id: &'a str, filter: &'a AssetFilter) -> assets::BoxedQuery<'a, diesel::sqlite::Sqlite> {
        let mut query = assets::table
            .filter(assets::user_id.eq(user_id))
            .into_boxed();
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query = query.filter(assets::name.like(like_pattern(q)).escape('\\'));
        }
        if let Some(asset_type) = filter.asset_type {
            query = query.filter(assets::asset_type.eq(asset_type.as_str()));
        }
        if let Some(exposure) = filter.exposure {
            query = query.filter(assets::exposure.eq(exposure.as_str()));
        }
        query
    }
}

fn load_owned(conn: &mut SqliteConnection, user_id: &str, asset_id: &str) -> Result<AssetDB> {
    Ok(assets::table
        .filter(assets::id.eq(asset_id))
        .filter(assets::user_id.eq(user_id))
        .select(AssetDB::as_select())
        .first(conn)
        .map_err(StorageError::from)?)
}

/// Assets held by every user of the company. Called inside the writer so the
/// count and the following insert see the same snapshot.
fn company_asset_count(conn: &mut SqliteConnection, company_id: &str) -> Result<i64> {
    Ok(assets::table
        .inner_join(users::table)
        .filter(users::company_id.eq(company_id))
        .count()
        .get_result::<i64>(conn)
        .map_err(StorageError::from)?)
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    fn get_by_id(&self, user_id: &str, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;
        Asset::try_from(load_owned(&mut conn, user_id, asset_id)?)
    }

    fn search(&self, user_id: &str, filter: &AssetFilter, page: PageRequest) -> Result<Page<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let total = Self::filtered(user_id, filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = Self::filtered(user_id, filter)
            .order((assets::created_at.desc(), assets::id.asc()))
            .offset(page.offset())
            .limit(page.limit())
            .select(AssetDB::as_select())
            .load::<AssetDB>(&mut conn)
            .map_err(StorageError::from)?;
        let items = rows
            .into_iter()
            .map(Asset::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(page.wrap(items, total))
    }

    fn list_by_ids(&self, user_id: &str, asset_ids: &[String]) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let mut found = Vec::with_capacity(asset_ids.len());
        for chunk in chunk_for_sqlite(asset_ids) {
            let rows = assets::table
                .filter(assets::user_id.eq(user_id))
                .filter(assets::id.eq_any(chunk))
                .select(AssetDB::as_select())
                .load::<AssetDB>(&mut conn)
                .map_err(StorageError::from)?;
            for row in rows {
                found.push(Asset::try_from(row)?);
            }
        }
        Ok(found)
    }

    async fn create(
        &self,
        user_id: &str,
        new_asset: NewAsset,
        quota: &AssetQuota,
    ) -> Result<Asset> {
        let row = AssetDB::from_new(
            Uuid::new_v4().to_string(),
            user_id,
            new_asset,
            Utc::now().naive_utc(),
        )?;
        let quota = quota.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                if company_asset_count(conn, &quota.company_id)? >= quota.limit {
                    return Err(Error::ConstraintViolation(ASSET_LIMIT_REACHED.to_string()));
                }
                let inserted = diesel::insert_into(assets::table)
                    .values(&row)
                    .returning(AssetDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Asset::try_from(inserted)
            })
            .await
    }

    async fn update(&self, user_id: &str, asset_id: &str, update: AssetUpdate) -> Result<Asset> {
        let user_id = user_id.to_string();
        let asset_id = asset_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let mut row = load_owned(conn, &user_id, &asset_id)?;
                if let Some(name) = update.name {
                    row.name = name.trim().to_string();
                }
                if let Some(exposure) = update.exposure {
                    row.exposure = exposure.as_str().to_string();
                }
                if let Some(tags) = update.tags {
                    row.tags = encode_list(&tags)?;
                }
                if let Some(status) = update.status {
                    row.status = status.as_str().to_string();
                }
                if let Some(score) = update.risk_score {
                    row.risk_score = score;
                }
                if let Some(description) = update.description {
                    row.description = Some(description);
                }
                row.updated_at = Utc::now().naive_utc();
                diesel::update(assets::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Asset::try_from(row)
            })
            .await
    }

    async fn delete(&self, user_id: &str, asset_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let asset_id = asset_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    assets::table
                        .filter(assets::id.eq(asset_id))
                        .filter(assets::user_id.eq(user_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }

    async fn upsert_discovered(
        &self,
        user_id: &str,
        hosts: Vec<DiscoveredHost>,
        quota: &AssetQuota,
    ) -> Result<usize> {
        let user_id = user_id.to_string();
        let quota = quota.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let max_new = (quota.limit - company_asset_count(conn, &quota.company_id)?).max(0);
                let now = Utc::now().naive_utc();
                let last_seen = Utc::now().to_rfc3339();
                let tags = encode_list(&[DISCOVERED_TAG.to_string()])?;
                let mut seen = HashSet::new();
                let mut created: i64 = 0;

                for host in hosts {
                    let name = host.name.trim().to_lowercase();
                    if name.is_empty() || !seen.insert(name.clone()) {
                        continue;
                    }
                    let refreshed = diesel::update(
                        assets::table
                            .filter(assets::user_id.eq(&user_id))
                            .filter(assets::name.eq(&name)),
                    )
                    .set((
                        assets::last_seen.eq(Some(last_seen.clone())),
                        assets::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                    if refreshed > 0 || created >= max_new {
                        continue;
                    }
                    let row = AssetDB {
                        id: Uuid::new_v4().to_string(),
                        user_id: user_id.clone(),
                        name,
                        asset_type: host.asset_type.as_str().to_string(),
                        exposure: Exposure::Public.as_str().to_string(),
                        risk_score: 0,
                        tags: tags.clone(),
                        status: AssetStatus::Active.as_str().to_string(),
                        last_seen: Some(last_seen.clone()),
                        description: None,
                        created_at: now,
                        updated_at: now,
                    };
                    diesel::insert_into(assets::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    created += 1;
                }
                Ok(created as usize)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_user, setup_db};
    use cybersentinel_core::assets::AssetType;

    fn quota(limit: i64) -> AssetQuota {
        AssetQuota {
            company_id: "c1".to_string(),
            limit,
        }
    }

    fn new_asset(name: &str, asset_type: AssetType) -> NewAsset {
        NewAsset {
            name: name.to_string(),
            asset_type,
            exposure: Exposure::Internal,
            tags: Some(vec!["prod".to_string()]),
            description: None,
        }
    }

    #[tokio::test]
    async fn search_filters_and_paginates() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 100);
        seed_user(&pool, "c1", "u2", 100);
        let repo = AssetRepository::new(Arc::clone(&pool), writer);

        repo.create("u1", new_asset("api.acme.io", AssetType::Domain), &quota(100)).await.unwrap();
        repo.create("u1", new_asset("www.acme.io", AssetType::Domain), &quota(100)).await.unwrap();
        repo.create("u1", new_asset("10.0.0.1", AssetType::Ip), &quota(100)).await.unwrap();
        repo.create("u2", new_asset("api.other.io", AssetType::Domain), &quota(100)).await.unwrap();

        let filter = AssetFilter {
            q: Some("API".to_string()),
            ..Default::default()
        };
        let page = repo.search("u1", &filter, PageRequest::new(None, None, 20)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "api.acme.io");
        assert_eq!(page.items[0].tags, vec!["prod"]);

        let domains = AssetFilter {
            asset_type: Some(AssetType::Domain),
            ..Default::default()
        };
        let first = repo.search("u1", &domains, PageRequest::new(Some(1), Some(1), 20)).unwrap();
        assert_eq!(first.total, 2);
        assert_eq!(first.items.len(), 1);

        let wildcard = AssetFilter {
            q: Some("%".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.search("u1", &wildcard, PageRequest::new(None, None, 20)).unwrap().total, 0);
    }

    #[tokio::test]
    async fn lookups_are_owner_scoped() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 100);
        seed_user(&pool, "c1", "u2", 100);
        let repo = AssetRepository::new(Arc::clone(&pool), writer);
        let asset = repo.create("u1", new_asset("api.acme.io", AssetType::Domain), &quota(100)).await.unwrap();

        assert!(repo.get_by_id("u2", &asset.id).unwrap_err().is_not_found());
        assert!(repo.list_by_ids("u2", &[asset.id.clone()]).unwrap().is_empty());
        assert_eq!(repo.delete("u2", &asset.id).await.unwrap(), 0);

        let updated = repo
            .update(
                "u1",
                &asset.id,
                AssetUpdate {
                    risk_score: Some(80),
                    exposure: Some(Exposure::Public),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.risk_score, 80);
        assert_eq!(updated.exposure, Exposure::Public);
        assert_eq!(updated.name, "api.acme.io");
        assert_eq!(repo.delete("u1", &asset.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 100);
        let repo = AssetRepository::new(Arc::clone(&pool), writer);
        repo.create("u1", new_asset("api.acme.io", AssetType::Domain), &quota(100)).await.unwrap();
        assert!(repo.create("u1", new_asset("api.acme.io", AssetType::Domain), &quota(100)).await.is_err());
    }

    #[tokio::test]
    async fn discovered_hosts_respect_the_cap() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 3);
        let repo = AssetRepository::new(Arc::clone(&pool), writer);
        repo.create("u1", new_asset("acme.io", AssetType::Domain), &quota(100)).await.unwrap();

        let hosts = ["acme.io", "a.acme.io", "b.acme.io", "B.acme.io", "c.acme.io"]
            .iter()
            .map(|name| DiscoveredHost {
                name: name.to_string(),
                asset_type: AssetType::Domain,
            })
            .collect();
        let created = repo.upsert_discovered("u1", hosts, &quota(3)).await.unwrap();
        assert_eq!(created, 2);

        let all = repo
            .search("u1", &AssetFilter::default(), PageRequest::new(None, None, 50))
            .unwrap();
        assert_eq!(all.total, 3);
        let known = all.items.iter().find(|a| a.name == "acme.io").unwrap();
        assert!(known.last_seen.is_some());
        let found = all.items.iter().find(|a| a.name == "a.acme.io").unwrap();
        assert_eq!(found.tags, vec![DISCOVERED_TAG]);
        assert_eq!(found.exposure, Exposure::Public);
    }

    #[tokio::test]
    async fn concurrent_creates_stop_at_the_company_limit() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 5);
        seed_user(&pool, "c1", "u2", 5);
        let repo = Arc::new(AssetRepository::new(Arc::clone(&pool), writer));

        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = Arc::clone(&repo);
            let owner = if i % 2 == 0 { "u1" } else { "u2" };
            handles.push(tokio::spawn(async move {
                repo.create(
                    owner,
                    new_asset(&format!("h{}.acme.io", i), AssetType::Domain),
                    &quota(5),
                )
                .await
            }));
        }
        let mut created = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(Error::ConstraintViolation(msg)) => {
                    assert_eq!(msg, ASSET_LIMIT_REACHED);
                    rejected += 1;
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 5);
        assert_eq!(rejected, 15);

        let found = (0..3)
            .map(|n| DiscoveredHost {
                name: format!("new{}.acme.io", n),
                asset_type: AssetType::Domain,
            })
            .collect();
        assert_eq!(repo.upsert_discovered("u1", found, &quota(5)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn names_match_without_regard_to_case() {
        let (pool, writer, _dir) = setup_db();
        seed_user(&pool, "c1", "u1", 100);
        let repo = AssetRepository::new(Arc::clone(&pool), writer);
        let asset = repo
            .create("u1", new_asset("API.corp.com", AssetType::Domain), &quota(100))
            .await
            .unwrap();

        let hosts = vec![DiscoveredHost {
            name: "api.corp.com".to_string(),
            asset_type: AssetType::Domain,
        }];
        assert_eq!(repo.upsert_discovered("u1", hosts, &quota(100)).await.unwrap(), 0);
        let refreshed = repo.get_by_id("u1", &asset.id).unwrap();
        assert!(refreshed.last_seen.is_some());
        assert_eq!(refreshed.name, "API.corp.com");

        assert!(repo
            .create("u1", new_asset("api.CORP.com", AssetType::Domain), &quota(100))
            .await
            .is_err());
    }
}
