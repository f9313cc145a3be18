use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use super::assets_model::{
    Asset, AssetFilter, AssetQuota, AssetUpdate, DiscoveredHost, NewAsset,
};
use super::assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
use crate::activity::{ActivityKind, ActivityServiceTrait, NewActivity};
use crate::companies::CompanyRepositoryTrait;
use crate::errors::{Error, Result};
use crate::users::User;
use crate::utils::{Page, PageRequest};

pub struct AssetService {
    repository: Arc<dyn AssetRepositoryTrait>,
    companies: Arc<dyn CompanyRepositoryTrait>,
    activity: Arc<dyn ActivityServiceTrait>,
}

impl AssetService {
    pub fn new(
        repository: Arc<dyn AssetRepositoryTrait>,
        companies: Arc<dyn CompanyRepositoryTrait>,
        activity: Arc<dyn ActivityServiceTrait>,
    ) -> Self {
        Self {
            repository,
            companies,
            activity,
        }
    }

    fn quota(&self, user: &User) -> Result<AssetQuota> {
        let company = self.companies.get_by_id(&user.company_id)?;
        Ok(AssetQuota {
            company_id: company.id,
            limit: i64::from(company.assets_limit),
        })
    }

    fn not_found(e: Error) -> Error {
        if e.is_not_found() {
            Error::not_found("Asset not found")
        } else {
            e
        }
    }
}

#[async_trait]
impl AssetServiceTrait for AssetService {
    fn get_asset(&self, user: &User, asset_id: &str) -> Result<Asset> {
        self.repository
            .get_by_id(&user.id, asset_id)
            .map_err(Self::not_found)
    }

    fn search_assets(
        &self,
        user: &User,
        filter: AssetFilter,
        page: PageRequest,
    ) -> Result<Page<Asset>> {
        self.repository.search(&user.id, &filter, page)
    }

    async fn create_asset(&self, user: &User, new_asset: NewAsset) -> Result<Asset> {
        new_asset.validate()?;
        let quota = self.quota(user)?;
        let asset = self.repository.create(&user.id, new_asset, &quota).await?;
        self.activity
            .record(NewActivity::new(
                user.id.clone(),
                Some(user.company_id.clone()),
                ActivityKind::AssetCreated,
                format!("Added asset {}", asset.name),
            ))
            .await;
        Ok(asset)
    }

    async fn update_asset(
        &self,
        user: &User,
        asset_id: &str,
        update: AssetUpdate,
    ) -> Result<Asset> {
        update.validate()?;
        self.get_asset(user, asset_id)?;
        self.repository
            .update(&user.id, asset_id, update)
            .await
            .map_err(Self::not_found)
    }

    async fn delete_asset(&self, user: &User, asset_id: &str) -> Result<()> {
        let asset = self.get_asset(user, asset_id)?;
        self.repository.delete(&user.id, &asset.id).await?;
        self.activity
            .record(NewActivity::new(
                user.id.clone(),
                Some(user.company_id.clone()),
                ActivityKind::AssetDeleted,
                format!("Deleted asset {}", asset.name),
            ))
            .await;
        Ok(())
    }

    async fn record_discovered(&self, user: &User, hosts: Vec<DiscoveredHost>) -> Result<usize> {
        if hosts.is_empty() {
            return Ok(0);
        }
        let offered = hosts.len();
        let quota = self.quota(user)?;
        let created = self
            .repository
            .upsert_discovered(&user.id, hosts, &quota)
            .await?;
        if created == 0 && offered > 0 {
            warn!(
                "No new assets stored for company {} (known hosts or limit of {})",
                user.company_id, quota.limit
            );
        }
        debug!("Discovery created {} new assets for {}", created, user.id);
        Ok(created)
    }
}
