use async_trait::async_trait;

use super::assets_model::{
    Asset, AssetFilter, AssetQuota, AssetUpdate, DiscoveredHost, NewAsset,
};
use crate::errors::Result;
use crate::users::User;
use crate::utils::{Page, PageRequest};

/// Trait for asset repository operations. All lookups are scoped to the
/// owning user.
#[async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str, asset_id: &str) -> Result<Asset>;
    fn search(&self, user_id: &str, filter: &AssetFilter, page: PageRequest) -> Result<Page<Asset>>;
    fn list_by_ids(&self, user_id: &str, asset_ids: &[String]) -> Result<Vec<Asset>>;
    /// Inserts the asset unless the company already holds `quota.limit`
    /// assets. The count and the insert share one write transaction.
    async fn create(&self, user_id: &str, new_asset: NewAsset, quota: &AssetQuota)
        -> Result<Asset>;
    async fn update(&self, user_id: &str, asset_id: &str, update: AssetUpdate) -> Result<Asset>;
    async fn delete(&self, user_id: &str, asset_id: &str) -> Result<usize>;
    /// Inserts unseen hosts while the company is under its quota and
    /// refreshes `last_seen` on known ones. Returns the number of newly
    /// created assets.
    async fn upsert_discovered(
        &self,
        user_id: &str,
        hosts: Vec<DiscoveredHost>,
        quota: &AssetQuota,
    ) -> Result<usize>;
}

#[async_trait]
pub trait AssetServiceTrait: Send + Sync {
    fn get_asset(&self, user: &User, asset_id: &str) -> Result<Asset>;
    fn search_assets(
        &self,
        user: &User,
        filter: AssetFilter,
        page: PageRequest,
    ) -> Result<Page<Asset>>;
    async fn create_asset(&self, user: &User, new_asset: NewAsset) -> Result<Asset>;
    async fn update_asset(&self, user: &User, asset_id: &str, update: AssetUpdate)
        -> Result<Asset>;
    async fn delete_asset(&self, user: &User, asset_id: &str) -> Result<()>;
    /// Stores hosts found by a discovery run, within the company asset limit.
    async fn record_discovered(&self, user: &User, hosts: Vec<DiscoveredHost>) -> Result<usize>;
}
