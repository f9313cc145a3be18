//! Assets module - the inventory of hosts, clouds, repos and identities a
//! user monitors.

mod assets_model;
mod assets_service;
mod assets_traits;

pub use assets_model::{
    Asset, AssetFilter, AssetQuota, AssetStatus, AssetType, AssetUpdate, DiscoveredHost, Exposure,
    NewAsset, ASSET_LIMIT_REACHED,
};
pub use assets_service::AssetService;
pub use assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
