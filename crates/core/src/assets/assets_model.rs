use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::validation::require_non_empty;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Domain,
    Ip,
    Cloud,
    Repo,
    Saas,
    User,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Domain => "domain",
            AssetType::Ip => "ip",
            AssetType::Cloud => "cloud",
            AssetType::Repo => "repo",
            AssetType::Saas => "saas",
            AssetType::User => "user",
        }
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "domain" => Ok(AssetType::Domain),
            "ip" => Ok(AssetType::Ip),
            "cloud" => Ok(AssetType::Cloud),
            "repo" => Ok(AssetType::Repo),
            "saas" => Ok(AssetType::Saas),
            "user" => Ok(AssetType::User),
            _ => Err(format!("Unknown asset type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    Public,
    #[default]
    Internal,
}

impl Exposure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exposure::Public => "public",
            Exposure::Internal => "internal",
        }
    }
}

impl FromStr for Exposure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "public" => Ok(Exposure::Public),
            "internal" => Ok(Exposure::Internal),
            _ => Err(format!("Unknown exposure: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Active => "active",
            AssetStatus::Inactive => "inactive",
            AssetStatus::Archived => "archived",
        }
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(AssetStatus::Active),
            "inactive" => Ok(AssetStatus::Inactive),
            "archived" => Ok(AssetStatus::Archived),
            _ => Err(format!("Unknown asset status: {}", s)),
        }
    }
}

/// Domain model representing a monitored asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub exposure: Exposure,
    /// 0 to 100
    pub risk_score: i32,
    pub tags: Vec<String>,
    pub status: AssetStatus,
    pub last_seen: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub exposure: Exposure,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

impl NewAsset {
    pub fn validate(&self) -> Result<()> {
        require_non_empty(&self.name, "Asset name")
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub exposure: Option<Exposure>,
    pub tags: Option<Vec<String>>,
    pub status: Option<AssetStatus>,
    pub risk_score: Option<i32>,
    pub description: Option<String>,
}

impl AssetUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_non_empty(name, "Asset name")?;
        }
        if let Some(score) = self.risk_score {
            if !(0..=100).contains(&score) {
                return Err(Error::invalid("risk_score must be between 0 and 100"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    /// Case-insensitive substring of the asset name.
    pub q: Option<String>,
    pub asset_type: Option<AssetType>,
    pub exposure: Option<Exposure>,
}

/// A hostname or address found by a discovery run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveredHost {
    pub name: String,
    pub asset_type: AssetType,
}

/// Company-wide asset cap, enforced inside the insert transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuota {
    pub company_id: String,
    pub limit: i64,
}

pub const ASSET_LIMIT_REACHED: &str = "Asset limit reached for this account";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_score_bounds() {
        let mut update = AssetUpdate {
            risk_score: Some(101),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        update.risk_score = Some(-1);
        assert!(update.validate().is_err());
        update.risk_score = Some(100);
        assert!(update.validate().is_ok());
    }

    #[test]
    fn new_asset_defaults_to_internal() {
        let asset: NewAsset =
            serde_json::from_str(r#"{"name":"example.com","type":"domain"}"#).unwrap();
        assert_eq!(asset.exposure, Exposure::Internal);
        assert_eq!(asset.asset_type, AssetType::Domain);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<NewAsset>(r#"{"name":"x","type":"printer"}"#).is_err());
        assert!(AssetType::from_str("printer").is_err());
    }
}
