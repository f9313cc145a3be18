//! Database model for assets.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use crate::utils::{decode_list, encode_list};
use cybersentinel_core::assets::{Asset, AssetStatus, AssetType, Exposure, NewAsset};
use cybersentinel_core::errors::{DatabaseError, Error, Result};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub asset_type: String,
    pub exposure: String,
    pub risk_score: i32,
    pub tags: String,
    pub status: String,
    pub last_seen: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn corrupt(e: String) -> Error {
    Error::Database(DatabaseError::Internal(e))
}

impl TryFrom<AssetDB> for Asset {
    type Error = Error;

    fn try_from(db: AssetDB) -> Result<Self> {
        Ok(Self {
            asset_type: AssetType::from_str(&db.asset_type).map_err(corrupt)?,
            exposure: Exposure::from_str(&db.exposure).map_err(corrupt)?,
            status: AssetStatus::from_str(&db.status).map_err(corrupt)?,
            tags: decode_list(&db.tags),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            risk_score: db.risk_score,
            last_seen: db.last_seen,
            description: db.description,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl AssetDB {
    pub fn from_new(
        id: String,
        user_id: &str,
        asset: NewAsset,
        now: NaiveDateTime,
    ) -> Result<Self> {
        Ok(Self {
            id,
            user_id: user_id.to_string(),
            name: asset.name.trim().to_string(),
            asset_type: asset.asset_type.as_str().to_string(),
            exposure: asset.exposure.as_str().to_string(),
            risk_score: 0,
            tags: encode_list(&asset.tags.unwrap_or_default())?,
            status: AssetStatus::Active.as_str().to_string(),
            last_seen: None,
            description: asset.description,
            created_at: now,
            updated_at: now,
        })
    }
}
