use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cybersentinel_core::assets::{Asset, AssetFilter, AssetType, AssetUpdate, Exposure, NewAsset};
use cybersentinel_core::utils::{Page, PageRequest};
use serde::Deserialize;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::MessageResponse;

#[derive(Deserialize)]
struct AssetQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    asset_type: Option<AssetType>,
    exposure: Option<Exposure>,
    page: Option<i64>,
    page_size: Option<i64>,
}

async fn list_assets(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<AssetQuery>,
) -> ApiResult<Json<Page<Asset>>> {
    let filter = AssetFilter {
        q: q.q.filter(|s| !s.trim().is_empty()),
        asset_type: q.asset_type,
        exposure: q.exposure,
    };
    let page = PageRequest::new(q.page, q.page_size, 50);
    Ok(Json(state.asset_service.search_assets(&user, filter, page)?))
}

async fn create_asset(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(new_asset): Json<NewAsset>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.asset_service.create_asset(&user, new_asset).await?))
}

async fn get_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.asset_service.get_asset(&user, &id)?))
}

async fn update_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<AssetUpdate>,
) -> ApiResult<Json<Asset>> {
    Ok(Json(
        state.asset_service.update_asset(&user, &id, update).await?,
    ))
}

async fn delete_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state.asset_service.delete_asset(&user, &id).await?;
    Ok(Json(MessageResponse::new("Asset deleted successfully")))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route(
            "/assets/{id}",
            get(get_asset).patch(update_asset).delete(delete_asset),
        )
}
