use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use cybersentinel_core::scans::{NewScan, Scan, ScanAccepted, ScanDetail, VsDashboard};
use cybersentinel_core::utils::pagination::skip_limit;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::{users::SkipLimit, MessageResponse};

async fn create_scan(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(new_scan): Json<NewScan>,
) -> ApiResult<Json<ScanAccepted>> {
    let scan = state.scan_service.create_scan(&user, new_scan).await?;
    Ok(Json(ScanAccepted::from(&scan)))
}

async fn list_scans(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<SkipLimit>,
) -> ApiResult<Json<Vec<Scan>>> {
    let (skip, limit) = skip_limit(q.skip, q.limit, 100);
    Ok(Json(state.scan_service.list_scans(&user, skip, limit)?))
}

async fn get_scan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ScanDetail>> {
    Ok(Json(state.scan_service.get_scan(&user, &id)?))
}

async fn retest_scan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ScanAccepted>> {
    let scan = state.scan_service.retest_scan(&user, &id).await?;
    Ok(Json(ScanAccepted::from(&scan)))
}

async fn delete_scan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state.scan_service.delete_scan(&user, &id).await?;
    Ok(Json(MessageResponse::new("Scan deleted successfully")))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<VsDashboard>> {
    Ok(Json(state.scan_service.dashboard(&user)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/scans", get(list_scans).post(create_scan))
        .route("/scans/{id}", get(get_scan).delete(delete_scan))
        .route("/scans/{id}/retest", post(retest_scan))
        .route("/vs/dashboard", get(dashboard))
}
