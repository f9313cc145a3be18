use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cybersentinel_core::asm::{
    AsmDashboard, AsmDiscovery, AsmDiscoveryRun, AsmDiscoveryUpdate, NewAsmDiscovery,
    PipelineDocument,
};
use cybersentinel_core::utils::{Page, PageRequest};
use serde::Deserialize;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct PageQuery {
    page: Option<i64>,
    page_size: Option<i64>,
}

async fn create_discovery(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<NewAsmDiscovery>,
) -> ApiResult<Json<AsmDiscovery>> {
    Ok(Json(state.asm_service.create_discovery(&user, request).await?))
}

async fn list_discoveries(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Page<AsmDiscovery>>> {
    let page = PageRequest::new(q.page, q.page_size, 20);
    Ok(Json(state.asm_service.list_discoveries(&user, page)?))
}

async fn get_discovery(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<AsmDiscovery>> {
    Ok(Json(state.asm_service.get_discovery(&user, &id)?))
}

async fn update_discovery(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<AsmDiscoveryUpdate>,
) -> ApiResult<Json<AsmDiscovery>> {
    Ok(Json(
        state
            .asm_service
            .update_discovery(&user, &id, update)
            .await?,
    ))
}

async fn delete_discovery(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<AsmDiscovery>> {
    Ok(Json(state.asm_service.delete_discovery(&user, &id).await?))
}

async fn list_runs(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<AsmDiscoveryRun>>> {
    Ok(Json(state.asm_service.list_runs(&user, &id)?))
}

async fn get_pipeline(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PipelineDocument>> {
    Ok(Json(state.asm_service.get_pipeline(&user, &id)?))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<AsmDashboard>> {
    Ok(Json(state.asm_service.dashboard(&user)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/asm/discoveries",
            get(list_discoveries).post(create_discovery),
        )
        .route(
            "/asm/discoveries/{id}",
            get(get_discovery)
                .patch(update_discovery)
                .delete(delete_discovery),
        )
        .route("/asm/discoveries/{id}/runs", get(list_runs))
        .route("/asm/discoveries/{id}/pipeline", get(get_pipeline))
        .route("/asm/dashboard", get(dashboard))
}
