use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use cybersentinel_core::catalog::{ServiceAction, ServiceInfo};
use serde::Serialize;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
struct ServiceActionResponse {
    message: String,
    service_id: String,
}

async fn list_services(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ServiceInfo>>> {
    Ok(Json(state.catalog_service.list_services()))
}

async fn get_service(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ServiceInfo>> {
    Ok(Json(state.catalog_service.get_service(&id)?))
}

fn apply(
    state: &AppState,
    user: &cybersentinel_core::users::User,
    id: String,
    action: ServiceAction,
) -> ApiResult<Json<ServiceActionResponse>> {
    let message = state.catalog_service.apply(user, &id, action)?;
    Ok(Json(ServiceActionResponse {
        message,
        service_id: id,
    }))
}

async fn purchase(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ServiceActionResponse>> {
    apply(&state, &user, id, ServiceAction::Purchase)
}

async fn activate(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ServiceActionResponse>> {
    apply(&state, &user, id, ServiceAction::Activate)
}

async fn deactivate(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ServiceActionResponse>> {
    apply(&state, &user, id, ServiceAction::Deactivate)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/{id}", get(get_service))
        .route("/services/{id}/purchase", post(purchase))
        .route("/services/{id}/activate", post(activate))
        .route("/services/{id}/deactivate", post(deactivate))
}
