use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::main_lib::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfoResponse {
    pub service: String,
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(get, path = "/", responses((status = 200, body = ServiceInfoResponse)))]
pub async fn root() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        service: "api-service".to_string(),
        status: "running".to_string(),
        version: "1.0.0".to_string(),
    })
}

#[utoipa::path(get, path = "/health", responses((status = 200, body = HealthResponse)))]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}
