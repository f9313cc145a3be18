use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
struct SettingsUpdated {
    message: String,
    settings: Value,
}

async fn get_settings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    Ok(Json(state.settings_service.get_settings(&user)?))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(settings): Json<Value>,
) -> ApiResult<Json<SettingsUpdated>> {
    let settings = state
        .settings_service
        .update_settings(&user, settings)
        .await?;
    Ok(Json(SettingsUpdated {
        message: "Settings updated".to_string(),
        settings,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}
