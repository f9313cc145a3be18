use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cybersentinel_core::users::UserUpdate;
use cybersentinel_core::utils::pagination::skip_limit;
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::UserView;

#[derive(Deserialize)]
pub struct SkipLimit {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
struct UserDeleted {
    message: String,
    user_id: String,
}

async fn me(CurrentUser(user): CurrentUser) -> ApiResult<Json<UserView>> {
    Ok(Json(user.into()))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<SkipLimit>,
) -> ApiResult<Json<Vec<UserView>>> {
    let (skip, limit) = skip_limit(q.skip, q.limit, 100);
    let users = state.user_service.list_company_users(&user, skip, limit)?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

async fn get_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<UserView>> {
    let found = state.user_service.get_company_user(&user, &id)?;
    Ok(Json(found.into()))
}

async fn update_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<UserView>> {
    let updated = state.user_service.update_user(&user, &id, update).await?;
    Ok(Json(updated.into()))
}

async fn delete_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<UserDeleted>> {
    state.user_service.delete_user(&user, &id).await?;
    Ok(Json(UserDeleted {
        message: "User deleted successfully".to_string(),
        user_id: id,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(me))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
