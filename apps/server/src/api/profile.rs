use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use cybersentinel_core::users::{PasswordChange, Profile, ProfileUpdate};
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::MessageResponse;

#[derive(Serialize)]
struct ProfileSummary {
    id: String,
    full_name: String,
    email: String,
    country: Option<String>,
    phone: Option<String>,
}

#[derive(Serialize)]
struct ProfileUpdated {
    message: String,
    profile: ProfileSummary,
}

#[derive(Deserialize)]
struct AvatarQuery {
    avatar_url: String,
}

#[derive(Serialize)]
struct AvatarUpdated {
    message: String,
    avatar_url: String,
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.user_service.get_profile(&user.id)?))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<ProfileUpdated>> {
    let profile = state.user_service.update_profile(&user, update).await?;
    Ok(Json(ProfileUpdated {
        message: "Profile updated successfully".to_string(),
        profile: ProfileSummary {
            id: profile.id,
            full_name: profile.full_name,
            email: profile.email,
            country: profile.country,
            phone: profile.phone,
        },
    }))
}

async fn update_avatar(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<AvatarQuery>,
) -> ApiResult<Json<AvatarUpdated>> {
    let profile = state
        .user_service
        .update_avatar(&user.id, &q.avatar_url)
        .await?;
    Ok(Json(AvatarUpdated {
        message: "Avatar updated successfully".to_string(),
        avatar_url: profile.avatar_url.unwrap_or(q.avatar_url),
    }))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(change): Json<PasswordChange>,
) -> ApiResult<Json<MessageResponse>> {
    state.user_service.change_password(&user, change).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/avatar", patch(update_avatar))
        .route("/profile/change-password", post(change_password))
}
