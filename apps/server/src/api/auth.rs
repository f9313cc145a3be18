use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cybersentinel_core::users::SignupRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::{AuthError, CurrentUser, TokenType},
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

use super::MessageResponse;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::Unauthorized("Could not validate credentials".into()),
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupBody {
    pub company_name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub email: String,
    pub user_id: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: VerifiedUser,
}

#[derive(Deserialize)]
struct EmailQuery {
    email: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RefreshQuery {
    pub refresh_token: String,
}

#[derive(Deserialize)]
struct ResetQuery {
    token: String,
    new_password: String,
}

#[utoipa::path(post, path = "/api/v1/auth/signup", request_body = SignupBody,
    responses((status = 201, body = SignupResponse), (status = 400, description = "Invalid input")))]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupBody>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let user = state
        .user_service
        .signup(SignupRequest {
            company_name: body.company_name,
            full_name: body.full_name,
            email: body.email,
            password: body.password,
            role: body.role,
            country: body.country,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

#[utoipa::path(post, path = "/api/v1/auth/login", request_body = LoginRequest,
    responses((status = 200, body = LoginResponse), (status = 401, description = "Incorrect email or password")))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .user_service
        .authenticate(&body.email, &body.password)
        .await?;
    let access_token = state.auth.issue_token(&user, TokenType::Access)?;
    let refresh_token = state.auth.issue_token(&user, TokenType::Refresh)?;
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        email: user.email,
        user_id: user.id,
        refresh_token,
    }))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state.user_service.logout(&user).await;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

async fn magic_link(
    State(state): State<Arc<AppState>>,
    Query(q): Query<EmailQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let user = state
        .user_service
        .find_by_email(&q.email)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    let token = state.auth.issue_token(&user, TokenType::Magic)?;
    tracing::info!(user_id = %user.id, "Magic link issued: /auth/magic?token={}", token);
    Ok(Json(MessageResponse::new("Magic link sent to email")))
}

#[utoipa::path(post, path = "/api/v1/auth/refresh", params(RefreshQuery),
    responses((status = 200, body = RefreshResponse), (status = 401, description = "Invalid refresh token")))]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RefreshQuery>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = state
        .auth
        .validate_token(&q.refresh_token, TokenType::Refresh)?;
    let user = state
        .user_service
        .get_user(&claims.user_id)
        .map_err(|_| ApiError::Unauthorized("Could not validate credentials".into()))?;
    let access_token = state.auth.issue_token(&user, TokenType::Access)?;
    Ok(Json(RefreshResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Query(q): Query<EmailQuery>,
) -> ApiResult<Json<MessageResponse>> {
    if let Some(user) = state.user_service.find_by_email(&q.email)? {
        let token = state.auth.issue_token(&user, TokenType::Reset)?;
        tracing::info!(user_id = %user.id, "Password reset issued: /auth/reset?token={}", token);
    }
    Ok(Json(MessageResponse::new(
        "If the email exists, a password reset link has been sent",
    )))
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ResetQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let claims = state
        .auth
        .validate_token(&q.token, TokenType::Reset)
        .map_err(|_| ApiError::BadRequest("Invalid or expired token".into()))?;
    state
        .user_service
        .reset_password(&claims.user_id, &q.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

async fn verify(CurrentUser(user): CurrentUser) -> ApiResult<Json<VerifyResponse>> {
    Ok(Json(VerifyResponse {
        valid: true,
        user: VerifiedUser {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
        },
    }))
}

/// Routes reachable without a token.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/magic-link", post(magic_link))
        .route("/auth/refresh", post(refresh))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/verify", get(verify))
}
