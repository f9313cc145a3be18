//! HTTP routes. Every module exposes a `router()` merged under `/api/v1`.

use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use cybersentinel_core::users::User;
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};

use crate::{auth::require_jwt, config::Config, main_lib::AppState};

pub mod accounts;
pub mod activity;
pub mod asm;
pub mod assets;
pub mod auth;
pub mod billing;
pub mod health;
pub mod profile;
pub mod scans;
pub mod services;
pub mod settings;
pub mod tasks;
pub mod users;

/// `{"message": ...}` acknowledgement used by most mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public shape of a user.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub company_id: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            company_id: user.company_id,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        auth::signup,
        auth::login,
        auth::refresh
    ),
    components(schemas(
        auth::SignupBody,
        auth::SignupResponse,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::RefreshResponse,
        auth::VerifyResponse,
        auth::VerifiedUser,
        health::ServiceInfoResponse,
        health::HealthResponse,
        MessageResponse
    )),
    tags(
        (name = "auth"), (name = "users"), (name = "accounts"), (name = "profile"),
        (name = "billing"), (name = "services"), (name = "settings"), (name = "activity"),
        (name = "assets"), (name = "asm"), (name = "tasks"), (name = "scans")
    )
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let openapi = ApiDoc::openapi();

    let protected = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(accounts::router())
        .merge(profile::router())
        .merge(billing::router())
        .merge(services::router())
        .merge(settings::router())
        .merge(activity::router())
        .merge(assets::router())
        .merge(asm::router())
        .merge(tasks::router())
        .merge(scans::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_jwt));

    let api = Router::new().merge(auth::public_router()).merge(protected);

    Router::new()
        .merge(health::router())
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
