use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cybersentinel_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

fn classify(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(inner) => (StatusCode::BAD_REQUEST, "bad_request", inner.to_string()),
        CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
        CoreError::Database(DatabaseError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            "not_found",
            "Record not found".to_string(),
        ),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        CoreError::ConstraintViolation(_) | CoreError::Database(DatabaseError::UniqueViolation(_)) => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        CoreError::Unexpected(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg.clone()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Core(e) => classify(e),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg.clone()),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", self.to_string()),
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        }
        let mut response = (status, Json(ErrorBody { code, message })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
