//! HTTP control plane of the worker.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::job_manager::{Job, JobError, JobManager, JobRequest, JobState};

#[derive(Debug)]
pub enum ControlPlaneError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<JobError> for ControlPlaneError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::UnsupportedType(_) => ControlPlaneError::BadRequest(err.to_string()),
            JobError::Duplicate(_) => ControlPlaneError::Conflict(err.to_string()),
            JobError::NotFound(_) => ControlPlaneError::NotFound(err.to_string()),
            JobError::Core(e) => ControlPlaneError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ControlPlaneError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ControlPlaneError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m),
            ControlPlaneError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
            ControlPlaneError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m),
            ControlPlaneError::Internal(m) => {
                tracing::error!("Control plane error: {}", m);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", m)
            }
        };
        (status, Json(json!({ "code": code, "message": message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub status: &'static str,
    pub job_id: String,
    pub state: JobState,
    #[serde(rename = "type")]
    pub kind: String,
}

async fn status() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn start_job(
    State(manager): State<Arc<JobManager>>,
    payload: Result<Json<JobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JobAccepted>), ControlPlaneError> {
    let Json(request) = payload.map_err(|e| ControlPlaneError::BadRequest(e.body_text()))?;
    if request.id.trim().is_empty() {
        return Err(ControlPlaneError::BadRequest("id is required".to_string()));
    }

    let job = manager.register(request).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted {
            status: "accepted",
            job_id: job.id,
            state: job.state,
            kind: job.kind,
        }),
    ))
}

async fn list_jobs(State(manager): State<Arc<JobManager>>) -> Json<Vec<Job>> {
    Json(manager.list().await)
}

pub fn router(manager: Arc<JobManager>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(status))
        .route("/asm/jobs/start", post(start_job))
        .route("/asm/jobs", get(list_jobs))
        .with_state(manager)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
}
