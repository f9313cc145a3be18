use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use cybersentinel_core::activity::Activity;
use cybersentinel_core::utils::pagination::skip_limit;
use serde::Serialize;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::users::SkipLimit;

#[derive(Serialize)]
struct ActivityEntry {
    id: String,
    #[serde(rename = "type")]
    activity_type: String,
    description: String,
    timestamp: NaiveDateTime,
}

#[derive(Serialize)]
struct ActivityFeed {
    activities: Vec<ActivityEntry>,
    total: i64,
}

#[derive(Serialize)]
struct AuditEntry {
    id: String,
    user_id: String,
    #[serde(rename = "type")]
    activity_type: String,
    description: String,
    timestamp: NaiveDateTime,
}

#[derive(Serialize)]
struct AuditLog {
    logs: Vec<AuditEntry>,
    total: i64,
}

async fn user_activity(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<SkipLimit>,
) -> ApiResult<Json<ActivityFeed>> {
    let (skip, limit) = skip_limit(q.skip, q.limit, 50);
    let list = state.activity_service.user_activity(&user, skip, limit)?;
    Ok(Json(ActivityFeed {
        activities: list
            .items
            .into_iter()
            .map(|a: Activity| ActivityEntry {
                id: a.id,
                activity_type: a.activity_type,
                description: a.description,
                timestamp: a.timestamp,
            })
            .collect(),
        total: list.total,
    }))
}

async fn audit_logs(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<SkipLimit>,
) -> ApiResult<Json<AuditLog>> {
    let (skip, limit) = skip_limit(q.skip, q.limit, 100);
    let list = state.activity_service.audit_logs(&user, skip, limit)?;
    Ok(Json(AuditLog {
        logs: list
            .items
            .into_iter()
            .map(|a| AuditEntry {
                id: a.id,
                user_id: a.user_id,
                activity_type: a.activity_type,
                description: a.description,
                timestamp: a.timestamp,
            })
            .collect(),
        total: list.total,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/activity", get(user_activity))
        .route("/audit-logs", get(audit_logs))
}
