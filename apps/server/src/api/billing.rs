use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use cybersentinel_core::billing::{Invoice, PlanInfo, SubscriptionRequest, UpgradeRequest};
use serde::Serialize;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::MessageResponse;

#[derive(Serialize)]
struct PlanChanged {
    message: String,
    plan: String,
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PlanInfo>> {
    Ok(Json(state.billing_service.current_plan(&user)?))
}

async fn subscribe(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SubscriptionRequest>,
) -> ApiResult<Json<PlanChanged>> {
    let subscription = state.billing_service.subscribe(&user, request).await?;
    Ok(Json(PlanChanged {
        message: "Subscription updated".to_string(),
        plan: subscription.plan,
    }))
}

async fn upgrade(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpgradeRequest>,
) -> ApiResult<Json<PlanChanged>> {
    let subscription = state.billing_service.upgrade(&user, request.plan).await?;
    Ok(Json(PlanChanged {
        message: "Plan upgraded".to_string(),
        plan: subscription.plan,
    }))
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state.billing_service.cancel(&user).await?;
    Ok(Json(MessageResponse::new("Subscription cancelled")))
}

async fn list_invoices(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Invoice>>> {
    Ok(Json(state.billing_service.list_invoices(&user)?))
}

async fn get_invoice(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Invoice>> {
    Ok(Json(state.billing_service.get_invoice(&user, &id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/billing/plan", get(get_plan))
        .route("/billing/subscribe", post(subscribe))
        .route("/billing/upgrade", post(upgrade))
        .route("/billing/cancel", post(cancel))
        .route("/billing/invoices", get(list_invoices))
        .route("/billing/invoices/{id}", get(get_invoice))
}
