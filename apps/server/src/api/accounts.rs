use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use cybersentinel_core::companies::{Company, CompanyUpdate};
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::{MessageResponse, UserView};

#[derive(Serialize)]
struct AccountView {
    id: String,
    name: String,
    plan: String,
    created_at: NaiveDateTime,
}

impl From<Company> for AccountView {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            name: c.name,
            plan: c.plan,
            created_at: c.created_at,
        }
    }
}

#[derive(Serialize)]
struct AccountSummary {
    id: String,
    name: String,
    plan: String,
}

#[derive(Serialize)]
struct AccountUpdated {
    message: String,
    account: AccountSummary,
}

#[derive(Deserialize)]
struct InviteQuery {
    email: String,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String {
    "reader".to_string()
}

#[derive(Serialize)]
struct InvitationSent {
    message: String,
    email: String,
    role: String,
}

async fn get_account(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<AccountView>> {
    let company = state.company_service.get_company(&user, &id)?;
    Ok(Json(company.into()))
}

async fn update_account(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<CompanyUpdate>,
) -> ApiResult<Json<AccountUpdated>> {
    let company = state
        .company_service
        .update_company(&user, &id, update)
        .await?;
    Ok(Json(AccountUpdated {
        message: "Account updated successfully".to_string(),
        account: AccountSummary {
            id: company.id,
            name: company.name,
            plan: company.plan,
        },
    }))
}

async fn list_members(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<UserView>>> {
    let members = state.company_service.list_members(&user, &id)?;
    Ok(Json(members.into_iter().map(UserView::from).collect()))
}

async fn invite_member(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<InviteQuery>,
) -> ApiResult<Json<InvitationSent>> {
    let invitation = state
        .company_service
        .invite_member(&user, &id, &q.email, &q.role)
        .await?;
    Ok(Json(InvitationSent {
        message: "Invitation sent successfully".to_string(),
        email: invitation.email,
        role: invitation.role,
    }))
}

async fn remove_member(
    Path((id, member_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    state
        .company_service
        .remove_member(&user, &id, &member_id)
        .await?;
    Ok(Json(MessageResponse::new("Member removed successfully")))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/{id}", get(get_account).put(update_account))
        .route("/accounts/{id}/members", get(list_members))
        .route("/accounts/{id}/invite", post(invite_member))
        .route("/accounts/{id}/members/{member_id}", delete(remove_member))
}
