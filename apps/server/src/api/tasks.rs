use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cybersentinel_core::tasks::{
    NewTask, NewTaskMessage, Task, TaskFilter, TaskMessage, TaskPriority, TaskStatus, TaskUpdate,
};
use cybersentinel_core::utils::{Page, PageRequest};
use serde::Deserialize;

use crate::{auth::CurrentUser, error::ApiResult, main_lib::AppState};

use super::MessageResponse;

#[derive(Deserialize)]
struct TaskQuery {
    q: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    page: Option<i64>,
    page_size: Option<i64>,
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TaskQuery>,
) -> ApiResult<Json<Page<Task>>> {
    let filter = TaskFilter {
        q: q.q.filter(|s| !s.trim().is_empty()),
        status: q.status,
        priority: q.priority,
    };
    let page = PageRequest::new(q.page, q.page_size, 50);
    Ok(Json(state.task_service.list_tasks(filter, page)?))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(new_task): Json<NewTask>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.task_service.create_task(new_task).await?))
}

async fn get_task(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.task_service.get_task(&id)?))
}

async fn update_task(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<TaskUpdate>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.task_service.update_task(&id, update).await?))
}

async fn delete_task(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MessageResponse>> {
    state.task_service.delete_task(&id).await?;
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

async fn list_messages(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TaskMessage>>> {
    Ok(Json(state.task_service.list_messages(&id)?))
}

async fn add_message(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(message): Json<NewTaskMessage>,
) -> ApiResult<Json<TaskMessage>> {
    Ok(Json(
        state
            .task_service
            .add_message(Some(&user), &id, message)
            .await?,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route(
            "/tasks/{id}/messages",
            get(list_messages).post(add_message),
        )
}
