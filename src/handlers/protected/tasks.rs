use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::database::models::TaskView;
use crate::database::TaskRepository;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskPayload {
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskPayload {
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
}

/// GET /tasks/project/:project_id - list a project's tasks. A project the
/// caller does not own reads as empty, not as an error.
pub async fn list_by_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<TaskView>>, ApiError> {
    let tasks = TaskRepository::new(state.db.clone())
        .list_by_project(project_id, user.user_id)
        .await?;

    Ok(Json(tasks))
}

/// GET /tasks/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<TaskView>, ApiError> {
    TaskRepository::new(state.db.clone())
        .get(id, user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task not found or access denied"))
}

/// POST /tasks - the target project must be owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let task = TaskRepository::new(state.db.clone())
        .create(&payload.title, payload.due_date, payload.project_id, user.user_id)
        .await?;

    tracing::info!(task_id = task.id, project_id = task.project_id, "created task");

    let location = [(header::LOCATION, format!("/tasks/{}", task.id))];
    Ok((StatusCode::CREATED, location, Json(task)))
}

/// PUT /tasks/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<Json<TaskView>, ApiError> {
    let task = TaskRepository::new(state.db.clone())
        .update(
            id,
            &payload.title,
            payload.due_date,
            payload.is_completed,
            user.user_id,
        )
        .await?;

    Ok(Json(task))
}

/// DELETE /tasks/:id - 204 when a row matched, 404 otherwise
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = TaskRepository::new(state.db.clone())
        .delete(id, user.user_id)
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Task not found or access denied"))
    }
}
