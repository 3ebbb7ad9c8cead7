use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::database::models::ProjectView;
use crate::database::ProjectRepository;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectPayload {
    pub title: String,
    pub description: Option<String>,
}

/// GET /projects - list the calling user's projects
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ProjectView>>, ApiError> {
    let projects = ProjectRepository::new(state.db.clone()).list(user.user_id).await?;
    Ok(Json(projects))
}

/// GET /projects/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectView>, ApiError> {
    ProjectRepository::new(state.db.clone())
        .get(id, user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project not found or access denied"))
}

/// POST /projects - 201 with a Location header pointing at the new resource
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProjectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let project = ProjectRepository::new(state.db.clone())
        .create(&payload.title, payload.description.as_deref(), user.user_id)
        .await?;

    tracing::info!(project_id = project.id, user_id = user.user_id, "created project");

    let location = [(header::LOCATION, format!("/projects/{}", project.id))];
    Ok((StatusCode::CREATED, location, Json(project)))
}

/// PUT /projects/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectPayload>,
) -> Result<Json<ProjectView>, ApiError> {
    let project = ProjectRepository::new(state.db.clone())
        .update(id, &payload.title, payload.description.as_deref(), user.user_id)
        .await?;

    Ok(Json(project))
}

/// DELETE /projects/:id - 204 when a row matched, 404 otherwise
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = ProjectRepository::new(state.db.clone())
        .delete(id, user.user_id)
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Project not found or access denied"))
    }
}
