use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

#[cfg(test)]
pub mod testing;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

pub fn app(db: SqlitePool) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_routes())
        // Protected resource surfaces
        .merge(project_routes())
        .merge(task_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { db })
}

fn auth_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/validate", post(auth::validate))
}

fn project_routes() -> Router<AppState> {
    use handlers::protected::projects;

    Router::new()
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/:id",
            get(projects::show)
                .put(projects::update)
                .delete(projects::destroy),
        )
        .route_layer(axum_middleware::from_fn(middleware::jwt_auth_middleware))
}

fn task_routes() -> Router<AppState> {
    use handlers::protected::tasks;

    Router::new()
        .route("/tasks", post(tasks::create))
        .route(
            "/tasks/:id",
            get(tasks::show).put(tasks::update).delete(tasks::destroy),
        )
        .route("/tasks/project/:project_id", get(tasks::list_by_project))
        .route_layer(axum_middleware::from_fn(middleware::jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "ProjectHub API",
        "version": version,
        "description": "Project/task management backend with per-user data isolation",
        "endpoints": {
            "auth": "/auth/register, /auth/login, /auth/validate (public)",
            "projects": "/projects[/:id] (bearer token required)",
            "tasks": "/tasks[/:id], /tasks/project/:project_id (bearer token required)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
