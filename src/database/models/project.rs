use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw project row. The owner is assigned at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Project as returned to clients: the row plus the owner's display name and
/// the current task count, both computed by the query that produced it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProjectView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub owner_name: String,
    pub created_at: DateTime<Utc>,
    pub task_count: i64,
}
