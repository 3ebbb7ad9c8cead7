use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw task row. Tasks carry no owner of their own; access control always
/// goes through the parent project's owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskItem {
    pub id: i64,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Task as returned to clients, annotated with the parent project's title.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub project_id: i64,
    pub project_title: String,
    pub created_at: DateTime<Utc>,
}
