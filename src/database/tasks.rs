use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::models::{Project, TaskItem, TaskView};
use crate::database::RepositoryError;

const TITLE_MAX: usize = 200;

const VIEW_COLUMNS: &str = "t.id, t.title, t.due_date, t.is_completed, t.project_id, \
     p.title AS project_title, t.created_at";

/// Authorization-scoped access to tasks. A task has no owner of its own;
/// every operation joins through the parent project and filters on its
/// `owner_id`, evaluated at call time rather than cached from creation.
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the tasks of one project, oldest first. A project the caller
    /// does not own yields an empty list, not an error.
    pub async fn list_by_project(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Vec<TaskView>, RepositoryError> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS}
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.project_id = ? AND p.owner_id = ?
             ORDER BY t.created_at ASC, t.id ASC"
        );

        let tasks = sqlx::query_as::<_, TaskView>(&sql)
            .bind(project_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    pub async fn get(&self, task_id: i64, user_id: i64) -> Result<Option<TaskView>, RepositoryError> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS}
             FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = ? AND p.owner_id = ?"
        );

        let task = sqlx::query_as::<_, TaskView>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(task)
    }

    /// Create a task under a project. The target project must exist and be
    /// owned by the caller before anything is inserted; a task can never be
    /// attached to a project the caller does not own.
    pub async fn create(
        &self,
        title: &str,
        due_date: Option<DateTime<Utc>>,
        project_id: i64,
        user_id: i64,
    ) -> Result<TaskView, RepositoryError> {
        validate_task_title(title)?;

        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND owner_id = ?")
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::Denied("Project"))?;

        let task = sqlx::query_as::<_, TaskItem>(
            "INSERT INTO tasks (title, due_date, is_completed, project_id, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(title)
        .bind(due_date)
        .bind(false)
        .bind(project_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskView {
            id: task.id,
            title: task.title,
            due_date: task.due_date,
            is_completed: task.is_completed,
            project_id: task.project_id,
            project_title: project.title,
            created_at: task.created_at,
        })
    }

    /// Update a task. Ownership is re-verified through the project join
    /// inside the UPDATE itself; zero rows affected means
    /// not-found-or-not-owned.
    pub async fn update(
        &self,
        task_id: i64,
        title: &str,
        due_date: Option<DateTime<Utc>>,
        is_completed: bool,
        user_id: i64,
    ) -> Result<TaskView, RepositoryError> {
        validate_task_title(title)?;

        let result = sqlx::query(
            "UPDATE tasks SET title = ?, due_date = ?, is_completed = ?
             WHERE id = ? AND project_id IN (SELECT id FROM projects WHERE owner_id = ?)",
        )
        .bind(title)
        .bind(due_date)
        .bind(is_completed)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Denied("Task"));
        }

        self.get(task_id, user_id)
            .await?
            .ok_or(RepositoryError::Denied("Task"))
    }

    pub async fn delete(&self, task_id: i64, user_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM tasks
             WHERE id = ? AND project_id IN (SELECT id FROM projects WHERE owner_id = ?)",
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn validate_task_title(title: &str) -> Result<(), RepositoryError> {
    let len = title.chars().count();
    if len == 0 {
        return Err(RepositoryError::Validation("Title is required".to_string()));
    }
    if len > TITLE_MAX {
        return Err(RepositoryError::Validation(format!(
            "Title must be at most {} characters",
            TITLE_MAX
        )));
    }
    Ok(())
}
