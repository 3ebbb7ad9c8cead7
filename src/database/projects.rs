use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{Project, ProjectView};
use crate::database::RepositoryError;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;

const VIEW_COLUMNS: &str = "p.id, p.title, p.description, p.owner_id, \
     u.first_name || ' ' || u.last_name AS owner_name, p.created_at, \
     (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS task_count";

/// Authorization-scoped access to projects. Every operation takes the calling
/// user's id and folds `owner_id = ?` into the query itself, so a row the
/// caller does not own can neither be returned nor mutated.
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List the caller's projects, oldest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<ProjectView>, RepositoryError> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS}
             FROM projects p
             JOIN users u ON u.id = p.owner_id
             WHERE p.owner_id = ?
             ORDER BY p.created_at ASC, p.id ASC"
        );

        let projects = sqlx::query_as::<_, ProjectView>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    /// Fetch one project. Ownership is part of the lookup predicate: a
    /// project owned by someone else comes back as `None`, same as a
    /// nonexistent one.
    pub async fn get(&self, project_id: i64, user_id: i64) -> Result<Option<ProjectView>, RepositoryError> {
        let sql = format!(
            "SELECT {VIEW_COLUMNS}
             FROM projects p
             JOIN users u ON u.id = p.owner_id
             WHERE p.id = ? AND p.owner_id = ?"
        );

        let project = sqlx::query_as::<_, ProjectView>(&sql)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    /// Create a project owned by the caller. The owner is always `user_id`;
    /// there is no client-supplied owner.
    pub async fn create(
        &self,
        title: &str,
        description: Option<&str>,
        user_id: i64,
    ) -> Result<ProjectView, RepositoryError> {
        validate_project_input(title, description)?;

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (title, description, owner_id, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(title)
        .bind(description)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        let owner_name: String =
            sqlx::query_scalar("SELECT first_name || ' ' || last_name FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(ProjectView {
            id: project.id,
            title: project.title,
            description: project.description,
            owner_id: project.owner_id,
            owner_name,
            created_at: project.created_at,
            task_count: 0,
        })
    }

    /// Update title/description. The ownership predicate is part of the
    /// UPDATE statement, so the check and the write cannot be separated; zero
    /// rows affected means not-found-or-not-owned.
    pub async fn update(
        &self,
        project_id: i64,
        title: &str,
        description: Option<&str>,
        user_id: i64,
    ) -> Result<ProjectView, RepositoryError> {
        validate_project_input(title, description)?;

        let result = sqlx::query("UPDATE projects SET title = ?, description = ? WHERE id = ? AND owner_id = ?")
            .bind(title)
            .bind(description)
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Denied("Project"));
        }

        self.get(project_id, user_id)
            .await?
            .ok_or(RepositoryError::Denied("Project"))
    }

    /// Delete a project (tasks cascade). Returns whether a row matched the
    /// ownership predicate; "nothing to delete" is not an error.
    pub async fn delete(&self, project_id: i64, user_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND owner_id = ?")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn validate_project_input(title: &str, description: Option<&str>) -> Result<(), RepositoryError> {
    let mut errors = Vec::new();

    let title_len = title.chars().count();
    if title_len < TITLE_MIN || title_len > TITLE_MAX {
        errors.push(format!(
            "Title must be between {} and {} characters",
            TITLE_MIN, TITLE_MAX
        ));
    }

    if let Some(description) = description {
        if description.chars().count() > DESCRIPTION_MAX {
            errors.push(format!(
                "Description must be at most {} characters",
                DESCRIPTION_MAX
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RepositoryError::Validation(errors.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_pool, seed_user};

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let pool = memory_pool().await;
        let owner = seed_user(&pool, "Ada", "Lovelace", "ada@example.com").await;
        let repo = ProjectRepository::new(pool);

        let created = repo.create("Demo", Some("x"), owner.id).await.expect("create");
        assert_eq!(created.title, "Demo");
        assert_eq!(created.description.as_deref(), Some("x"));
        assert_eq!(created.owner_id, owner.id);
        assert_eq!(created.owner_name, "Ada Lovelace");
        assert_eq!(created.task_count, 0);

        let fetched = repo.get(created.id, owner.id).await.expect("get").expect("some");
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.description, created.description);
        assert_eq!(fetched.owner_id, created.owner_id);
    }

    #[tokio::test]
    async fn list_returns_only_owned_projects_in_creation_order() {
        let pool = memory_pool().await;
        let alice = seed_user(&pool, "Alice", "One", "alice@example.com").await;
        let bob = seed_user(&pool, "Bob", "Two", "bob@example.com").await;
        let repo = ProjectRepository::new(pool);

        let first = repo.create("Alpha project", None, alice.id).await.expect("create");
        let second = repo.create("Beta project", None, alice.id).await.expect("create");
        repo.create("Bob's project", None, bob.id).await.expect("create");

        let listed = repo.list(alice.id).await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn foreign_project_is_indistinguishable_from_missing() {
        let pool = memory_pool().await;
        let alice = seed_user(&pool, "Alice", "One", "alice@example.com").await;
        let bob = seed_user(&pool, "Bob", "Two", "bob@example.com").await;
        let repo = ProjectRepository::new(pool);

        let project = repo.create("Alice's plans", None, alice.id).await.expect("create");

        assert!(repo.get(project.id, bob.id).await.expect("get").is_none());
        assert!(repo.get(9999, bob.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn update_by_non_owner_is_denied_and_mutates_nothing() {
        let pool = memory_pool().await;
        let alice = seed_user(&pool, "Alice", "One", "alice@example.com").await;
        let bob = seed_user(&pool, "Bob", "Two", "bob@example.com").await;
        let repo = ProjectRepository::new(pool);

        let project = repo.create("Original title", None, alice.id).await.expect("create");

        let denied = repo.update(project.id, "Hijacked", None, bob.id).await;
        assert!(matches!(denied, Err(RepositoryError::Denied("Project"))));

        let unchanged = repo.get(project.id, alice.id).await.expect("get").expect("some");
        assert_eq!(unchanged.title, "Original title");
    }

    #[tokio::test]
    async fn update_by_owner_changes_fields() {
        let pool = memory_pool().await;
        let alice = seed_user(&pool, "Alice", "One", "alice@example.com").await;
        let repo = ProjectRepository::new(pool);

        let project = repo.create("Before", Some("old"), alice.id).await.expect("create");
        let updated = repo
            .update(project.id, "After rename", Some("new"), alice.id)
            .await
            .expect("update");

        assert_eq!(updated.id, project.id);
        assert_eq!(updated.title, "After rename");
        assert_eq!(updated.description.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let pool = memory_pool().await;
        let alice = seed_user(&pool, "Alice", "One", "alice@example.com").await;
        let bob = seed_user(&pool, "Bob", "Two", "bob@example.com").await;
        let repo = ProjectRepository::new(pool);

        let project = repo.create("Ephemeral", None, alice.id).await.expect("create");

        // Non-owner delete matches nothing and leaves the row in place
        assert!(!repo.delete(project.id, bob.id).await.expect("delete"));
        assert!(repo.get(project.id, alice.id).await.expect("get").is_some());

        assert!(repo.delete(project.id, alice.id).await.expect("delete"));
        assert!(!repo.delete(project.id, alice.id).await.expect("delete"));
    }

    #[tokio::test]
    async fn title_length_boundaries() {
        let pool = memory_pool().await;
        let alice = seed_user(&pool, "Alice", "One", "alice@example.com").await;
        let repo = ProjectRepository::new(pool);

        let too_short = repo.create(&"a".repeat(2), None, alice.id).await;
        assert!(matches!(too_short, Err(RepositoryError::Validation(_))));

        assert!(repo.create(&"a".repeat(3), None, alice.id).await.is_ok());
        assert!(repo.create(&"a".repeat(100), None, alice.id).await.is_ok());

        let too_long = repo.create(&"a".repeat(101), None, alice.id).await;
        assert!(matches!(too_long, Err(RepositoryError::Validation(_))));

        let description_too_long = repo
            .create("Fine title", Some(&"d".repeat(501)), alice.id)
            .await;
        assert!(matches!(description_too_long, Err(RepositoryError::Validation(_))));
    }
}
