//! Test helpers: a fresh in-memory database per test, plus user seeding.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::database::models::User;
use crate::database::UserRepository;

/// In-memory SQLite pool with the schema applied. Capped at one connection
/// so every query sees the same memory database.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory options")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory pool");

    crate::database::migrate(&pool).await.expect("migrate");
    pool
}

/// Insert a user directly; the digest is irrelevant for repository tests.
pub async fn seed_user(pool: &SqlitePool, first_name: &str, last_name: &str, email: &str) -> User {
    UserRepository::new(pool.clone())
        .insert(first_name, last_name, email, "test-digest")
        .await
        .expect("seed user")
}
