//! PostgreSQL user repository implementation.

use crate::{traits::UserRepository, DatabasePool};
use async_trait::async_trait;
use sqlx::FromRow;
use std::sync::Arc;
use tessera_core::{TesseraError, TesseraResult, User};
use tracing::debug;

/// PostgreSQL user repository over the `users` table.
#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: Arc<DatabasePool>,
}

impl PgUserRepository {
    /// Creates a new PostgreSQL user repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(row.id, row.name, row.email)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> TesseraResult<Vec<User>> {
        debug!("Finding all users");

        let rows = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> TesseraResult<User> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::from)
            .ok_or_else(|| TesseraError::not_found("User", id))
    }

    async fn insert(&self, name: &str, email: &str) -> TesseraResult<User> {
        debug!("Inserting user: {}", email);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(name)
        .bind(email)
        .fetch_one(self.pool.inner())
        .await
        .map_err(|e| match TesseraError::from(e) {
            TesseraError::Conflict(_) => {
                TesseraError::conflict(format!("Email already registered: {}", email))
            }
            other => other,
        })?;

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: i64) -> TesseraResult<()> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;

        if result.rows_affected() == 0 {
            return Err(TesseraError::not_found("User", id));
        }
        Ok(())
    }
}
