//! SQLite user directory.
//!
//! Implements `UserDirectory` from `mimic-core` over the `users` table. Names
//! are matched case-insensitively: an exact match wins, otherwise every name
//! starting with the query is returned.

use chrono::Utc;
use mimic_core::directory::{Reconciled, UserDirectory};
use mimic_types::chat::UserRecord;
use mimic_types::error::DirectoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserDirectory`.
#[derive(Clone)]
pub struct SqliteUserDirectory {
    pool: DatabasePool,
}

impl SqliteUserDirectory {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// All known users ordered by name.
    pub async fn list(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let rows = sqlx::query("SELECT id, name FROM users ORDER BY name COLLATE NOCASE, id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;
        rows.iter().map(user_from_row).collect()
    }
}

fn query_error(e: sqlx::Error) -> DirectoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            DirectoryError::Unavailable(e.to_string())
        }
        other => DirectoryError::Query(other.to_string()),
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserRecord, DirectoryError> {
    let id: String = row.try_get("id").map_err(query_error)?;
    let name: String = row.try_get("name").map_err(query_error)?;
    Ok(UserRecord::new(id, name))
}

impl UserDirectory for SqliteUserDirectory {
    async fn find_by_name(&self, name: &str) -> Result<Vec<UserRecord>, DirectoryError> {
        let needle = name.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let exact = sqlx::query("SELECT id, name FROM users WHERE lower(name) = lower(?) ORDER BY id")
            .bind(needle)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;
        if !exact.is_empty() {
            return exact.iter().map(user_from_row).collect();
        }

        let prefix = sqlx::query(
            "SELECT id, name FROM users WHERE lower(substr(name, 1, length(?))) = lower(?) ORDER BY name COLLATE NOCASE, id",
        )
        .bind(needle)
        .bind(needle)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;
        prefix.iter().map(user_from_row).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let row = sqlx::query("SELECT id, name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn reconcile(&self, user: &UserRecord) -> Result<Reconciled, DirectoryError> {
        let previous: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE id = ?")
            .bind(&user.id)
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(query_error)?;

        let now = Utc::now().to_rfc3339();
        match previous {
            Some(name) if name == user.name => Ok(Reconciled::Unchanged),
            Some(name) => {
                sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
                    .bind(&user.name)
                    .bind(&now)
                    .bind(&user.id)
                    .execute(&self.pool.writer)
                    .await
                    .map_err(query_error)?;
                Ok(Reconciled::Renamed { previous: name })
            }
            None => {
                sqlx::query(
                    "INSERT INTO users (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
                )
                .bind(&user.id)
                .bind(&user.name)
                .bind(&now)
                .bind(&now)
                .execute(&self.pool.writer)
                .await
                .map_err(query_error)?;
                Ok(Reconciled::Created)
            }
        }
    }
}
