//! Database operations for the Teahouse `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts that own teas
//! - `teas` - Tea catalogue, one owner per row, unique names
//! - `comments` - Free-form comments, each attached to one tea
//! - `tower_sessions.session` - Session storage (managed by tower-sessions)
//!
//! # Sessions
//!
//! Repositories borrow a single `PgConnection`. Handlers hand them either a
//! pooled connection (reads) or an open transaction (writes); both return
//! to the pool when the handler's scope ends, and an uncommitted
//! transaction rolls back on drop.
//!
//! # Schema
//!
//! The schema is created by the `teahouse seed` command, see [`schema`].

pub mod comments;
pub mod schema;
pub mod teas;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use comments::CommentRepository;
pub use teas::TeaRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique tea name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Translate a unique-constraint violation into `Conflict`, passing
    /// every other error through as `Database`.
    pub(crate) fn from_unique_violation(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }

    /// Translate a foreign-key violation (missing parent row) into
    /// `NotFound`, passing every other error through as `Database`.
    pub(crate) fn from_foreign_key_violation(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_foreign_key_violation()
        {
            return Self::NotFound;
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options().connect(database_url.expose_secret()).await
}

/// Create a pool that only connects on first use.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options().connect_lazy(database_url.expose_secret())
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = RepositoryError::from_unique_violation(sqlx::Error::RowNotFound, "tea name");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_non_database_errors_are_not_missing_parents() {
        let err = RepositoryError::from_foreign_key_violation(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_conflict_message() {
        let err = RepositoryError::Conflict("tea name already exists".to_string());
        assert_eq!(err.to_string(), "constraint violation: tea name already exists");
    }

    #[tokio::test]
    async fn test_lazy_pool_does_not_connect() {
        let url = SecretString::from("postgres://nobody@127.0.0.1:1/teahouse");
        assert!(create_lazy_pool(&url).is_ok());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_pool_acquires_connection() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required");
        let pool = create_pool(&SecretString::from(url))
            .await
            .expect("pool creation failed");

        let (one,): (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(one, 1);
    }
}
