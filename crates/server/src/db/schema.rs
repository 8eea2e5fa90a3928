//! Table definitions.
//!
//! There is no migration history: `drop_all` followed by `create_all` is
//! the only way the schema changes. Both run inside whatever connection or
//! transaction the caller passes in.

use sqlx::PgConnection;

/// `CREATE` statements in dependency order.
pub const CREATE_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id            SERIAL PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS teas (
        id       SERIAL PRIMARY KEY,
        name     TEXT NOT NULL UNIQUE,
        in_stock BOOLEAN NOT NULL,
        rating   INTEGER NOT NULL,
        user_id  INTEGER NOT NULL REFERENCES users (id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS teas_user_id_idx ON teas (user_id)",
    r"
    CREATE TABLE IF NOT EXISTS comments (
        id      SERIAL PRIMARY KEY,
        content TEXT NOT NULL,
        tea_id  INTEGER NOT NULL REFERENCES teas (id) ON DELETE CASCADE
    )
    ",
    "CREATE INDEX IF NOT EXISTS comments_tea_id_idx ON comments (tea_id)",
];

/// `DROP` statements in reverse dependency order.
///
/// Sessions are dropped too. They store user IDs, and `SERIAL` IDs restart
/// after a reset.
pub const DROP_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS tower_sessions.session",
    "DROP TABLE IF EXISTS comments",
    "DROP TABLE IF EXISTS teas",
    "DROP TABLE IF EXISTS users",
];

/// Create every application table that does not exist yet.
///
/// # Errors
///
/// Returns `sqlx::Error` if any statement fails.
pub async fn create_all(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    tracing::debug!(tables = 3, "Schema created");
    Ok(())
}

/// Drop every application table and the session table, discarding all rows.
///
/// # Errors
///
/// Returns `sqlx::Error` if any statement fails.
pub async fn drop_all(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    for statement in DROP_STATEMENTS {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    tracing::debug!(tables = DROP_STATEMENTS.len(), "Schema dropped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(statements: &[&str], needle: &str) -> usize {
        statements
            .iter()
            .position(|s| s.contains(needle))
            .unwrap_or(usize::MAX)
    }

    #[test]
    fn test_tables_created_before_their_dependents() {
        let users = position(CREATE_STATEMENTS, "TABLE IF NOT EXISTS users");
        let teas = position(CREATE_STATEMENTS, "TABLE IF NOT EXISTS teas");
        let comments = position(CREATE_STATEMENTS, "TABLE IF NOT EXISTS comments");
        assert!(users < teas && teas < comments);
    }

    #[test]
    fn test_tables_dropped_before_their_parents() {
        let users = position(DROP_STATEMENTS, "users");
        let teas = position(DROP_STATEMENTS, "teas");
        let comments = position(DROP_STATEMENTS, "comments");
        assert!(comments < teas && teas < users);
    }

    #[test]
    fn test_sessions_dropped_with_users() {
        let sessions = position(DROP_STATEMENTS, "tower_sessions.session");
        let users = position(DROP_STATEMENTS, "users");
        assert!(sessions < users);
    }

    #[test]
    fn test_comments_cascade_with_their_tea() {
        let comments = CREATE_STATEMENTS
            .iter()
            .find(|s| s.contains("TABLE IF NOT EXISTS comments"))
            .copied()
            .unwrap_or_default();
        assert!(comments.contains("ON DELETE CASCADE"));
    }
}
