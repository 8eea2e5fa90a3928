//! Session middleware configuration.
//!
//! Sessions are backed by `PostgreSQL` via tower-sessions. The session
//! table lives in the `tower_sessions` schema and is created by
//! `teahouse seed` (or [`create_session_store`] with `migrate = true`).

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "teahouse_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Build the `PostgreSQL` session store, optionally creating its table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the migration fails.
pub async fn create_session_store(
    pool: &PgPool,
    migrate: bool,
) -> Result<PostgresStore, sqlx::Error> {
    let store = PostgresStore::new(pool.clone());
    if migrate {
        store.migrate().await?;
    }
    Ok(store)
}

/// Create the session layer around any store.
///
/// Cookies are marked `Secure` when the public base URL is HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &ServerConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
