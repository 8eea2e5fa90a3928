//! Authentication extractors.
//!
//! The session stores only the logged-in user's ID. Each extraction reloads
//! the user row, so a user deleted mid-session is treated as logged out.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use teahouse_core::UserId;

use crate::db::{RepositoryError, UserRepository};
use crate::error::AppError;
use crate::models::{User, session_keys};
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 before the handler runs when there is no session, the
/// session holds no user, or that user no longer exists.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        load_current_user(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this does not reject anonymous requests.
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(load_current_user(parts, state).await?))
    }
}

async fn load_current_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Ok(None);
    };

    // An unreadable session value counts as anonymous
    let Some(user_id) = session
        .get::<UserId>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return Ok(None);
    };

    let mut conn = state
        .pool()
        .acquire()
        .await
        .map_err(RepositoryError::from)?;
    let user = UserRepository::new(&mut conn).get_by_id(user_id).await?;

    if user.is_none() {
        tracing::debug!(user_id = %user_id, "Session references a deleted user");
    }

    Ok(user)
}

/// Helper to record the logged-in user in the session.
///
/// The session ID is cycled first so a pre-login ID can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user_id: UserId,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user_id).await
}

/// Helper to clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
