//! Account route handlers: register, login, logout, me.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{OptionalUser, RequireUser, clear_current_user, set_current_user};
use crate::models::{MessageResponse, UserResponse};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Create an account. Does not log the new user in.
///
/// # Errors
///
/// Returns 400 for an invalid username, email or password and 409 if the
/// username or email is taken.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    let mut tx = state.pool().begin().await?;

    let user = AuthService::new(&mut tx)
        .register(&form.username, &form.email, &form.password)
        .await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(UserResponse::from(user)))
}

/// Log in and remember the user in the session.
///
/// # Errors
///
/// Returns 401 for an unknown username or wrong password.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let mut conn = state.pool().acquire().await?;

    let user = AuthService::new(&mut conn)
        .login(&form.username, &form.password)
        .await?;

    set_current_user(&session, user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(UserResponse::from(user)))
}

/// Forget the session's user. Succeeds for anonymous callers too.
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip_all)]
pub async fn logout(
    OptionalUser(user): OptionalUser,
    session: Session,
) -> Result<Json<MessageResponse>> {
    clear_current_user(&session).await?;

    if let Some(user) = user {
        tracing::info!(user_id = %user.id, "User logged out");
    }

    Ok(Json(MessageResponse::new("Logged out")))
}

/// The logged-in user.
///
/// # Errors
///
/// Returns 401 without a logged-in user.
#[instrument(skip_all)]
pub async fn me(RequireUser(user): RequireUser) -> Result<Json<UserResponse>> {
    Ok(Json(UserResponse::from(user)))
}
