//! Tea route handlers.
//!
//! Reads run on a pooled connection; writes run in a transaction that
//! commits only once the response is fully built. Mutations require the
//! caller to own the tea.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use teahouse_core::TeaId;

use crate::db::TeaRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{MessageResponse, TeaMutation, TeaPatch, TeaResponse, UserResponse};
use crate::state::AppState;

/// List every tea with its owner and comments.
///
/// # Errors
///
/// Returns an error if the database query fails.
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TeaResponse>>> {
    let mut conn = state.pool().acquire().await?;
    let mut repo = TeaRepository::new(&mut conn);

    let teas = repo.list().await?;
    let teas = repo.with_relations(teas).await?;

    Ok(Json(teas))
}

/// Show one tea.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no tea has this ID.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<TeaId>,
) -> Result<Json<TeaResponse>> {
    let mut conn = state.pool().acquire().await?;

    let tea = TeaRepository::new(&mut conn)
        .get_with_relations(id)
        .await?
        .ok_or(AppError::NotFound("Tea"))?;

    Ok(Json(tea))
}

/// Create a tea owned by the caller.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` without a logged-in user, and a 409
/// conflict if the name is already taken.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(payload): Json<TeaMutation>,
) -> Result<Json<TeaResponse>> {
    let mut tx = state.pool().begin().await?;

    let tea = TeaRepository::new(&mut tx).create(&payload, user.id).await?;
    tx.commit().await?;

    tracing::info!(tea_id = %tea.id, name = %tea.name, "Tea created");

    Ok(Json(TeaResponse::new(tea, UserResponse::from(user), Vec::new())))
}

/// Apply a partial update to a tea the caller owns.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the tea doesn't exist and
/// `AppError::Forbidden` if the caller isn't its owner.
#[instrument(skip(state, user, patch), fields(user_id = %user.id))]
pub async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<TeaId>,
    Json(patch): Json<TeaPatch>,
) -> Result<Json<TeaResponse>> {
    let mut tx = state.pool().begin().await?;
    let mut repo = TeaRepository::new(&mut tx);

    let mut tea = repo.get_for_update(id).await?.ok_or(AppError::NotFound("Tea"))?;
    if !tea.is_owned_by(user.id) {
        return Err(AppError::Forbidden);
    }

    if !patch.is_empty() {
        patch.apply(&mut tea);
        tea = repo.update(&tea).await?;
    }

    let response = repo
        .with_relations(vec![tea])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(format!("tea {id} vanished during update")))?;
    tx.commit().await?;

    tracing::info!(tea_id = %id, "Tea updated");

    Ok(Json(response))
}

/// Delete a tea the caller owns, along with its comments.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the tea doesn't exist and
/// `AppError::Forbidden` if the caller isn't its owner.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<TeaId>,
) -> Result<Json<MessageResponse>> {
    let mut tx = state.pool().begin().await?;
    let mut repo = TeaRepository::new(&mut tx);

    let tea = repo.get_for_update(id).await?.ok_or(AppError::NotFound("Tea"))?;
    if !tea.is_owned_by(user.id) {
        return Err(AppError::Forbidden);
    }

    repo.delete(id).await?;
    tx.commit().await?;

    tracing::info!(tea_id = %id, "Tea deleted");

    Ok(Json(MessageResponse::new(format!(
        "Tea with ID {id} has been deleted"
    ))))
}
