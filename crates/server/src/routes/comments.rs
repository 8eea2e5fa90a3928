//! Comment route handlers.
//!
//! Comments are open to everyone: none of these handlers look at the
//! session.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use teahouse_core::{CommentId, TeaId};

use crate::db::{CommentRepository, RepositoryError, TeaRepository};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentCreate, CommentPatch, MessageResponse};
use crate::state::AppState;

/// List the comments on one tea.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the tea doesn't exist.
#[instrument(skip(state))]
pub async fn list_for_tea(
    State(state): State<AppState>,
    Path(tea_id): Path<TeaId>,
) -> Result<Json<Vec<Comment>>> {
    let mut conn = state.pool().acquire().await?;

    if !TeaRepository::new(&mut conn).exists(tea_id).await? {
        return Err(AppError::NotFound("Tea"));
    }

    let comments = CommentRepository::new(&mut conn).list_for_tea(tea_id).await?;

    Ok(Json(comments))
}

/// Show one comment.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no comment has this ID.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> Result<Json<Comment>> {
    let mut conn = state.pool().acquire().await?;

    let comment = CommentRepository::new(&mut conn)
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;

    Ok(Json(comment))
}

/// Add a comment to a tea.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the tea doesn't exist.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    Path(tea_id): Path<TeaId>,
    Json(payload): Json<CommentCreate>,
) -> Result<Json<Comment>> {
    let mut tx = state.pool().begin().await?;

    // Lock the tea so it can't be deleted before the insert commits
    TeaRepository::new(&mut tx)
        .get_for_update(tea_id)
        .await?
        .ok_or(AppError::NotFound("Tea"))?;

    let comment = CommentRepository::new(&mut tx)
        .create(tea_id, &payload)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Tea"),
            other => AppError::Database(other),
        })?;
    tx.commit().await?;

    tracing::info!(comment_id = %comment.id, "Comment created");

    Ok(Json(comment))
}

/// Apply a partial update to a comment.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no comment has this ID.
#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
    Json(patch): Json<CommentPatch>,
) -> Result<Json<Comment>> {
    let mut tx = state.pool().begin().await?;
    let mut repo = CommentRepository::new(&mut tx);

    let mut comment = repo
        .get_for_update(id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;

    patch.apply(&mut comment);
    let comment = repo.update(&comment).await?;
    tx.commit().await?;

    Ok(Json(comment))
}

/// Delete a comment.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no comment has this ID.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> Result<Json<MessageResponse>> {
    let mut tx = state.pool().begin().await?;

    if !CommentRepository::new(&mut tx).delete(id).await? {
        return Err(AppError::NotFound("Comment"));
    }
    tx.commit().await?;

    tracing::info!(comment_id = %id, "Comment deleted");

    Ok(Json(MessageResponse::new(format!(
        "Comment with ID {id} has been deleted"
    ))))
}
