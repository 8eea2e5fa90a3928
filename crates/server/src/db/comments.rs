//! Comment repository for database operations.

use sqlx::PgConnection;

use teahouse_core::{CommentId, TeaId};

use super::RepositoryError;
use crate::models::{Comment, CommentCreate};

/// Repository for comment database operations.
pub struct CommentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CommentRepository<'c> {
    /// Create a new comment repository on a borrowed connection.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// All comments on one tea, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_tea(&mut self, tea_id: TeaId) -> Result<Vec<Comment>, RepositoryError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, tea_id FROM comments WHERE tea_id = $1",
        )
        .bind(tea_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(comments)
    }

    /// All comments on any of `tea_ids`, for assembling tea lists in one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_teas(
        &mut self,
        tea_ids: &[TeaId],
    ) -> Result<Vec<Comment>, RepositoryError> {
        if tea_ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = tea_ids.iter().map(TeaId::as_i32).collect();
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, tea_id FROM comments WHERE tea_id = ANY($1)",
        )
        .bind(raw)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(comments)
    }

    /// Get a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let comment =
            sqlx::query_as::<_, Comment>("SELECT id, content, tea_id FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.conn)
                .await?;

        Ok(comment)
    }

    /// Get a comment by ID and lock its row until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_update(
        &mut self,
        id: CommentId,
    ) -> Result<Option<Comment>, RepositoryError> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, content, tea_id FROM comments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(comment)
    }

    /// Insert a comment on `tea_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no tea has `tea_id`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &mut self,
        tea_id: TeaId,
        payload: &CommentCreate,
    ) -> Result<Comment, RepositoryError> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (content, tea_id) VALUES ($1, $2) \
             RETURNING id, content, tea_id",
        )
        .bind(&payload.content)
        .bind(tea_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(RepositoryError::from_foreign_key_violation)
    }

    /// Write back every mutable column of `comment`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the comment no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&mut self, comment: &Comment) -> Result<Comment, RepositoryError> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $1 WHERE id = $2 RETURNING id, content, tea_id",
        )
        .bind(&comment.content)
        .bind(comment.id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a comment.
    ///
    /// # Returns
    ///
    /// Returns `true` if the comment was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&mut self, id: CommentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
