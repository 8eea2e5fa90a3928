//! Tea repository for database operations.
//!
//! Tea responses nest the owner and the comments. Lists are assembled from
//! three queries (teas, their owners, their comments) regardless of size.

use std::collections::HashMap;

use sqlx::PgConnection;

use teahouse_core::{TeaId, UserId};

use super::{CommentRepository, RepositoryError, UserRepository};
use crate::models::{Comment, Tea, TeaMutation, TeaResponse, UserResponse};

const TEA_COLUMNS: &str = "id, name, in_stock, rating, user_id";

/// Repository for tea database operations.
pub struct TeaRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> TeaRepository<'c> {
    /// Create a new tea repository on a borrowed connection.
    #[must_use]
    pub const fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Every tea, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&mut self) -> Result<Vec<Tea>, RepositoryError> {
        let teas = sqlx::query_as::<_, Tea>(&format!("SELECT {TEA_COLUMNS} FROM teas"))
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(teas)
    }

    /// Get a tea by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: TeaId) -> Result<Option<Tea>, RepositoryError> {
        let tea = sqlx::query_as::<_, Tea>(&format!("SELECT {TEA_COLUMNS} FROM teas WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(tea)
    }

    /// Get a tea by ID and lock its row until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_update(&mut self, id: TeaId) -> Result<Option<Tea>, RepositoryError> {
        let tea = sqlx::query_as::<_, Tea>(&format!(
            "SELECT {TEA_COLUMNS} FROM teas WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(tea)
    }

    /// Whether a tea with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&mut self, id: TeaId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM teas WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(exists)
    }

    /// Insert a tea owned by `owner`.
    ///
    /// The unique name is enforced by the database, not checked beforehand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &mut self,
        payload: &TeaMutation,
        owner: UserId,
    ) -> Result<Tea, RepositoryError> {
        sqlx::query_as::<_, Tea>(&format!(
            "INSERT INTO teas (name, in_stock, rating, user_id) VALUES ($1, $2, $3, $4) \
             RETURNING {TEA_COLUMNS}"
        ))
        .bind(&payload.name)
        .bind(payload.in_stock)
        .bind(payload.rating)
        .bind(owner)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "tea name"))
    }

    /// Write back the mutable columns of `tea`. The owner is never written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tea no longer exists.
    /// Returns `RepositoryError::Conflict` if the new name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&mut self, tea: &Tea) -> Result<Tea, RepositoryError> {
        sqlx::query_as::<_, Tea>(&format!(
            "UPDATE teas SET name = $1, in_stock = $2, rating = $3 WHERE id = $4 \
             RETURNING {TEA_COLUMNS}"
        ))
        .bind(&tea.name)
        .bind(tea.in_stock)
        .bind(tea.rating)
        .bind(tea.id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "tea name"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a tea. Its comments go with it (`ON DELETE CASCADE`).
    ///
    /// # Returns
    ///
    /// Returns `true` if the tea was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&mut self, id: TeaId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM teas WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach owner and comments to each tea, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a tea's owner is missing.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn with_relations(
        &mut self,
        teas: Vec<Tea>,
    ) -> Result<Vec<TeaResponse>, RepositoryError> {
        let mut owner_ids: Vec<UserId> = teas.iter().map(|t| t.user_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();
        let tea_ids: Vec<TeaId> = teas.iter().map(|t| t.id).collect();

        let owners = UserRepository::new(&mut *self.conn)
            .get_many(&owner_ids)
            .await?;
        let comments = CommentRepository::new(&mut *self.conn)
            .list_for_teas(&tea_ids)
            .await?;

        assemble(teas, owners.into_iter().map(UserResponse::from), comments)
    }

    /// Load one tea with its owner and comments.
    ///
    /// # Errors
    ///
    /// Same as [`Self::with_relations`].
    pub async fn get_with_relations(
        &mut self,
        id: TeaId,
    ) -> Result<Option<TeaResponse>, RepositoryError> {
        let Some(tea) = self.get(id).await? else {
            return Ok(None);
        };

        Ok(self.with_relations(vec![tea]).await?.into_iter().next())
    }
}

/// Join teas with their owners and comments in memory.
fn assemble(
    teas: Vec<Tea>,
    owners: impl IntoIterator<Item = UserResponse>,
    comments: Vec<Comment>,
) -> Result<Vec<TeaResponse>, RepositoryError> {
    let owners: HashMap<UserId, UserResponse> = owners.into_iter().map(|u| (u.id, u)).collect();

    let mut by_tea: HashMap<TeaId, Vec<Comment>> = HashMap::new();
    for comment in comments {
        by_tea.entry(comment.tea_id).or_default().push(comment);
    }

    teas.into_iter()
        .map(|tea| {
            let owner = owners.get(&tea.user_id).cloned().ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "tea {} references missing user {}",
                    tea.id, tea.user_id
                ))
            })?;
            let comments = by_tea.remove(&tea.id).unwrap_or_default();
            Ok(TeaResponse::new(tea, owner, comments))
        })
        .collect()
}
