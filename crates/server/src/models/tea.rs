//! Tea domain types and request schemas.

use serde::{Deserialize, Serialize};

use teahouse_core::{TeaId, UserId};

use super::comment::Comment;
use super::user::UserResponse;

/// A tea row (domain type).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Tea {
    pub id: TeaId,
    /// Unique across all teas.
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
    /// Creator; set on insert and never reassigned.
    pub user_id: UserId,
}

impl Tea {
    /// Whether `user_id` may update or delete this tea.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

/// Payload for creating a tea. The owner comes from the session, never the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeaMutation {
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
}

/// Payload for updating a tea.
///
/// Fields left out of the request body keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
}

impl TeaPatch {
    /// Overwrite the fields of `tea` that this patch carries.
    pub fn apply(self, tea: &mut Tea) {
        if let Some(name) = self.name {
            tea.name = name;
        }
        if let Some(in_stock) = self.in_stock {
            tea.in_stock = in_stock;
        }
        if let Some(rating) = self.rating {
            tea.rating = rating;
        }
    }

    /// True when the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.in_stock.is_none() && self.rating.is_none()
    }
}

/// A tea as returned by the API, with its owner and comments nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeaResponse {
    pub id: TeaId,
    pub name: String,
    pub in_stock: bool,
    pub rating: i32,
    pub user: UserResponse,
    pub comments: Vec<Comment>,
}

impl TeaResponse {
    #[must_use]
    pub fn new(tea: Tea, user: UserResponse, comments: Vec<Comment>) -> Self {
        Self {
            id: tea.id,
            name: tea.name,
            in_stock: tea.in_stock,
            rating: tea.rating,
            user,
            comments,
        }
    }
}
