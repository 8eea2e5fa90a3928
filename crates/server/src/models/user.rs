//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teahouse_core::{Email, UserId, Username};

/// A registered user (domain type).
///
/// Owns zero or more teas. The password hash never leaves the server;
/// serialize a [`UserResponse`] instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact email.
    pub email: Email,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, nested inside tea responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
