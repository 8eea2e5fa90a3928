//! Domain models and request/response schemas.
//!
//! Domain types (`Tea`, `Comment`, `User`) are what repositories return.
//! Request payloads (`TeaMutation`, `TeaPatch`, ...) mirror them with the
//! fields a client may supply; patches make every field optional.

pub mod comment;
pub mod session;
pub mod tea;
pub mod user;

pub use comment::{Comment, CommentCreate, CommentPatch};
pub use session::keys as session_keys;
pub use tea::{Tea, TeaMutation, TeaPatch, TeaResponse};
pub use user::{User, UserResponse};

use serde::{Deserialize, Serialize};

/// Confirmation body returned by delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
