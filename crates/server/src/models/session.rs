//! Session-related types.
//!
//! Only the user's ID lives in the session; the user row is reloaded on
//! every authenticated request so deleted users lose access immediately.

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the logged-in user's ID.
    pub const CURRENT_USER: &str = "current_user";
}
