//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness check
//! GET    /health/ready          - Readiness check (database)
//!
//! # Teas (mutations require the owner)
//! GET    /teas                  - All teas with owner and comments
//! POST   /teas                  - Create a tea
//! GET    /teas/{id}             - One tea
//! PUT    /teas/{id}             - Partial update
//! DELETE /teas/{id}             - Delete tea and its comments
//!
//! # Comments
//! GET    /teas/{id}/comments    - Comments on a tea
//! POST   /teas/{id}/comments    - Add a comment
//! GET    /comments/{id}         - One comment
//! PUT    /comments/{id}         - Partial update
//! DELETE /comments/{id}         - Delete
//!
//! # Auth
//! POST   /auth/register         - Create an account
//! POST   /auth/login            - Start a session
//! POST   /auth/logout           - End the session
//! GET    /auth/me               - Current user
//! ```

pub mod auth;
pub mod comments;
pub mod teas;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the tea routes router, including comments nested under a tea.
pub fn tea_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(teas::list).post(teas::create))
        .route(
            "/{id}",
            get(teas::show).put(teas::update).delete(teas::delete),
        )
        .route(
            "/{id}/comments",
            get(comments::list_for_tea).post(comments::create),
        )
}

/// Create the comment routes router.
pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(comments::show)
            .put(comments::update)
            .delete(comments::delete),
    )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
