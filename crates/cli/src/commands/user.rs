//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! teahouse user create -u leaf_lover -e leaf@example.com -p 'correct horse'
//! ```

use tracing::info;

use teahouse_core::UserId;
use teahouse_server::config::ServerConfig;
use teahouse_server::db;
use teahouse_server::services::auth::AuthService;

/// Create a user directly in the database.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if configuration is missing, the input is invalid,
/// the username or email is taken, or the database is unreachable.
pub async fn create(
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    let mut tx = pool.begin().await?;
    let user = AuthService::new(&mut tx)
        .register(username, email, password)
        .await?;
    tx.commit().await?;

    info!(
        "User created successfully! ID: {}, Username: {}, Email: {}",
        user.id, user.username, user.email
    );

    Ok(user.id)
}
