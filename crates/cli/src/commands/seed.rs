//! Recreate the schema and load fixture data.
//!
//! # Usage
//!
//! ```bash
//! # Load the bundled fixtures
//! teahouse seed
//!
//! # Load a custom fixture file
//! teahouse seed --file fixtures/demo.yaml
//! ```
//!
//! All existing data is dropped first. Users, teas and comments are then
//! inserted in three separate transactions, in that order. If a later group
//! fails, the groups before it stay committed.

use std::collections::HashMap;
use std::path::Path;

use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info};

use teahouse_core::{Email, EmailError, TeaId, UserId, Username, UsernameError};
use teahouse_server::config::{ConfigError, ServerConfig};
use teahouse_server::db::{self, CommentRepository, RepositoryError, TeaRepository, UserRepository};
use teahouse_server::middleware::create_session_store;
use teahouse_server::models::{CommentCreate, TeaMutation};
use teahouse_server::services::auth::{AuthError, hash_password};

use crate::fixtures::{CommentFixture, Fixtures, TeaFixture, UserFixture};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fixture YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} fixture validation errors found")]
    Invalid(usize),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Username(#[from] UsernameError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("Fixture references unknown {0}")]
    UnknownReference(String),
}

/// Drop, recreate and populate the database.
///
/// # Errors
///
/// Returns an error if configuration is missing, the fixtures are invalid
/// or any database step fails. Groups committed before a failure remain.
pub async fn run(file: Option<&Path>) -> Result<(), SeedError> {
    let config = ServerConfig::from_env()?;

    let fixtures = load_fixtures(file).await?;

    let errors = fixtures.validate();
    if !errors.is_empty() {
        error!("Fixture validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to database");

    let summary = seed(&pool, &fixtures).await?;

    info!(
        users = summary.users,
        teas = summary.teas,
        comments = summary.comments,
        "Database seeding complete!"
    );
    Ok(())
}

/// Rows inserted by [`seed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub teas: usize,
    pub comments: usize,
}

/// Reset the schema and insert `fixtures`, one transaction per group.
///
/// # Errors
///
/// Returns the first failing step. Groups committed before it remain.
pub async fn seed(pool: &PgPool, fixtures: &Fixtures) -> Result<SeedSummary, SeedError> {
    info!("Recreating database...");
    reset_schema(pool).await?;

    info!("Seeding database...");
    let users = insert_users(pool, &fixtures.users).await?;
    info!(count = users.len(), "Users committed");

    let teas = insert_teas(pool, &fixtures.teas, &users).await?;
    info!(count = teas.len(), "Teas committed");

    let comments = insert_comments(pool, &fixtures.comments, &teas).await?;
    info!(count = comments, "Comments committed");

    Ok(SeedSummary {
        users: users.len(),
        teas: teas.len(),
        comments,
    })
}

async fn load_fixtures(file: Option<&Path>) -> Result<Fixtures, SeedError> {
    let Some(path) = file else {
        info!("Loading bundled fixtures");
        return Ok(Fixtures::from_yaml(crate::fixtures::BUNDLED)?);
    };

    info!(path = %path.display(), "Loading fixtures from file");
    let content = tokio::fs::read_to_string(path).await?;
    Ok(Fixtures::from_yaml(&content)?)
}

/// Drop every table including sessions, then recreate them.
async fn reset_schema(pool: &PgPool) -> Result<(), SeedError> {
    let mut tx = pool.begin().await?;
    db::schema::drop_all(&mut tx).await?;
    db::schema::create_all(&mut tx).await?;
    tx.commit().await?;

    create_session_store(pool, true).await?;
    Ok(())
}

async fn insert_users(
    pool: &PgPool,
    users: &[UserFixture],
) -> Result<HashMap<String, UserId>, SeedError> {
    let mut tx = pool.begin().await?;
    let mut repo = UserRepository::new(&mut tx);
    let mut ids = HashMap::with_capacity(users.len());

    for fixture in users {
        let username = Username::parse(&fixture.username)?;
        let email = Email::parse(&fixture.email)?;
        let password_hash = hash_password(&fixture.password)?;

        let user = repo.create(&username, &email, &password_hash).await?;
        ids.insert(username.as_str().to_owned(), user.id);
    }

    tx.commit().await?;
    Ok(ids)
}

async fn insert_teas(
    pool: &PgPool,
    teas: &[TeaFixture],
    owners: &HashMap<String, UserId>,
) -> Result<HashMap<String, TeaId>, SeedError> {
    let mut tx = pool.begin().await?;
    let mut repo = TeaRepository::new(&mut tx);
    let mut ids = HashMap::with_capacity(teas.len());

    for fixture in teas {
        let owner = *owners
            .get(fixture.owner.trim())
            .ok_or_else(|| SeedError::UnknownReference(format!("user {:?}", fixture.owner)))?;

        let payload = TeaMutation {
            name: fixture.name.clone(),
            in_stock: fixture.in_stock,
            rating: fixture.rating,
        };
        let tea = repo.create(&payload, owner).await?;
        ids.insert(tea.name, tea.id);
    }

    tx.commit().await?;
    Ok(ids)
}

async fn insert_comments(
    pool: &PgPool,
    comments: &[CommentFixture],
    teas: &HashMap<String, TeaId>,
) -> Result<usize, SeedError> {
    let mut tx = pool.begin().await?;
    let mut repo = CommentRepository::new(&mut tx);

    for fixture in comments {
        let tea_id = *teas
            .get(&fixture.tea)
            .ok_or_else(|| SeedError::UnknownReference(format!("tea {:?}", fixture.tea)))?;

        let payload = CommentCreate {
            content: fixture.content.clone(),
        };
        repo.create(tea_id, &payload).await?;
    }

    tx.commit().await?;
    Ok(comments.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::str::FromStr;

    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use tokio::sync::Mutex;

    use super::*;

    /// The session table lives in a shared schema, so seeding tests take turns.
    static SEED_LOCK: Mutex<()> = Mutex::const_new(());

    /// A pool whose `search_path` is a fresh private schema.
    async fn scoped_pool() -> (PgPool, PgPool, String) {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required");
        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("pool creation failed");

        let schema = format!("seed_{}", uuid::Uuid::new_v4().simple());
        sqlx::query(&format!(r#"CREATE SCHEMA "{schema}""#))
            .execute(&admin)
            .await
            .expect("schema creation failed");

        let options = PgConnectOptions::from_str(&url)
            .expect("invalid TEST_DATABASE_URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .expect("scoped pool creation failed");

        (admin, pool, schema)
    }

    async fn drop_schema(admin: &PgPool, pool: PgPool, schema: &str) {
        pool.close().await;
        sqlx::query(&format!(r#"DROP SCHEMA "{schema}" CASCADE"#))
            .execute(admin)
            .await
            .expect("schema drop failed");
    }

    async fn count(pool: &PgPool, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .expect("count query failed");
        count
    }

    fn bundled() -> Fixtures {
        Fixtures::from_yaml(crate::fixtures::BUNDLED).unwrap()
    }

    #[tokio::test]
    async fn test_missing_fixture_file_is_io_error() {
        let err = load_fixtures(Some(Path::new("/nonexistent/teahouse/seed.yaml")))
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Io(_)));
    }

    #[tokio::test]
    async fn test_no_file_loads_bundled_fixtures() {
        let fixtures = load_fixtures(None).await.unwrap();
        assert_eq!(fixtures.teas.len(), bundled().teas.len());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_bundled_fixtures_seed_every_row() {
        let _guard = SEED_LOCK.lock().await;
        let (admin, pool, schema) = scoped_pool().await;
        let fixtures = bundled();

        let summary = seed(&pool, &fixtures).await.expect("seeding failed");

        assert_eq!(
            summary,
            SeedSummary {
                users: fixtures.users.len(),
                teas: fixtures.teas.len(),
                comments: fixtures.comments.len(),
            }
        );
        assert_eq!(count(&pool, "users").await, 2);
        assert_eq!(count(&pool, "teas").await, 4);
        assert_eq!(count(&pool, "comments").await, 5);

        drop_schema(&admin, pool, &schema).await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_reseed_replaces_rows() {
        let _guard = SEED_LOCK.lock().await;
        let (admin, pool, schema) = scoped_pool().await;
        let fixtures = bundled();

        seed(&pool, &fixtures).await.expect("first seed failed");
        seed(&pool, &fixtures).await.expect("second seed failed");

        assert_eq!(count(&pool, "users").await, 2);
        assert_eq!(count(&pool, "teas").await, 4);
        assert_eq!(count(&pool, "comments").await, 5);

        // IDs restart, so the first user is ID 1 again
        let (min_id,): (i32,) = sqlx::query_as("SELECT MIN(id) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(min_id, 1);

        drop_schema(&admin, pool, &schema).await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_reseed_discards_existing_sessions() {
        let _guard = SEED_LOCK.lock().await;
        let (admin, pool, schema) = scoped_pool().await;

        seed(&pool, &bundled()).await.expect("first seed failed");

        sqlx::query(
            "INSERT INTO tower_sessions.session (id, data, expiry_date) \
             VALUES ($1, $2, now() + interval '1 day')",
        )
        .bind(format!("stale-{schema}"))
        .bind(vec![0_u8])
        .execute(&pool)
        .await
        .expect("session insert failed");

        seed(&pool, &bundled()).await.expect("second seed failed");

        assert_eq!(count(&pool, "tower_sessions.session").await, 0);

        drop_schema(&admin, pool, &schema).await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn test_failing_comment_group_keeps_earlier_groups() {
        let _guard = SEED_LOCK.lock().await;
        let (admin, pool, schema) = scoped_pool().await;

        let mut fixtures = bundled();
        fixtures.comments.push(CommentFixture {
            tea: "Matcha".to_string(),
            content: "No such tea".to_string(),
        });

        let err = seed(&pool, &fixtures).await.unwrap_err();

        assert!(matches!(err, SeedError::UnknownReference(_)));
        assert_eq!(count(&pool, "users").await, 2);
        assert_eq!(count(&pool, "teas").await, 4);
        assert_eq!(count(&pool, "comments").await, 0);

        drop_schema(&admin, pool, &schema).await;
    }
}
