use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("User id {0} is outside the assignable range")]
    InvalidUserId(u32),

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("No user with id {0}")]
    UnknownUser(u32),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER NOT NULL PRIMARY KEY CHECK (id > 0),
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        is_admin BOOLEAN NOT NULL
    )
"#;

const CREATE_VISITED_PATHS: &str = r#"
    CREATE TABLE IF NOT EXISTS visitedpaths (
        id SERIAL NOT NULL PRIMARY KEY,
        path TEXT NOT NULL,
        visit_date TIMESTAMPTZ NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users (id)
    )
"#;

/// Owns connection setup and schema bootstrap for the PostgreSQL backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool against the configured database and make sure the tables exist.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let display_url = Self::redacted_url(&config.url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!("Connected database pool: {}", display_url);

        Self::init_tables(&pool).await?;
        Ok(pool)
    }

    /// Create the users and visitedpaths tables if they do not already exist.
    /// Users first, visitedpaths references it.
    pub async fn init_tables(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_USERS).execute(pool).await?;
        sqlx::query(CREATE_VISITED_PATHS).execute(pool).await?;
        info!("Database tables ready");
        Ok(())
    }

    pub async fn close(pool: PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }

    /// Connection URL with any password masked, for logs.
    fn redacted_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("****"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
