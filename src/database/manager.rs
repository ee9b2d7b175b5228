use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const CHATS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS chats (
    id            UUID PRIMARY KEY,
    user_id       UUID NOT NULL,
    session_id    TEXT NOT NULL,
    topic         TEXT NOT NULL DEFAULT 'general'
                  CHECK (topic IN ('budgeting', 'investing', 'saving', 'debt', 'general')),
    conversation  JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, session_id)
)"#;

const CHATS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS chats_user_id_idx ON chats (user_id, updated_at DESC)";

/// Connection setup for the chat document database
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Create the chats table if it does not exist yet
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(CHATS_DDL).execute(pool).await?;
        sqlx::query(CHATS_USER_INDEX).execute(pool).await?;
        info!("Chat schema ready");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
