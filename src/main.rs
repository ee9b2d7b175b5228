use std::sync::Arc;

use anyhow::Context;
use finpal::app::{app, AppState};
use finpal::database::chat_store::{ChatStore, MemoryChatStore, PgChatStore};
use finpal::database::DatabaseManager;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = finpal::config::config();
    tracing::info!("Starting finpal server in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECURITY_JWT_SECRET must be set outside development");
    }

    let store: Arc<dyn ChatStore> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect chat database")?;
            DatabaseManager::migrate(&pool).await.context("failed to prepare chat schema")?;
            Arc::new(PgChatStore::new(pool))
        }
        None => {
            if !finpal::is_development!() {
                anyhow::bail!("DATABASE_URL must be set outside development");
            }
            tracing::warn!("DATABASE_URL not set, chat history is kept in memory only");
            Arc::new(MemoryChatStore::new())
        }
    };

    let state = AppState::new(store, &config.security.jwt_secret);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("finpal server listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
