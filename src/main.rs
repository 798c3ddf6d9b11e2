use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use brevity::api;
use brevity::config::{Config, DatabaseBackend};
use brevity::short_code::ShortCodeGenerator;
use brevity::storage::{PostgresStorage, RecordStore, SqliteStorage, Storage};
use brevity::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init("info");

    let config = Config::from_env()?;
    info!("Loaded configuration");

    let storage: Arc<dyn Storage> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.database.url);
            Arc::new(
                SqliteStorage::new(&config.database.url, config.database.max_connections).await?,
            )
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage");
            Arc::new(
                PostgresStorage::new(&config.database.url, config.database.max_connections)
                    .await?,
            )
        }
    };

    info!("Initializing database...");
    storage.init().await.context("failed to initialize database")?;
    info!("Database initialized successfully");

    let generator = ShortCodeGenerator::new(config.short_code.length)?;
    let store = RecordStore::new(
        Arc::clone(&storage),
        generator,
        config.short_code.max_attempts,
    );

    let router = api::create_api_router(store, &config.api);

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Server listening on http://{}", addr);
    info!(
        "   - Endpoints available at http://{}{}/shorten",
        addr, config.api.prefix
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
