use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cohort_tools_api::app;
use cohort_tools_api::config::{AppConfig, StorageBackend};
use cohort_tools_api::database::{MemoryStore, PgStore, Storage};
use cohort_tools_api::state::AppState;

/// Cohort tools HTTP API server
#[derive(Parser, Debug)]
#[command(name = "cohort-tools-api", version, about)]
struct Args {
    /// Port to listen on, overriding PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Apply the database schema and exit
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up TOKEN_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting cohort tools API in {:?} mode", config.environment);

    let store: Arc<dyn Storage> = match config.database.backend {
        StorageBackend::Postgres => {
            let store = PgStore::connect(&config.database)
                .await
                .context("failed to connect to the database")?;
            store.migrate().await.context("failed to apply schema")?;

            if args.migrate_only {
                store.close().await;
                return Ok(());
            }
            Arc::new(store)
        }
        StorageBackend::Memory => {
            if args.migrate_only {
                tracing::warn!("Memory backend has no schema to migrate");
                return Ok(());
            }
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, store).context("failed to initialize token issuer")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
