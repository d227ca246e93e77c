//! hitos server binary.

use anyhow::{Context, Result};
use clap::Parser;
use hitos_server::bootstrap::ensure_schema;
use hitos_server::config::load_config;
use hitos_server::{AppState, create_router};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// hitos - milestone and stage tracker backend
#[derive(Parser, Debug)]
#[command(name = "hitosd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "HITOS_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("hitos v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(Path::new(&args.config))?;

    hitos_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let storage = hitos_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = storage.backend_name(), "Storage backend initialized");

    let metadata = hitos_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("Metadata store initialized");

    // Keep serving without a schema; requests fail until the database is back.
    if let Err(e) = ensure_schema(metadata.as_ref()).await {
        tracing::error!(error = ?e, "Schema initialization failed");
    }

    let bind = config.server.bind.clone();
    let state = AppState::new(config, storage, metadata);
    let app = create_router(state);

    let addr: SocketAddr = bind.parse().context("invalid bind address")?;
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
