//! Storage server: hosts the storage service REST API.
//!
//! ```bash
//! RUST_LOG=info,storage_service=debug cargo run -p storage-server -- --config storage.yaml
//! STORAGE_SERVICE__DATABASE__URL=postgres://localhost/storage cargo run -p storage-server
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use storage_service::{config::Config, StorageServiceModule};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "storage-server", version, about = "Storage master data service")]
struct Cli {
    /// YAML configuration file; `STORAGE_SERVICE__*` variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8087")]
    bind: SocketAddr,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = Config::load(cli.config.as_deref()).context("invalid configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let module = StorageServiceModule::init(config).await?;
    let app = module.router().layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, "storage-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("storage-server stopped");
    Ok(())
}

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
