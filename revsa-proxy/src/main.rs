//! revsa-proxy - classification proxy service
//!
//! POST /analyze forwards `{text}` to the sentiment classifier, stores
//! `{text, prediction}` in SQLite and returns the stored record.

use anyhow::{Context, Result};
use clap::Parser;
use revsa_common::config::{default_database_path, load_config};
use revsa_common::HttpClassifier;
use revsa_proxy::db::{init_database_pool, SqliteRecordStore};
use revsa_proxy::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for revsa-proxy
#[derive(Parser, Debug)]
#[command(name = "revsa-proxy")]
#[command(about = "Sentiment classification proxy with persistence")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "REVSA_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "REVSA_PROXY_ADDR")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "REVSA_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Classifier predict URL
    #[arg(long, env = "REVSA_PROXY_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Classifier request timeout in seconds
    #[arg(long, env = "REVSA_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=debug", config.logging.level).into()),
        )
        .init();

    info!(
        "Starting revsa-proxy v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let proxy = config.proxy;
    let bind_addr = args.bind.unwrap_or(proxy.bind_addr);
    let db_path = args
        .database
        .or(proxy.database_path)
        .unwrap_or_else(default_database_path);
    let classifier_url = args.classifier_url.unwrap_or(proxy.classifier_endpoint);
    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(proxy.timeout_secs));

    info!("Database: {}", db_path.display());
    let pool = init_database_pool(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    let classifier = HttpClassifier::new(classifier_url, timeout).context("Failed to build classifier client")?;
    info!(endpoint = %classifier.endpoint(), timeout = ?timeout, "Classifier client ready");

    let state = AppState::new(Arc::new(classifier), Arc::new(SqliteRecordStore::new(pool.clone())));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
