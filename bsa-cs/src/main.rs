//! bsa-cs (Classification Service)
//!
//! Accepts a brain-scan upload, extracts its features and returns one of four
//! dementia-severity labels, from the trained model when its artifacts load at
//! startup and from the threshold rules otherwise.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bsa_common::config::TomlConfig;
use bsa_common::ClassificationDecision;
use bsa_cs::{build_app, logging, AppState};
use clap::Parser;
use tokio::signal;
use tracing::info;

/// Command-line arguments for bsa-cs
#[derive(Parser, Debug)]
#[command(name = "bsa-cs")]
#[command(about = "Brain scan classification service")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "BSA_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind to (overrides config)
    #[arg(long, env = "BSA_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "BSA_PORT")]
    port: Option<u16>,

    /// Directory holding dementia_model.bin and label_encoder.bin (overrides config)
    #[arg(short, long, env = "BSA_MODEL_DIR")]
    model_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before config resolution, so its messages are not lost
    let filter_handle = logging::init().context("Failed to initialize tracing")?;

    let args = Args::parse();

    let mut config = TomlConfig::load(args.config.as_deref(), "bsa-cs")
        .context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(model_dir) = args.model_dir {
        config.model_dir = model_dir;
    }

    // RUST_LOG takes precedence over the configured level
    if std::env::var_os("RUST_LOG").is_none() {
        logging::apply_level(&filter_handle, &config.logging.level)
            .context("Failed to apply configured log level")?;
    }

    info!(
        "Starting BSA Classification Service (bsa-cs) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // One-time, read-only decision shared by every request
    let decision = ClassificationDecision::resolve(&config.model_dir, config.fallback);
    info!("Classifier: {}", decision.mode());

    let state = AppState::new(decision);
    let app = build_app(state, &config).context("Failed to build router")?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("bsa-cs listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
