//! Event type validation server - Main entry point.
//!
//! This binary starts the validation server with:
//! - Structured JSON logging for production
//! - Graceful shutdown handling (SIGTERM/SIGINT)
//!
//! # Configuration
//!
//! See [`eventtype_linter_server::config`] for environment variable configuration.
//!
//! # Example
//!
//! ```bash
//! NAKADI_API_URL=https://nakadi.example.org \
//! HTTP_PORT=3000 \
//! cargo run --release --bin eventtype-linter-server
//! ```

use std::process::ExitCode;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use eventtype_linter_server::config::Config;
use eventtype_linter_server::error::{Result, ServerError};
use eventtype_linter_server::routes::{create_router, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => {
            info!("Server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "Server failed");
            if matches!(err, ServerError::Config(_)) {
                print_config_help(&err);
            }
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, binds the listener and serves until shutdown.
async fn run() -> Result<()> {
    let config = Config::from_env()?;

    info!(
        port = config.port,
        broker_url = %config.broker_url,
        broker_timeout_secs = config.broker_timeout.as_secs(),
        "Event type validation server starting"
    );

    let state = AppState::new(config.clone())
        .map_err(|e| ServerError::internal(format!("failed to create broker client: {e}")))?;
    let app = create_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServerError::internal(format!("failed to bind to {bind_addr}: {e}")))?;
    info!(
        port = config.port,
        address = %bind_addr,
        "Server listening"
    );

    info!("Server ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::internal(format!("server error: {e}")))
}

fn print_config_help(err: &ServerError) {
    eprintln!("Error: {err}");
    eprintln!();
    eprintln!("Required environment variables:");
    eprintln!("  NAKADI_API_URL           - Base URL of the broker REST API");
    eprintln!();
    eprintln!("Optional environment variables:");
    eprintln!("  HTTP_PORT                - HTTP server port (default: 3000)");
    eprintln!("  BROKER_TIMEOUT_SECS      - Broker request timeout (default: 5)");
    eprintln!("  RUST_LOG                 - Log level filter (default: info)");
}

/// Initialize structured logging with tracing.
///
/// JSON output, filtered by `RUST_LOG` with a default of `info`.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,axum::rejection=trace"));

    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();
}

/// Resolves when SIGTERM or SIGINT is received.
///
/// If a handler cannot be installed the corresponding branch never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
