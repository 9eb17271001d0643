//! devtrend-api - Usage trend HTTP service
//!
//! Serves have/want ratio time series from the summary tables over a
//! read-only database connection.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use devtrend_api::{build_router, cors_layer, AppState, DEFAULT_CORS_ORIGINS, DEFAULT_LIMIT};
use devtrend_common::config::resolve_database_path;
use devtrend_common::db::connect_readonly;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for devtrend-api
#[derive(Parser, Debug)]
#[command(name = "devtrend-api")]
#[command(about = "HTTP API for DevTrend usage trends")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8000", env = "DEVTREND_API_BIND")]
    bind: SocketAddr,

    /// SQLite database built by devtrend-agg
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Allowed CORS origin (repeatable)
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    cors_origins: Vec<String>,

    /// Number of top items returned when a request names none
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    default_limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting DevTrend API (devtrend-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let db_path = resolve_database_path(args.database.as_deref(), None);
    info!("Database path: {}", db_path.display());

    let pool = match connect_readonly(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let origins: Vec<String> = if args.cors_origins.is_empty() {
        DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()
    } else {
        args.cors_origins
    };
    info!("CORS origins: {}", origins.join(", "));

    let state = AppState::new(pool).with_default_limit(args.default_limit);
    let app = build_router(state).layer(cors_layer(&origins));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .context("Failed to bind to address")?;
    info!("devtrend-api listening on http://{}", args.bind);
    info!("Health check: http://{}/health", args.bind);

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
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
