//! Party Management - API Server Binary
//!
//! This binary starts the HTTP API server for party management.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin party-api
//!
//! # Run with environment variables
//! API_SERVER__PORT=9090 API_DATABASE__URL=postgres://... cargo run --bin party-api
//! ```
//!
//! # Configuration
//!
//! Settings come from `config/party-api.toml` when present and from
//! `API_`-prefixed environment variables, `__` separating section and key:
//!
//! * `API_SERVER__HOST`, `API_SERVER__PORT` - listen address (default: 0.0.0.0:8080)
//! * `API_AUTH__JWT_SECRET` - bearer token signing secret
//! * `API_DATABASE__URL`, `API_DATABASE__MAX_CONNECTIONS`, `API_DATABASE__STATEMENT_TIMEOUT_SECS`
//! * `API_LOGGING__LEVEL`, `API_LOGGING__JSON` - log filter and JSON output
//! * `API_REFERENCE_DATA__DEFAULT_LOCALE`, `API_REFERENCE_DATA__CACHE_TTL_SECS`

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{create_pool, run_migrations, PostgresPartyAdapter, PostgresReferenceDataAdapter};
use interface_api::{config::ApiConfig, create_router, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, connects to the database,
/// applies migrations and starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::load().context("Failed to load the API configuration")?;

    init_tracing(&config.logging.level, config.logging.json);

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting Party Management API Server"
    );

    tracing::info!("Connecting to database...");
    let pool = create_pool(config.database.pool_config())
        .await
        .context("Failed to connect to the database")?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool)
        .await
        .context("Failed to apply the database migrations")?;

    let state = AppState::new(
        Arc::new(PostgresPartyAdapter::new(pool.clone())),
        Arc::new(PostgresReferenceDataAdapter::new(pool)),
        config.clone(),
    )
    .context("Failed to initialise the party services")?;

    let app = create_router(state);

    let addr = config.server_addr().with_context(|| {
        format!("Invalid server address {}:{}", config.server.host, config.server.port)
    })?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install the SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
