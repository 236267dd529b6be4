//! # TicketDesk API Server
//!
//! REST API for support tickets: users open tickets, employees are assigned
//! to them. Every `/api/v1` route requires the shared `X-API-Key` secret.
//!
//! ## Startup
//!
//! 1. Load `.env` and initialize tracing (`LOG_FORMAT=json` for JSON lines)
//! 2. Load [`Config`] from the environment
//! 3. Connect to PostgreSQL, then migrate and seed as configured
//! 4. Serve until Ctrl-C or SIGTERM, cancelling in-flight store calls
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/ticketdesk API_KEY=secret cargo run -p ticketdesk-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use ticketdesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use ticketdesk_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{self, close_pool, create_pool},
        seed::{seed_if_empty, SeedData},
    },
    store::postgres::PgStore,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "ticketdesk_api=debug,ticketdesk_shared=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!(
        "TicketDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    // Migrations need a database to run in
    if config.startup.run_migrations {
        ensure_database_exists(&config.database.url)
            .await
            .context("failed to create database")?;
    }

    let pool = create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("failed to connect to database")?;

    if config.startup.run_migrations {
        run_migrations(&pool).await.context("failed to run migrations")?;
    }

    if config.startup.seed_data {
        seed_if_empty(&pool, SeedData::default())
            .await
            .context("failed to seed database")?;
    }

    let shutdown = CancellationToken::new();
    let store = Arc::new(PgStore::new(pool.clone()));
    let state = AppState::new(store, config.clone())?
        .with_pool(pool.clone())
        .with_shutdown(shutdown.clone());

    let app = build_router(state);
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(address = %address, production = config.is_production(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    close_pool(pool).await;
    info!("Server stopped");

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves on Ctrl-C or SIGTERM and cancels `shutdown`
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received, cancelling in-flight requests");
    shutdown.cancel();
}
