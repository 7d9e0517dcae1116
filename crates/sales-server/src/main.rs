//! Sales analytics server - main entry point

use anyhow::Result;
use sales_common::logging::{init_logging, LogConfig};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tokio::sync::Notify;
use tracing::{info, warn};

use sales_server::{
    api::{create_router, AppState},
    config::Config,
    ingest::{IngestConfig, IngestionCoordinator, PgGateway, RefreshScheduler},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("sales-server")
        .filter_directives("sales_server=debug,tower_http=debug,sqlx=info")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting sales analytics server");

    let config = Config::load()?;
    let ingest_config = IngestConfig::from_env()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        csv_path = %ingest_config.csv_path.display(),
        batch_size = ingest_config.batch_size,
        "Configuration loaded"
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Database connection pool established");

    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    let gateway = Arc::new(PgGateway::new(db_pool.clone()));
    let coordinator = IngestionCoordinator::new(gateway, ingest_config.batch_size);

    let scheduler_handle = match ingest_config.refresh_cron.as_deref() {
        Some(expr) => {
            let scheduler =
                RefreshScheduler::new(expr, coordinator.clone(), ingest_config.csv_path.clone())?;
            info!(cron = expr, "Scheduled refresh enabled");
            Some(scheduler.start())
        },
        None => {
            info!("REFRESH_CRON not set, scheduled refresh disabled");
            None
        },
    };

    let state = AppState {
        db: db_pool,
        coordinator,
        csv_path: ingest_config.csv_path,
    };
    let app = create_router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let shutdown = Arc::new(Notify::new());
    let mut server = {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .await
        })
    };

    tokio::select! {
        joined = &mut server => {
            joined??;
        },
        _ = shutdown_signal() => {
            shutdown.notify_one();
            let timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
            info!("Waiting up to {} seconds for connections to close", timeout.as_secs());
            match tokio::time::timeout(timeout, server).await {
                Ok(joined) => joined??,
                Err(_) => warn!("Connections still open after shutdown timeout, exiting"),
            }
        },
    }

    if let Some(handle) = scheduler_handle {
        handle.abort();
    }

    info!("Server shut down gracefully");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
