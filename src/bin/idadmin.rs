//! Identity admin server binary.
//!
//! Main application entry point that opens the configured storage, seeds the
//! standard scopes and serves the admin API with graceful shutdown.

use anyhow::Result;
use idadmin::{
    admin::{IdentityAdminManager, seed_if_empty},
    config::Config,
    http::{AppState, build_router},
    storage::{create_storage_backend, parse_storage_backend},
};
use std::{env, sync::Arc};

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "idadmin=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = idadmin::config::version()?;

    env::args().for_each(|arg| {
        if arg == "--version" {
            println!("{version}");
            std::process::exit(0);
        }
    });

    tracing::info!(?version, "Starting idadmin");

    let config = Config::new()?;

    // Parse storage backend configuration
    let storage_backend =
        parse_storage_backend(&config.storage_backend, config.database_url.as_deref())?;
    tracing::info!(backend = ?storage_backend, "Opening storage");
    let storage = create_storage_backend(storage_backend).await?;

    if *config.seed_standard_scopes.as_ref() {
        let seeded = seed_if_empty(storage.as_ref()).await?;
        tracing::info!(seeded, "Standard scope seeding finished");
    }

    let manager = IdentityAdminManager::new(storage, config.client_defaults());

    // Create application context
    let app_context = AppState {
        config: Arc::new(config.clone()),
        manager: Arc::new(manager),
    };

    // Build the router
    let app = build_router(app_context);

    // Setup graceful shutdown
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    // Start HTTP server
    {
        let http_port = *config.http_port.as_ref();
        let bind_address = format!("0.0.0.0:{http_port}");
        let listener = TcpListener::bind(&bind_address).await?;
        tracing::info!("Starting server on {bind_address}");

        let inner_token = token.clone();
        tracker.spawn(async move {
            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        () = shutdown_token.cancelled() => { }
                    }
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!("axum task failed: {}", err);
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}
