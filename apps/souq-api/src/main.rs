//! # Souq API Server
//!
//! HTTP entry point for the storefront backend.
//!
//! ## Configuration
//! Environment variables are documented in [`souq_api::config`]. Without
//! Cloudinary credentials images go to an in-memory store and are lost on
//! restart.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use souq_api::config::ApiConfig;
use souq_api::state::AppState;
use souq_db::{Database, DbConfig};
use souq_media::{AssetStore, CloudinaryStore, MemoryAssetStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Souq API");

    let config = ApiConfig::load().context("failed to load configuration")?;
    info!(port = config.http_port, database = %config.database_path, "Configuration loaded");

    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("failed to open database")?;
    info!("Database connected and migrated");

    let store: Arc<dyn AssetStore> = match config.cloudinary.clone() {
        Some(cloudinary) => {
            info!(cloud = %cloudinary.cloud_name, "Using Cloudinary asset store");
            Arc::new(CloudinaryStore::new(cloudinary).context("invalid Cloudinary configuration")?)
        }
        None => {
            warn!("Cloudinary credentials not set, images are kept in memory only");
            Arc::new(MemoryAssetStore::new())
        }
    };

    let addr = config.bind_address();
    let state = Arc::new(AppState::new(config, db.clone(), store));
    let app = souq_api::app(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "Souq API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Souq API stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
