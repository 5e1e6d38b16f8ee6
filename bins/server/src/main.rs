//! Medfin API Server
//!
//! Main entry point for the hospital finance backend.

use std::sync::Arc;

use anyhow::Context;
use medfin_api::{AppState, create_router};
use medfin_core::storage::ProofStore;
use medfin_db::connect_with;
use medfin_shared::AppConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medfin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    // Uploads are refused rather than the server failing to start.
    let storage = match ProofStore::from_settings(&config.storage) {
        Ok(store) => {
            info!(store = ?store, "Proof storage configured");
            Some(Arc::new(store))
        }
        Err(e) => {
            warn!(error = %e, "Proof storage unavailable; uploads disabled");
            None
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db: Arc::new(db),
        storage,
        config: Arc::new(config),
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
