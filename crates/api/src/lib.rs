//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - The acting-user extractor
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use medfin_core::storage::ProofStore;
use medfin_shared::AppConfig;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use extractors::ActingUser;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Proof document storage (optional).
    pub storage: Option<Arc<ProofStore>>,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Clone of the pooled connection for a repository.
    #[must_use]
    pub fn conn(&self) -> DatabaseConnection {
        (*self.db).clone()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api/v1", routes::api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
