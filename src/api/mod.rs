//! carbon-tags HTTP API
//!
//! Graphite-compatible tag endpoints, built with Axum.
//!
//! # Endpoints
//!
//! ## Tags
//! - `GET /tags/:tag` - Value counts for a tag (`filter`, `limit`, `format`)
//! - `GET /tags/` - List tag names (`filter`, `limit`, `format`)
//! - `POST /tags/tagMultiSeries` - Register tagged series (`path` form values)
//!
//! ## Series
//! - `GET /seriesByTag` - Resolve tag expressions (`tagValues`, `metricExpr`,
//!   `target`, `from`, `until`, `format`, `limit`)
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use carbon_tags::api::{serve, ApiConfig, AppState};
//! use carbon_tags::index::SharedTagIndex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let index = SharedTagIndex::new();
//!     index.rebuild(["cpu;dc=ams;rack=1", "cpu;dc=fra;rack=2"]);
//!
//!     let config = ApiConfig::default();
//!     let state = AppState::new(index, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/tags", get(routes::tags::list_tags))
        .route("/tags/", get(routes::tags::list_tags))
        .route("/tags/tagMultiSeries", post(routes::tags::tag_multi_series))
        .route("/tags/:tag", get(routes::tags::stat_tag))
        .route("/seriesByTag", get(routes::series::series_by_tag))
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("carbon-tags API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("carbon-tags API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
