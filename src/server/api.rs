//! API router and server setup
//!
//! Configures axum routes and runs the prediction and metrics listeners.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::engine::Predictor;
use crate::monitor::ServiceMetrics;
use crate::server::{
    handlers::{home, metrics, predict},
    state::AppState,
    Result, ServerConfig, ServerError,
};

/// Prediction service plus its metrics endpoint
pub struct PredictionServer {
    config: ServerConfig,
    state: AppState,
}

impl PredictionServer {
    /// Create a server around a loaded model
    pub fn new(config: ServerConfig, predictor: Arc<dyn Predictor>) -> Result<Self> {
        let metrics = ServiceMetrics::new().map_err(|e| ServerError::Metrics(e.to_string()))?;
        Ok(Self {
            config,
            state: AppState::new(predictor, metrics),
        })
    }

    /// Build the prediction router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(home))
            .route("/predict", post(predict))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Build the metrics router
    pub fn metrics_router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics))
            .with_state(self.state.clone())
    }

    /// Run both listeners until either fails
    pub async fn run(&self) -> Result<()> {
        let app = bind(self.config.address).await?;
        let metrics = bind(self.config.metrics_address).await?;

        info!(
            "Metrics exposed on http://{}/metrics",
            self.config.metrics_address
        );
        info!("Prediction service running on http://{}", self.config.address);

        tokio::try_join!(
            axum::serve(app, self.router()).into_future(),
            axum::serve(metrics, self.metrics_router()).into_future(),
        )?;

        Ok(())
    }

    /// Get the configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    /// Get the current state (for testing)
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn bind(addr: SocketAddr) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

// =============================================================================
// Tests
// =============================================================================
