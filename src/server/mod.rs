//! Prediction web service
//!
//! Serves a loaded model over HTTP:
//!
//! - `GET /`: the passenger form
//! - `POST /predict`: form fields → one feature row → prediction page, or
//!   `{"error": "..."}` JSON when the input or the model fails
//! - `GET /metrics` on a separate listener: Prometheus text format
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pronostico::engine::LogisticModel;
//! use pronostico::server::{PredictionServer, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let model = LogisticModel::load("titanic_model".as_ref())?;
//! let server = PredictionServer::new(ServerConfig::default(), Arc::new(model))?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod form;
mod handlers;
mod page;
mod state;

pub use api::PredictionServer;
pub use form::{parse_form, FormError};
pub use handlers::predict_row;
pub use page::render_page;
pub use state::AppState;

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address of the prediction service
    pub address: SocketAddr,
    /// Address of the metrics endpoint
    pub metrics_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5050, 8000)
    }
}

impl ServerConfig {
    pub fn new(host: IpAddr, port: u16, metrics_port: u16) -> Self {
        Self {
            address: SocketAddr::new(host, port),
            metrics_address: SocketAddr::new(host, metrics_port),
        }
    }
}

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics registry error: {0}")]
    Metrics(String),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// What the service reports for one passenger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    /// Predicted label
    pub prediction: bool,
    /// Positive-class probability scaled to [0, 100], two decimals
    pub probability: f64,
}

impl PredictionOutcome {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        if self.prediction {
            "Survived"
        } else {
            "Did not survive"
        }
    }
}

/// Scale a probability to a percentage rounded to two decimals
pub fn to_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}
