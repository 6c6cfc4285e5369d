//! Prediction service metrics
//!
//! Counters and latency histograms for the prediction service, registered
//! in a registry owned by [`ServiceMetrics`] rather than the process-wide
//! default one, so every server instance (and every test) starts from zero.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pronostico::monitor::ServiceMetrics;
//!
//! let metrics = ServiceMetrics::new().unwrap();
//! metrics.record_prediction(Duration::from_millis(3));
//! assert_eq!(metrics.predictions(), 1);
//! assert!(metrics.render().unwrap().contains("num_predictions_total 1"));
//! ```

use std::time::Duration;

use prometheus::{Encoder, Histogram, HistogramOpts, HistogramTimer, IntCounter, Registry, TextEncoder};

use crate::error::{Error, Result};

pub const PREDICTIONS_TOTAL: &str = "num_predictions_total";
pub const PREDICTION_LATENCY: &str = "prediction_latency_seconds";
pub const REQUEST_LATENCY: &str = "request_processing_seconds";

/// Prometheus handles shared by every request
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    predictions: IntCounter,
    prediction_latency: Histogram,
    request_latency: Histogram,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let predictions = IntCounter::new(PREDICTIONS_TOTAL, "Number of predictions made")?;
        let prediction_latency = Histogram::with_opts(HistogramOpts::new(
            PREDICTION_LATENCY,
            "Time taken for predictions",
        ))?;
        let request_latency = Histogram::with_opts(HistogramOpts::new(
            REQUEST_LATENCY,
            "Time spent processing HTTP requests",
        ))?;

        registry.register(Box::new(predictions.clone()))?;
        registry.register(Box::new(prediction_latency.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;

        Ok(Self {
            registry,
            predictions,
            prediction_latency,
            request_latency,
        })
    }

    /// Count one successful prediction and observe its latency
    pub fn record_prediction(&self, elapsed: Duration) {
        self.predictions.inc();
        self.prediction_latency.observe(elapsed.as_secs_f64());
    }

    /// Timer that observes request latency when dropped
    pub fn request_timer(&self) -> HistogramTimer {
        self.request_latency.start_timer()
    }

    /// Successful predictions so far
    pub fn predictions(&self) -> u64 {
        self.predictions.get()
    }

    /// Observations recorded in the request-latency histogram
    pub fn requests_observed(&self) -> u64 {
        self.request_latency.get_sample_count()
    }

    /// Prometheus text exposition of every metric
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Content type of [`render`](Self::render) output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

impl std::fmt::Debug for ServiceMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMetrics")
            .field("predictions", &self.predictions())
            .field("requests_observed", &self.requests_observed())
            .finish_non_exhaustive()
    }
}
