//! Server application state

use std::sync::Arc;

use crate::engine::Predictor;
use crate::monitor::ServiceMetrics;

/// State shared by every request: the read-only model and the metric handles
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn Predictor>,
    pub metrics: ServiceMetrics,
}

impl AppState {
    pub fn new(predictor: Arc<dyn Predictor>, metrics: ServiceMetrics) -> Self {
        Self { predictor, metrics }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("output_feature", &self.predictor.output_feature())
            .field("metrics", &self.metrics)
            .finish()
    }
}
