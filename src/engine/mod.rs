//! Model engine
//!
//! The controller and the prediction service only talk to a model through
//! the traits defined here:
//!
//! - **Predictor**: read-only inference (`predict`), shared across requests
//! - **Engine**: a predictor that can also be trained and saved
//! - **EngineFactory**: builds an untrained engine from a [`ModelConfig`]
//!
//! [`LogisticModel`] is the concrete engine: one-hot categories,
//! standardized numbers, a logistic output trained with mini-batch
//! gradient descent.

mod encoder;
mod frame;
mod logistic;

pub use encoder::{parse_binary, FeatureEncoder};
pub use frame::{
    find_probability_column, predictions_column, ColumnData, PredictionColumn, PredictionFrame,
    POSITIVE_LABELS,
};
pub use logistic::{LogisticEngineFactory, LogisticModel};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ModelConfig;
use crate::data::Dataset;
use crate::error::Result;

/// A logged metric: a single value or one value per epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    History(Vec<f64>),
}

/// Metric name → value, for one output feature
pub type FeatureStats = BTreeMap<String, MetricValue>;

/// Per-split statistics produced by training, keyed by output feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub training: BTreeMap<String, FeatureStats>,
    pub validation: BTreeMap<String, FeatureStats>,
    pub test: BTreeMap<String, FeatureStats>,
}

/// Read-only inference over a dataset
pub trait Predictor: Send + Sync {
    /// Name of the predicted output feature
    fn output_feature(&self) -> &str;

    /// Predict every row of `dataset`
    fn predict(&self, dataset: &Dataset) -> Result<PredictionFrame>;
}

/// A trainable, persistable predictor
pub trait Engine: Predictor {
    /// Fit the model, returning per-split statistics
    fn train(&mut self, dataset: &Dataset) -> Result<TrainingStats>;

    /// Persist the model into `dir` (created if missing)
    fn save(&self, dir: &Path) -> Result<()>;
}

/// Builds untrained engines from a configuration
pub trait EngineFactory {
    type Engine: Engine;

    fn build(&self, config: &ModelConfig) -> Result<Self::Engine>;
}
