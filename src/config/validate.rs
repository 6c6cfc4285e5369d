//! Configuration validation

use super::schema::{FeatureType, ModelConfig};
use std::collections::HashSet;

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("No input features declared")]
    NoInputFeatures,

    #[error("Expected exactly one output feature, found {0}")]
    OutputFeatureCount(usize),

    #[error("Output feature {name} must be binary, got {kind}")]
    UnsupportedOutputType { name: String, kind: FeatureType },

    #[error("Duplicate feature name: {0}")]
    DuplicateFeature(String),

    #[error("Invalid learning rate: {0} (must be > 0.0)")]
    InvalidLearningRate(f64),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid optimizer: {0} (must be one of: adam, sgd)")]
    InvalidOptimizer(String),
}

/// Validate a model configuration
///
/// Checks:
/// - At least one input and exactly one binary output
/// - Feature names are unique across inputs and outputs
/// - Numeric trainer values are in valid ranges
/// - Optimizer name is supported
pub fn validate_config(config: &ModelConfig) -> Result<(), ValidationError> {
    if config.input_features.is_empty() {
        return Err(ValidationError::NoInputFeatures);
    }

    if config.output_features.len() != 1 {
        return Err(ValidationError::OutputFeatureCount(
            config.output_features.len(),
        ));
    }

    let output = &config.output_features[0];
    if output.kind != FeatureType::Binary {
        return Err(ValidationError::UnsupportedOutputType {
            name: output.name.clone(),
            kind: output.kind,
        });
    }

    let mut seen = HashSet::new();
    for feature in config.input_features.iter().chain(&config.output_features) {
        if !seen.insert(feature.name.as_str()) {
            return Err(ValidationError::DuplicateFeature(feature.name.clone()));
        }
    }

    let trainer = &config.trainer;
    if trainer.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(trainer.batch_size));
    }

    if !(trainer.learning_rate > 0.0) {
        return Err(ValidationError::InvalidLearningRate(trainer.learning_rate));
    }

    if trainer.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(trainer.epochs));
    }

    let valid_optimizers = ["adam", "sgd"];
    let name = trainer.optimizer.kind.to_lowercase();
    if !valid_optimizers.contains(&name.as_str()) {
        return Err(ValidationError::InvalidOptimizer(
            trainer.optimizer.kind.clone(),
        ));
    }

    Ok(())
}
