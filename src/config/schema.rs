//! YAML schema definitions for the declarative model configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Complete model specification: features plus trainer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Columns fed into the model
    pub input_features: Vec<FeatureSpec>,

    /// Columns the model predicts
    pub output_features: Vec<FeatureSpec>,

    /// Training hyperparameters
    pub trainer: TrainerSpec,
}

impl ModelConfig {
    /// The single binary output feature, if the config declares one
    pub fn target(&self) -> Option<&FeatureSpec> {
        self.output_features.first()
    }

    /// Name of the target column (empty when no output is declared)
    pub fn target_name(&self) -> &str {
        self.target().map(|f| f.name.as_str()).unwrap_or_default()
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: FeatureType,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, kind: FeatureType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    /// Discrete labels, one-hot encoded
    Category,
    /// Real values, standardized
    Number,
    /// Two-valued column (true/false, 1/0)
    Binary,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureType::Category => write!(f, "category"),
            FeatureType::Number => write!(f, "number"),
            FeatureType::Binary => write!(f, "binary"),
        }
    }
}

/// Trainer hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerSpec {
    /// Number of passes over the training split
    pub epochs: usize,

    /// Mini-batch size
    pub batch_size: usize,

    /// Optimizer step size
    pub learning_rate: f64,

    /// Optimizer selection
    pub optimizer: OptimizerSpec,
}

/// Optimizer specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSpec {
    /// Optimizer name: "adam" | "sgd"
    #[serde(rename = "type")]
    pub kind: String,

    /// Optimizer-specific parameters (beta1, beta2, momentum, etc.)
    #[serde(flatten)]
    pub params: HashMap<String, serde_json::Value>,
}

impl OptimizerSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: HashMap::new(),
        }
    }

    /// Read a numeric optimizer parameter, falling back to `default`
    pub fn param_f64(&self, key: &str, default: f64) -> f64 {
        self.params
            .get(key)
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_type_lowercase_yaml() {
        let spec: FeatureSpec = serde_yaml::from_str("name: Age\ntype: number\n").unwrap();
        assert_eq!(spec.kind, FeatureType::Number);
        assert_eq!(spec.name, "Age");
    }

    #[test]
    fn test_optimizer_extra_params_flattened() {
        let spec: OptimizerSpec = serde_yaml::from_str("type: adam\nbeta1: 0.8\n").unwrap();
        assert_eq!(spec.kind, "adam");
        assert!((spec.param_f64("beta1", 0.9) - 0.8).abs() < 1e-12);
        assert!((spec.param_f64("beta2", 0.999) - 0.999).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_feature_type_rejected() {
        let result: Result<FeatureSpec, _> = serde_yaml::from_str("name: Cabin\ntype: text\n");
        assert!(result.is_err());
    }
}
