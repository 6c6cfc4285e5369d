//! Build training components from configuration

use super::schema::{FeatureSpec, FeatureType, ModelConfig, OptimizerSpec, TrainerSpec};
use crate::error::{Error, Result};
use crate::optim::{Adam, Optimizer, SGD};

/// Name of the column the default configuration predicts
pub const TARGET_COLUMN: &str = "Survived";

/// The fixed Titanic feature schema and trainer settings
///
/// Six passenger inputs, one binary output, ten epochs of Adam at
/// `lr = 0.001` with batches of 32.
pub fn titanic_config() -> ModelConfig {
    ModelConfig {
        input_features: vec![
            FeatureSpec::new("Pclass", FeatureType::Category),
            FeatureSpec::new("Sex", FeatureType::Category),
            FeatureSpec::new("Age", FeatureType::Number),
            FeatureSpec::new("SibSp", FeatureType::Number),
            FeatureSpec::new("Parch", FeatureType::Number),
            FeatureSpec::new("Fare", FeatureType::Number),
        ],
        output_features: vec![FeatureSpec::new(TARGET_COLUMN, FeatureType::Binary)],
        trainer: TrainerSpec {
            epochs: 10,
            batch_size: 32,
            learning_rate: 0.001,
            optimizer: OptimizerSpec::new("adam"),
        },
    }
}

/// Build optimizer from configuration
pub fn build_optimizer(spec: &OptimizerSpec, lr: f64) -> Result<Box<dyn Optimizer>> {
    match spec.kind.to_lowercase().as_str() {
        "sgd" => {
            let momentum = spec.param_f64("momentum", 0.0);
            Ok(Box::new(SGD::new(lr, momentum)))
        }
        "adam" => {
            let beta1 = spec.param_f64("beta1", 0.9);
            let beta2 = spec.param_f64("beta2", 0.999);
            let eps = spec.param_f64("eps", 1e-8);
            Ok(Box::new(Adam::new(lr, beta1, beta2, eps)))
        }
        name => Err(Error::ConfigError(format!(
            "Unknown optimizer: {name}. Supported: sgd, adam"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titanic_config_shape() {
        let config = titanic_config();
        let names: Vec<&str> = config
            .input_features
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["Pclass", "Sex", "Age", "SibSp", "Parch", "Fare"]);
        assert_eq!(config.target_name(), "Survived");
        assert_eq!(config.trainer.epochs, 10);
        assert_eq!(config.trainer.batch_size, 32);
        assert!((config.trainer.learning_rate - 0.001).abs() < 1e-12);
        assert_eq!(config.trainer.optimizer.kind, "adam");
    }

    #[test]
    fn test_build_adam() {
        let opt = build_optimizer(&OptimizerSpec::new("Adam"), 0.01).unwrap();
        assert!((opt.lr() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_build_sgd_with_momentum() {
        let mut spec = OptimizerSpec::new("sgd");
        spec.params
            .insert("momentum".to_string(), serde_json::json!(0.9));
        let opt = build_optimizer(&spec, 0.1).unwrap();
        assert!((opt.lr() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_build_unknown_optimizer() {
        let result = build_optimizer(&OptimizerSpec::new("lamb"), 0.1);
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
