//! Declarative YAML configuration
//!
//! The model configuration declares typed input features, one binary
//! output feature, and trainer hyperparameters.
//!
//! # Example
//!
//! ```yaml
//! input_features:
//!   - name: Pclass
//!     type: category
//!   - name: Age
//!     type: number
//! output_features:
//!   - name: Survived
//!     type: binary
//! trainer:
//!   epochs: 10
//!   batch_size: 32
//!   learning_rate: 0.001
//!   optimizer:
//!     type: adam
//! ```

mod builder;
mod cli;
mod file;
mod schema;
mod validate;

pub use builder::{build_optimizer, titanic_config, TARGET_COLUMN};
pub use cli::{
    apply_overrides, parse_args, Cli, Command, ConfigArgs, DeckArgs, InfoArgs, OutputFormat,
    RunsArgs, ServeArgs, TrainArgs, ValidateArgs, DEFAULT_DATASET_URL, DEFAULT_EXPERIMENT,
    DEFAULT_RUN_NAME, DEFAULT_TRACKING_DIR,
};
pub use file::{load_config, parse_config, save_config};
pub use schema::{FeatureSpec, FeatureType, ModelConfig, OptimizerSpec, TrainerSpec};
pub use validate::{validate_config, ValidationError};
