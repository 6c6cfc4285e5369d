//! # Pronostico: train, track and serve a tabular classifier
//!
//! Pronostico trains a binary survival classifier on the Titanic passenger
//! table, records the run in an experiment store, and serves predictions
//! from the persisted model over HTTP.
//!
//! ## Architecture
//!
//! - **config**: Declarative YAML model configuration and CLI arguments
//! - **data**: Dataset download, column renaming and feature rows
//! - **engine**: Config-driven logistic classifier (train, predict, save, load)
//! - **optim**: Optimizers (SGD, Adam)
//! - **train**: Classification metrics and the training controller
//! - **storage**: Experiment tracking backends
//! - **run**: Tracked run handle
//! - **server**: Prediction web service
//! - **monitor**: Prometheus service metrics
//! - **deck**: Static slide deck generator

pub mod config;
pub mod data;
pub mod deck;
pub mod engine;
pub mod monitor;
pub mod optim;
pub mod run;
pub mod server;
pub mod storage;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use data::{Dataset, FeatureRow};
pub use engine::{find_probability_column, PredictionFrame, Predictor, POSITIVE_LABELS};
pub use error::{Error, Result};
