//! Training and evaluation
//!
//! - **metrics**: classification metrics (accuracy, precision, recall, F1,
//!   ROC-AUC) and final-value extraction from per-epoch histories
//! - **controller**: the tracked train → predict → evaluate → log pipeline
//!
//! # Example
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use pronostico::config::titanic_config;
//! use pronostico::engine::LogisticEngineFactory;
//! use pronostico::storage::FileStorage;
//! use pronostico::train::{train_and_track, TrainSettings};
//!
//! let settings = TrainSettings::new(titanic_config());
//! let storage = Arc::new(Mutex::new(FileStorage::open("/tmp/pronostico/mlruns").unwrap()));
//! let summary = train_and_track(&settings, storage, &LogisticEngineFactory::default()).unwrap();
//! println!("run {} roc_auc={}", summary.run_id, summary.metrics.roc_auc);
//! ```

mod controller;
mod metrics;

pub use controller::{train_and_track, RunSummary, TrainSettings};
pub use metrics::{
    log_loss, roc_auc, safe_last_value, Accuracy, F1Score, Metric, MetricRecord, Precision, Recall,
};
