//! Tracked training run
//!
//! Drives one run end to end: persist the configuration, fetch and rename
//! the dataset, build and train an engine, predict on the training data,
//! compute the five run metrics, save the model, log the metrics and log
//! the model and configuration as artifacts.
//!
//! Any failure up to and including metric logging finishes the run as
//! `Failed` and is returned to the caller. Artifact logging comes last and
//! only warns on failure.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::metrics::{roc_auc, safe_last_value, Metric, MetricRecord, Precision, Recall};
use crate::config::{
    save_config, ModelConfig, DEFAULT_DATASET_URL, DEFAULT_EXPERIMENT, DEFAULT_RUN_NAME,
};
use crate::data::{download_dataset, Dataset, DatasetSource};
use crate::engine::{
    find_probability_column, parse_binary, predictions_column, Engine, EngineFactory, Predictor,
    POSITIVE_LABELS,
};
use crate::error::{Error, Result};
use crate::run::Run;
use crate::storage::{get_or_create_experiment, lock, ExperimentStorage, RunStatus};

/// Inputs of one tracked training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSettings {
    /// Feature schema and trainer hyperparameters
    pub config: ModelConfig,
    /// Where the configuration YAML is written (and logged from)
    pub config_path: PathBuf,
    /// Raw dataset location
    pub source: DatasetSource,
    /// Where the renamed dataset is persisted
    pub dataset_path: PathBuf,
    /// Where the trained model is saved
    pub model_dir: PathBuf,
    pub experiment: String,
    pub run_name: String,
}

impl TrainSettings {
    /// Settings with the default file names, dataset URL and experiment
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            config_path: PathBuf::from("titanic_config.yaml"),
            source: DatasetSource::Url(DEFAULT_DATASET_URL.to_string()),
            dataset_path: PathBuf::from("titanic.csv"),
            model_dir: PathBuf::from("titanic_model"),
            experiment: DEFAULT_EXPERIMENT.to_string(),
            run_name: DEFAULT_RUN_NAME.to_string(),
        }
    }

    /// Place the config, dataset and model files under `dir`
    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.config_path = dir.join("titanic_config.yaml");
        self.dataset_path = dir.join("titanic.csv");
        self.model_dir = dir.join("titanic_model");
        self
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub experiment_id: String,
    pub metrics: MetricRecord,
    /// Column ROC-AUC was computed from (`None` when it fell back to 0.0)
    pub probability_column: Option<String>,
}

/// Metrics plus the trained engine that produced them
struct Evaluation<E> {
    engine: E,
    metrics: MetricRecord,
    probability_column: Option<String>,
}

/// Train a model and record it as a run of `settings.experiment`
pub fn train_and_track<S, F>(
    settings: &TrainSettings,
    storage: Arc<Mutex<S>>,
    factory: &F,
) -> Result<RunSummary>
where
    S: ExperimentStorage,
    F: EngineFactory,
{
    save_config(&settings.config, &settings.config_path)?;

    let experiment_id = {
        let mut store = lock(&storage)?;
        get_or_create_experiment(&mut *store, &settings.experiment)?
    };
    let mut run = Run::new(&experiment_id, &settings.run_name, storage)?;
    let span = run.span().clone();
    let _guard = span.enter();

    let outcome = log_trainer_params(&mut run, &settings.config)
        .and_then(|()| evaluate(settings, factory))
        .and_then(|evaluation| {
            record(&mut run, settings, &evaluation)?;
            Ok(evaluation)
        });

    match outcome {
        Ok(evaluation) => {
            let summary = RunSummary {
                run_id: run.id.clone(),
                experiment_id,
                metrics: evaluation.metrics,
                probability_column: evaluation.probability_column,
            };
            run.finish(RunStatus::Success)?;
            info!("Experiment completed successfully");
            Ok(summary)
        }
        Err(e) => {
            error!("Experiment failed: {e}");
            if let Err(finish_err) = run.finish(RunStatus::Failed) {
                warn!("Could not mark run as failed: {finish_err}");
            }
            Err(e)
        }
    }
}

fn log_trainer_params<S: ExperimentStorage>(run: &mut Run<S>, config: &ModelConfig) -> Result<()> {
    let trainer = &config.trainer;
    run.log_param("epochs", trainer.epochs)?;
    run.log_param("batch_size", trainer.batch_size)?;
    run.log_param("learning_rate", trainer.learning_rate)?;
    run.log_param("optimizer", &trainer.optimizer.kind)?;
    Ok(())
}

/// Fetch, train, predict and score
fn evaluate<F: EngineFactory>(
    settings: &TrainSettings,
    factory: &F,
) -> Result<Evaluation<F::Engine>> {
    let dataset = download_dataset(&settings.source, &settings.dataset_path)?;

    let mut engine = factory.build(&settings.config).map_err(|e| {
        error!("Failed to initialize model: {e}");
        e
    })?;
    info!("Model initialized");

    let stats = engine.train(&dataset).map_err(|e| {
        error!("Failed to train model: {e}");
        e
    })?;
    info!("Model training completed");

    let output = engine.output_feature().to_string();
    let validation = stats.validation.get(&output);
    let final_value = |key: &str| {
        validation
            .and_then(|metrics| metrics.get(key))
            .map_or(0.0, safe_last_value)
    };
    let accuracy = final_value("accuracy");
    let f1_score = final_value("f1_score");

    let predictions = engine.predict(&dataset).map_err(|e| {
        error!("Failed to get predictions: {e}");
        e
    })?;
    let columns = predictions.column_names();
    info!("Prediction columns: {columns:?}");

    let y_true = labels(&dataset, &output)?;
    let pred_column = predictions_column(&output);
    let y_pred = predictions.bools(&pred_column).ok_or_else(|| {
        Error::Evaluation(format!("Predictions have no boolean column {pred_column}"))
    })?;
    if y_pred.len() != y_true.len() {
        return Err(Error::Evaluation(format!(
            "{} predictions for {} rows",
            y_pred.len(),
            y_true.len()
        )));
    }

    let probability_column = find_probability_column(&columns, &output, &POSITIVE_LABELS);
    let roc_auc = match &probability_column {
        None => {
            warn!("No probability column found for positive class. Skipping ROC-AUC.");
            0.0
        }
        Some(column) => {
            let scores = predictions.floats(column).ok_or_else(|| {
                Error::Evaluation(format!("Probability column {column} is not numeric"))
            })?;
            let value = roc_auc(&y_true, scores).ok_or_else(|| {
                Error::Evaluation(
                    "ROC-AUC is undefined when only one class is present".to_string(),
                )
            })?;
            info!("Using probability column: {column}");
            value
        }
    };

    let metrics = MetricRecord {
        accuracy,
        f1_score,
        precision: Precision.compute(&y_true, y_pred),
        recall: Recall.compute(&y_true, y_pred),
        roc_auc,
    };

    Ok(Evaluation {
        engine,
        metrics,
        probability_column,
    })
}

fn labels(dataset: &Dataset, output: &str) -> Result<Vec<bool>> {
    let cells = dataset
        .column(output)
        .ok_or_else(|| Error::Dataset(format!("Missing output column: {output}")))?;
    cells
        .iter()
        .map(|cell| {
            parse_binary(cell).ok_or_else(|| {
                Error::Dataset(format!("Column {output}: {cell:?} is not a binary value"))
            })
        })
        .collect()
}

/// Save the model, log metrics, then log artifacts
///
/// Metric logging is the last fallible step, so a run that fails to save
/// its model carries no metrics.
fn record<S: ExperimentStorage, E: Engine>(
    run: &mut Run<S>,
    settings: &TrainSettings,
    evaluation: &Evaluation<E>,
) -> Result<()> {
    evaluation.engine.save(&settings.model_dir).map_err(|e| {
        error!("Failed to save model: {e}");
        e
    })?;

    let m = &evaluation.metrics;
    for (name, value) in m.entries() {
        run.log_metric(name, value)?;
    }
    info!(
        "Logged metrics: accuracy={}, f1_score={}, precision={}, recall={}, roc_auc={}",
        m.accuracy, m.f1_score, m.precision, m.recall, m.roc_auc
    );

    match run.log_artifact("model", &settings.model_dir) {
        Ok(_) => info!("Model saved and logged to tracking store"),
        Err(e) => warn!("Model saved but could not be logged: {e}"),
    }
    match run.log_artifact("config", &settings.config_path) {
        Ok(_) => info!("Model config logged to tracking store"),
        Err(e) => warn!("Could not log model config: {e}"),
    }
    Ok(())
}
