//! Config-driven logistic classifier

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::encoder::{parse_binary, FeatureEncoder};
use super::frame::{predictions_column, ColumnData, PredictionFrame};
use super::{Engine, EngineFactory, FeatureStats, MetricValue, Predictor, TrainingStats};
use crate::config::{build_optimizer, validate_config, ModelConfig};
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::train::{log_loss, roc_auc, Accuracy, F1Score, Metric};

const HYPERPARAMETERS_FILE: &str = "model_hyperparameters.yaml";
const METADATA_FILE: &str = "training_set_metadata.json";
const WEIGHTS_FILE: &str = "model_weights.json";

/// Train / validation / test fractions of the shuffled dataset
const SPLIT: (f64, f64) = (0.7, 0.1);

const THRESHOLD: f64 = 0.5;

#[derive(Debug, Serialize, Deserialize)]
struct Weights {
    weights: Vec<f64>,
    bias: f64,
}

/// Binary logistic regression over encoded input features
///
/// Rows are shuffled with a seeded RNG and split 70/10/20 into training,
/// validation and test sets. Encoders are fitted on the training split only.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    config: ModelConfig,
    encoders: Vec<FeatureEncoder>,
    weights: Array1<f64>,
    bias: f64,
    seed: u64,
}

impl LogisticModel {
    /// Create an untrained model; the configuration must validate
    pub fn new(config: ModelConfig, seed: u64) -> Result<Self> {
        validate_config(&config).map_err(|e| Error::Model(e.to_string()))?;
        Ok(Self {
            config,
            encoders: Vec::new(),
            weights: Array1::zeros(0),
            bias: 0.0,
            seed,
        })
    }

    /// Load a model directory written by [`Engine::save`]
    pub fn load(dir: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(dir.join(HYPERPARAMETERS_FILE))?;
        let config: ModelConfig =
            serde_yaml::from_str(&yaml).map_err(|e| Error::Serialization(e.to_string()))?;

        let metadata = fs::read_to_string(dir.join(METADATA_FILE))?;
        let encoders: Vec<FeatureEncoder> =
            serde_json::from_str(&metadata).map_err(|e| Error::Serialization(e.to_string()))?;

        let weights = fs::read_to_string(dir.join(WEIGHTS_FILE))?;
        let weights: Weights =
            serde_json::from_str(&weights).map_err(|e| Error::Serialization(e.to_string()))?;

        let width: usize = encoders.iter().map(FeatureEncoder::width).sum();
        if width != weights.weights.len() {
            return Err(Error::Model(format!(
                "Model has {} weights but its encoders produce {width} columns",
                weights.weights.len()
            )));
        }

        let mut model = Self::new(config, 0)?;
        model.encoders = encoders;
        model.weights = Array1::from(weights.weights);
        model.bias = weights.bias;
        Ok(model)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        !self.encoders.is_empty()
    }

    fn labels(&self, dataset: &Dataset) -> Result<Vec<bool>> {
        let target = self.config.target_name();
        let cells = dataset
            .column(target)
            .ok_or_else(|| Error::Dataset(format!("Missing output column: {target}")))?;
        cells
            .iter()
            .map(|cell| {
                parse_binary(cell).ok_or_else(|| {
                    Error::Dataset(format!("Column {target}: {cell:?} is not a binary value"))
                })
            })
            .collect()
    }

    fn fit_encoders(&mut self, train: &Dataset) -> Result<()> {
        let mut encoders = Vec::with_capacity(self.config.input_features.len());
        for spec in &self.config.input_features {
            let cells = train
                .column(&spec.name)
                .ok_or_else(|| Error::Dataset(format!("Missing input column: {}", spec.name)))?;
            encoders.push(FeatureEncoder::fit(spec, &cells)?);
        }
        self.encoders = encoders;
        Ok(())
    }

    fn design_matrix(&self, dataset: &Dataset) -> Result<Array2<f64>> {
        let mut columns = Vec::with_capacity(self.encoders.len());
        for encoder in &self.encoders {
            let idx = dataset.column_index(encoder.name()).ok_or_else(|| {
                Error::Dataset(format!("Missing input column: {}", encoder.name()))
            })?;
            columns.push((idx, encoder));
        }

        let width: usize = self.encoders.iter().map(FeatureEncoder::width).sum();
        let mut data = vec![0.0; dataset.len() * width];
        for (row, record) in data.chunks_mut(width.max(1)).zip(dataset.records()) {
            let mut offset = 0;
            for (idx, encoder) in &columns {
                let w = encoder.width();
                encoder.encode(&record[*idx], &mut row[offset..offset + w])?;
                offset += w;
            }
        }

        Array2::from_shape_vec((dataset.len(), width), data)
            .map_err(|e| Error::Model(e.to_string()))
    }

    fn probabilities(&self, x: &Array2<f64>) -> Array1<f64> {
        (x.dot(&self.weights) + self.bias).mapv(sigmoid)
    }
}

/// Numerically stable logistic function
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Shuffled row indices split into train / validation / test
fn split_indices(n: usize, seed: u64) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_train = ((n as f64 * SPLIT.0).round() as usize).clamp(n.min(1), n);
    let n_val = ((n as f64 * SPLIT.1).round() as usize).min(n - n_train);

    let test = indices.split_off(n_train + n_val);
    let validation = indices.split_off(n_train);
    (indices, validation, test)
}

/// Per-epoch metric histories for one split
#[derive(Default)]
struct History {
    loss: Vec<f64>,
    accuracy: Vec<f64>,
    f1_score: Vec<f64>,
    roc_auc: Vec<f64>,
}

impl History {
    fn record(&mut self, y: &[bool], probs: &[f64]) {
        let preds: Vec<bool> = probs.iter().map(|&p| p >= THRESHOLD).collect();
        self.loss.push(log_loss(y, probs));
        self.accuracy.push(Accuracy.compute(y, &preds));
        self.f1_score.push(F1Score.compute(y, &preds));
        if let Some(auc) = roc_auc(y, probs) {
            self.roc_auc.push(auc);
        }
    }

    fn into_stats(self) -> FeatureStats {
        let mut stats = BTreeMap::new();
        stats.insert("loss".to_string(), MetricValue::History(self.loss));
        stats.insert(Accuracy.name().to_string(), MetricValue::History(self.accuracy));
        stats.insert(F1Score.name().to_string(), MetricValue::History(self.f1_score));
        if !self.roc_auc.is_empty() {
            stats.insert("roc_auc".to_string(), MetricValue::History(self.roc_auc));
        }
        stats
    }
}

/// Design matrix and labels of one split
struct Split {
    x: Array2<f64>,
    y: Vec<bool>,
    history: History,
}

impl Predictor for LogisticModel {
    fn output_feature(&self) -> &str {
        self.config.target_name()
    }

    fn predict(&self, dataset: &Dataset) -> Result<PredictionFrame> {
        if !self.is_trained() {
            return Err(Error::Model("Model has not been trained".to_string()));
        }

        let x = self.design_matrix(dataset)?;
        let probs = self.probabilities(&x).to_vec();
        let out = self.output_feature();

        PredictionFrame::new()
            .with_column(
                predictions_column(out),
                ColumnData::Bool(probs.iter().map(|&p| p >= THRESHOLD).collect()),
            )?
            .with_column(
                format!("{out}_probabilities_False"),
                ColumnData::Float(probs.iter().map(|p| 1.0 - p).collect()),
            )?
            .with_column(
                format!("{out}_probabilities_True"),
                ColumnData::Float(probs.clone()),
            )?
            .with_column(
                format!("{out}_probability"),
                ColumnData::Float(probs.iter().map(|&p| p.max(1.0 - p)).collect()),
            )
    }
}

impl Engine for LogisticModel {
    fn train(&mut self, dataset: &Dataset) -> Result<TrainingStats> {
        if dataset.is_empty() {
            return Err(Error::Training("Dataset has no rows".to_string()));
        }

        let labels = self.labels(dataset)?;
        let (train_idx, val_idx, test_idx) = split_indices(dataset.len(), self.seed);
        self.fit_encoders(&dataset.select_rows(&train_idx))?;

        let mut splits = Vec::with_capacity(3);
        for indices in [&train_idx, &val_idx, &test_idx] {
            splits.push(Split {
                x: self.design_matrix(&dataset.select_rows(indices))?,
                y: indices.iter().map(|&i| labels[i]).collect(),
                history: History::default(),
            });
        }

        let trainer = &self.config.trainer;
        let mut optimizer = build_optimizer(&trainer.optimizer, trainer.learning_rate)?;
        let width = splits[0].x.ncols();
        let mut params = vec![Array1::zeros(width), Array1::zeros(1)];
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let mut order: Vec<usize> = (0..splits[0].y.len()).collect();

        tracing::debug!(
            train = train_idx.len(),
            validation = val_idx.len(),
            test = test_idx.len(),
            width,
            lr = optimizer.lr(),
            "Training logistic model"
        );

        for epoch in 0..trainer.epochs {
            order.shuffle(&mut rng);
            let train = &splits[0];
            for batch in order.chunks(trainer.batch_size.max(1)) {
                let xb = train.x.select(Axis(0), batch);
                let yb: Array1<f64> = batch
                    .iter()
                    .map(|&i| if train.y[i] { 1.0 } else { 0.0 })
                    .collect();

                let z = xb.dot(&params[0]) + params[1][0];
                let err = z.mapv(sigmoid) - &yb;
                let m = batch.len() as f64;
                let grad_w = xb.t().dot(&err) / m;
                let grad_b = Array1::from_elem(1, err.sum() / m);

                optimizer.step(&mut params, &[grad_w, grad_b]);
            }

            if params[0].iter().any(|w| !w.is_finite()) || !params[1][0].is_finite() {
                return Err(Error::Training(format!(
                    "Weights diverged at epoch {}",
                    epoch + 1
                )));
            }

            self.weights = params[0].clone();
            self.bias = params[1][0];
            for split in splits.iter_mut().filter(|s| !s.y.is_empty()) {
                let probs = self.probabilities(&split.x).to_vec();
                split.history.record(&split.y, &probs);
            }

            tracing::debug!(
                epoch = epoch + 1,
                loss = splits[0].history.loss.last().copied().unwrap_or_default(),
                "Epoch complete"
            );
        }

        let out = self.output_feature().to_string();
        let mut stats = TrainingStats::default();
        let targets = [
            &mut stats.training,
            &mut stats.validation,
            &mut stats.test,
        ];
        for (split, target) in splits.into_iter().zip(targets) {
            if !split.y.is_empty() {
                target.insert(out.clone(), split.history.into_stats());
            }
        }
        Ok(stats)
    }

    fn save(&self, dir: &Path) -> Result<()> {
        if !self.is_trained() {
            return Err(Error::Model("Cannot save an untrained model".to_string()));
        }
        fs::create_dir_all(dir)?;

        let yaml =
            serde_yaml::to_string(&self.config).map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(dir.join(HYPERPARAMETERS_FILE), yaml)?;

        let metadata = serde_json::to_string_pretty(&self.encoders)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(dir.join(METADATA_FILE), metadata)?;

        let weights = Weights {
            weights: self.weights.to_vec(),
            bias: self.bias,
        };
        let weights = serde_json::to_string_pretty(&weights)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(dir.join(WEIGHTS_FILE), weights)?;

        Ok(())
    }
}

/// Builds [`LogisticModel`]s with a fixed shuffling seed
#[derive(Debug, Clone, Copy)]
pub struct LogisticEngineFactory {
    pub seed: u64,
}

impl Default for LogisticEngineFactory {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl EngineFactory for LogisticEngineFactory {
    type Engine = LogisticModel;

    fn build(&self, config: &ModelConfig) -> Result<LogisticModel> {
        LogisticModel::new(config.clone(), self.seed)
    }
}
