//! Evaluation metrics for binary classification
//!
//! Labels and predictions are booleans (`true` = positive class);
//! ROC-AUC and log loss take positive-class scores.
//!
//! Every ratio with a zero denominator evaluates to 0.0.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::engine::MetricValue;

/// Trait for label-vs-prediction metrics
pub trait Metric {
    /// Compute the metric given ground truth and predicted labels
    fn compute(&self, y_true: &[bool], y_pred: &[bool]) -> f64;

    /// Name under which the metric is logged
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Confusion {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl Confusion {
    fn count(y_true: &[bool], y_pred: &[bool]) -> Self {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "Predictions and targets must have same length"
        );

        let mut c = Confusion::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (true, true) => c.tp += 1,
                (false, true) => c.fp += 1,
                (false, false) => c.tn += 1,
                (true, false) => c.fn_ += 1,
            }
        }
        c
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Fraction of correct predictions
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl Metric for Accuracy {
    fn compute(&self, y_true: &[bool], y_pred: &[bool]) -> f64 {
        let c = Confusion::count(y_true, y_pred);
        ratio(c.tp + c.tn, y_true.len())
    }

    fn name(&self) -> &str {
        "accuracy"
    }
}

/// True positives / predicted positives
///
/// # Example
///
/// ```
/// use pronostico::train::{Metric, Precision};
///
/// let prec = Precision.compute(&[true, false, false], &[true, true, false]);
/// assert_eq!(prec, 0.5);  // 1 TP / 2 predicted positives
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Precision;

impl Metric for Precision {
    fn compute(&self, y_true: &[bool], y_pred: &[bool]) -> f64 {
        let c = Confusion::count(y_true, y_pred);
        ratio(c.tp, c.tp + c.fp)
    }

    fn name(&self) -> &str {
        "precision"
    }
}

/// True positives / actual positives
///
/// # Example
///
/// ```
/// use pronostico::train::{Metric, Recall};
///
/// let rec = Recall.compute(&[true, true, false], &[true, false, true]);
/// assert_eq!(rec, 0.5);  // 1 TP / 2 actual positives
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Recall;

impl Metric for Recall {
    fn compute(&self, y_true: &[bool], y_pred: &[bool]) -> f64 {
        let c = Confusion::count(y_true, y_pred);
        ratio(c.tp, c.tp + c.fn_)
    }

    fn name(&self) -> &str {
        "recall"
    }
}

/// F1 Score (harmonic mean of precision and recall)
///
/// F1 = 2 * (precision * recall) / (precision + recall)
#[derive(Debug, Clone, Copy, Default)]
pub struct F1Score;

impl Metric for F1Score {
    fn compute(&self, y_true: &[bool], y_pred: &[bool]) -> f64 {
        let precision = Precision.compute(y_true, y_pred);
        let recall = Recall.compute(y_true, y_pred);

        if precision + recall == 0.0 {
            return 0.0;
        }

        2.0 * (precision * recall) / (precision + recall)
    }

    fn name(&self) -> &str {
        "f1_score"
    }
}

/// Area under the ROC curve
///
/// Computed from the rank-sum of positive scores, with tied scores sharing
/// their average rank. Undefined (`None`) unless both classes are present.
pub fn roc_auc(y_true: &[bool], scores: &[f64]) -> Option<f64> {
    assert_eq!(y_true.len(), scores.len());

    let n_pos = y_true.iter().filter(|&&t| t).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len()
            && scores[order[j + 1]].total_cmp(&scores[order[i]]) == Ordering::Equal
        {
            j += 1;
        }
        // ranks i+1 ..= j+1 share their mean
        let avg_rank = (i + j + 2) as f64 / 2.0;
        rank_sum_pos += order[i..=j].iter().filter(|&&k| y_true[k]).count() as f64 * avg_rank;
        i = j + 1;
    }

    let n_pos_f = n_pos as f64;
    Some((rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64))
}

/// Mean binary cross-entropy of positive-class probabilities
pub fn log_loss(y_true: &[bool], probs: &[f64]) -> f64 {
    assert_eq!(y_true.len(), probs.len());
    if y_true.is_empty() {
        return 0.0;
    }

    const EPS: f64 = 1e-15;
    let total: f64 = y_true
        .iter()
        .zip(probs)
        .map(|(&t, &p)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            if t {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / y_true.len() as f64
}

/// Final value of a logged metric
///
/// A per-epoch history yields its last element (0.0 when empty); a scalar is
/// returned unchanged.
pub fn safe_last_value(metric: &MetricValue) -> f64 {
    match metric {
        MetricValue::Scalar(v) => *v,
        MetricValue::History(values) => values.last().copied().unwrap_or(0.0),
    }
}

/// The five metrics recorded for every run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub accuracy: f64,
    pub f1_score: f64,
    pub precision: f64,
    pub recall: f64,
    pub roc_auc: f64,
}

impl MetricRecord {
    /// Metric names paired with values, in logging order
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("accuracy", self.accuracy),
            ("f1_score", self.f1_score),
            ("precision", self.precision),
            ("recall", self.recall),
            ("roc_auc", self.roc_auc),
        ]
    }
}
