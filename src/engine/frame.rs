//! Prediction output frame and the probability-column lookup

use crate::error::{Error, Result};

/// Tokens that mark the positive-class probability column
pub const POSITIVE_LABELS: [&str; 2] = ["True", "1"];

/// Values of one output column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Bool(Vec<bool>),
    Float(Vec<f64>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Bool(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named output column
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionColumn {
    pub name: String,
    pub data: ColumnData,
}

/// Column-oriented prediction results, one row per input row
///
/// The logistic engine emits `<out>_predictions`,
/// `<out>_probabilities_False`, `<out>_probabilities_True` and
/// `<out>_probability`; consumers must not rely on any column other than
/// `<out>_predictions` being present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionFrame {
    columns: Vec<PredictionColumn>,
}

impl PredictionFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; its length must match the existing columns
    pub fn push(&mut self, name: impl Into<String>, data: ColumnData) -> Result<()> {
        let name = name.into();
        if let Some(first) = self.columns.first() {
            if first.data.len() != data.len() {
                return Err(Error::Model(format!(
                    "Column {name} has {} rows, expected {}",
                    data.len(),
                    first.data.len()
                )));
            }
        }
        self.columns.push(PredictionColumn { name, data });
        Ok(())
    }

    /// Builder-style [`push`](Self::push)
    pub fn with_column(mut self, name: impl Into<String>, data: ColumnData) -> Result<Self> {
        self.push(name, data)?;
        Ok(self)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    pub fn bools(&self, name: &str) -> Option<&[bool]> {
        match self.column(name)? {
            ColumnData::Bool(v) => Some(v),
            ColumnData::Float(_) => None,
        }
    }

    pub fn floats(&self, name: &str) -> Option<&[f64]> {
        match self.column(name)? {
            ColumnData::Float(v) => Some(v),
            ColumnData::Bool(_) => None,
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Name of the predictions column for an output feature
pub fn predictions_column(output_feature: &str) -> String {
    format!("{output_feature}_predictions")
}

/// Locate the positive-class probability column
///
/// Returns the first column whose name contains
/// `<output_feature>_probabilities` and any of `positive_labels`.
pub fn find_probability_column<S: AsRef<str>>(
    columns: &[S],
    output_feature: &str,
    positive_labels: &[&str],
) -> Option<String> {
    let marker = format!("{output_feature}_probabilities");
    columns
        .iter()
        .map(AsRef::<str>::as_ref)
        .find(|col| col.contains(&marker) && positive_labels.iter().any(|l| col.contains(l)))
        .map(str::to_string)
}
