//! Feature encoders fitted on the training split

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::{FeatureSpec, FeatureType};
use crate::error::{Error, Result};

/// Parse a two-valued cell
pub fn parse_binary(cell: &str) -> Option<bool> {
    match cell.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        other => other.parse::<f64>().ok().map(|v| v != 0.0),
    }
}

/// Maps one input column to a fixed-width slice of the design matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeatureEncoder {
    /// One-hot with slot 0 reserved for unseen or missing values
    Category { name: String, vocab: Vec<String> },
    /// Standardized; missing cells map to the mean
    Number { name: String, mean: f64, std: f64 },
    /// 0.0 / 1.0; missing cells map to 0.0
    Binary { name: String },
}

impl FeatureEncoder {
    /// Fit an encoder on the cells of one column
    pub fn fit(spec: &FeatureSpec, cells: &[&str]) -> Result<Self> {
        let name = spec.name.clone();
        match spec.kind {
            FeatureType::Category => {
                let vocab: BTreeSet<&str> =
                    cells.iter().copied().filter(|c| !c.is_empty()).collect();
                Ok(FeatureEncoder::Category {
                    name,
                    vocab: vocab.into_iter().map(str::to_string).collect(),
                })
            }
            FeatureType::Number => {
                let mut values = Vec::with_capacity(cells.len());
                for cell in cells.iter().filter(|c| !c.is_empty()) {
                    values.push(parse_number(&spec.name, cell)?);
                }
                let (mean, std) = mean_std(&values);
                Ok(FeatureEncoder::Number { name, mean, std })
            }
            FeatureType::Binary => Ok(FeatureEncoder::Binary { name }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FeatureEncoder::Category { name, .. }
            | FeatureEncoder::Number { name, .. }
            | FeatureEncoder::Binary { name } => name,
        }
    }

    /// Number of design-matrix columns this feature occupies
    pub fn width(&self) -> usize {
        match self {
            FeatureEncoder::Category { vocab, .. } => vocab.len() + 1,
            FeatureEncoder::Number { .. } | FeatureEncoder::Binary { .. } => 1,
        }
    }

    /// Write the encoding of `cell` into `out` (length == `width()`)
    pub fn encode(&self, cell: &str, out: &mut [f64]) -> Result<()> {
        out.iter_mut().for_each(|v| *v = 0.0);
        match self {
            FeatureEncoder::Category { vocab, .. } => {
                let slot = vocab
                    .binary_search_by(|v| v.as_str().cmp(cell))
                    .map_or(0, |i| i + 1);
                out[slot] = 1.0;
            }
            FeatureEncoder::Number { name, mean, std } => {
                if !cell.is_empty() {
                    out[0] = (parse_number(name, cell)? - mean) / std;
                }
            }
            FeatureEncoder::Binary { name } => {
                if !cell.is_empty() {
                    let value = parse_binary(cell).ok_or_else(|| {
                        Error::Dataset(format!("Column {name}: {cell:?} is not a binary value"))
                    })?;
                    out[0] = if value { 1.0 } else { 0.0 };
                }
            }
        }
        Ok(())
    }
}

fn parse_number(column: &str, cell: &str) -> Result<f64> {
    cell.trim()
        .parse::<f64>()
        .map_err(|_| Error::Dataset(format!("Column {column}: {cell:?} is not a number")))
}

/// Population mean and standard deviation; a zero spread becomes 1.0
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    (mean, if std > 1e-12 { std } else { 1.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary() {
        assert_eq!(parse_binary("1"), Some(true));
        assert_eq!(parse_binary("True"), Some(true));
        assert_eq!(parse_binary("0"), Some(false));
        assert_eq!(parse_binary("no"), Some(false));
        assert_eq!(parse_binary("0.0"), Some(false));
        assert_eq!(parse_binary("maybe"), None);
    }

    #[test]
    fn test_category_one_hot_with_unknown_slot() {
        let spec = FeatureSpec::new("Sex", FeatureType::Category);
        let enc = FeatureEncoder::fit(&spec, &["male", "female", "male", ""]).unwrap();
        assert_eq!(enc.width(), 3);

        let mut out = vec![0.0; 3];
        enc.encode("female", &mut out).unwrap();
        assert_eq!(out, vec![0.0, 1.0, 0.0]);
        enc.encode("male", &mut out).unwrap();
        assert_eq!(out, vec![0.0, 0.0, 1.0]);
        enc.encode("other", &mut out).unwrap();
        assert_eq!(out, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_number_standardized() {
        let spec = FeatureSpec::new("Age", FeatureType::Number);
        let enc = FeatureEncoder::fit(&spec, &["10", "30", ""]).unwrap();
        let mut out = [0.0];
        enc.encode("30", &mut out).unwrap();
        assert!((out[0] - 1.0).abs() < 1e-12);
        enc.encode("", &mut out).unwrap();
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn test_number_constant_column() {
        let spec = FeatureSpec::new("Parch", FeatureType::Number);
        let enc = FeatureEncoder::fit(&spec, &["2", "2"]).unwrap();
        let mut out = [0.0];
        enc.encode("3", &mut out).unwrap();
        assert!((out[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_number_bad_cell() {
        let spec = FeatureSpec::new("Fare", FeatureType::Number);
        assert!(FeatureEncoder::fit(&spec, &["abc"]).is_err());

        let enc = FeatureEncoder::fit(&spec, &["1", "2"]).unwrap();
        let mut out = [0.0];
        assert!(matches!(
            enc.encode("abc", &mut out),
            Err(Error::Dataset(_))
        ));
    }

    #[test]
    fn test_encoder_serde_tagged() {
        let enc = FeatureEncoder::Number {
            name: "Age".into(),
            mean: 29.0,
            std: 14.0,
        };
        let json = serde_json::to_value(&enc).unwrap();
        assert_eq!(json["type"], "number");
        let back: FeatureEncoder = serde_json::from_value(json).unwrap();
        assert_eq!(back, enc);
    }
}
