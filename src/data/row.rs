//! Single passenger feature row

use serde::{Deserialize, Serialize};

use super::Dataset;
use crate::error::Result;

/// Column names of a feature row, in the order they are written
pub const FEATURE_COLUMNS: [&str; 6] = ["Pclass", "Sex", "Age", "SibSp", "Parch", "Fare"];

/// One record of model input fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Ticket class (1, 2 or 3)
    pub pclass: i64,
    /// "male" or "female"
    pub sex: String,
    pub age: f64,
    /// Siblings and spouses aboard
    pub sib_sp: i64,
    /// Parents and children aboard
    pub parch: i64,
    pub fare: f64,
}

impl FeatureRow {
    /// Cell values aligned with [`FEATURE_COLUMNS`]
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.pclass.to_string(),
            self.sex.clone(),
            self.age.to_string(),
            self.sib_sp.to_string(),
            self.parch.to_string(),
            self.fare.to_string(),
        ]
    }

    /// A one-row dataset the engine can predict on
    pub fn to_dataset(&self) -> Result<Dataset> {
        Dataset::new(
            FEATURE_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            vec![self.cells()],
        )
    }
}
