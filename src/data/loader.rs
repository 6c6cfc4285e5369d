//! Dataset acquisition
//!
//! Downloads the raw passenger CSV, renames the two relationship columns
//! to the names the model configuration expects, and persists the result.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use super::Dataset;
use crate::error::Result;

/// Raw column name → configured feature name
pub const COLUMN_RENAMES: [(&str, &str); 2] = [
    ("Siblings/Spouses Aboard", "SibSp"),
    ("Parents/Children Aboard", "Parch"),
];

/// Where the raw CSV comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Fetched over HTTP(S)
    Url(String),
    /// Read from the local filesystem
    File(PathBuf),
}

impl DatasetSource {
    /// Read the raw dataset without renaming anything
    pub fn read(&self) -> Result<Dataset> {
        match self {
            DatasetSource::Url(url) => {
                let body = fetch_csv(url)?;
                Dataset::from_csv_str(&body)
            }
            DatasetSource::File(path) => Dataset::load(path),
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Url(url) => write!(f, "{url}"),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// GET a CSV document; non-2xx statuses are errors
pub fn fetch_csv(url: &str) -> Result<String> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(response.text()?)
}

/// Fetch, rename and persist the dataset
///
/// Any fetch, parse or write failure is logged and returned; there is no retry.
pub fn download_dataset(source: &DatasetSource, dest: &Path) -> Result<Dataset> {
    let result = read_and_rename(source).and_then(|dataset| {
        dataset.save(dest)?;
        Ok(dataset)
    });

    match result {
        Ok(dataset) => {
            info!(
                rows = dataset.len(),
                "Dataset downloaded from {source} and saved as {}",
                dest.display()
            );
            Ok(dataset)
        }
        Err(e) => {
            error!("Failed to download dataset: {e}");
            Err(e)
        }
    }
}

fn read_and_rename(source: &DatasetSource) -> Result<Dataset> {
    let mut dataset = source.read()?;
    dataset.rename_columns(&COLUMN_RENAMES);
    Ok(dataset)
}
