//! Tabular data: datasets, feature rows and the dataset loader

mod dataset;
mod loader;
mod row;

pub use dataset::Dataset;
pub use loader::{download_dataset, fetch_csv, DatasetSource, COLUMN_RENAMES};
pub use row::{FeatureRow, FEATURE_COLUMNS};
