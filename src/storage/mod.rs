//! Experiment Storage Module
//!
//! Provides the `ExperimentStorage` trait and backends for persisting
//! experiment tracking data: named experiments, runs, parameters,
//! metric histories and artifacts.
//!
//! # Backends
//!
//! - `FileStorage`: Directory-backed tracking store (the default tracking URI)
//! - `InMemoryStorage`: In-memory backend for testing
//!
//! # Example
//!
//! ```
//! use pronostico::storage::{ExperimentStorage, InMemoryStorage, RunStatus};
//!
//! let mut storage = InMemoryStorage::new();
//! let exp_id = storage.create_experiment("my-experiment").unwrap();
//! let run_id = storage.create_run(&exp_id, "first").unwrap();
//! storage.start_run(&run_id).unwrap();
//! storage.log_param(&run_id, "epochs", "10").unwrap();
//! storage.log_metric(&run_id, "accuracy", 0, 0.8).unwrap();
//! storage.complete_run(&run_id, RunStatus::Success).unwrap();
//! ```

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    #[error("Experiment already exists: {0}")]
    ExperimentExists(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is created but not yet started
    Pending,
    /// Run is currently executing
    Running,
    /// Run completed successfully
    Success,
    /// Run failed with an error
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Pending => "PENDING",
            RunStatus::Running => "RUNNING",
            RunStatus::Success => "FINISHED",
            RunStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A single metric data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Training step
    pub step: u64,
    /// Metric value
    pub value: f64,
    /// Timestamp when recorded
    pub timestamp: DateTime<Utc>,
}

impl MetricPoint {
    /// Create a new metric point with current timestamp
    pub fn new(step: u64, value: f64) -> Self {
        Self {
            step,
            value,
            timestamp: Utc::now(),
        }
    }

    /// Create a metric point with specific timestamp
    pub fn with_timestamp(step: u64, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            step,
            value,
            timestamp,
        }
    }
}

/// Summary of a run, as returned by [`ExperimentStorage::list_runs`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub experiment_id: String,
    pub run_name: String,
    pub status: RunStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Trait for experiment storage backends
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; callers share a backend as
/// `Arc<Mutex<S>>`.
pub trait ExperimentStorage: Send + Sync {
    /// Create a new experiment, returning its ID
    ///
    /// Fails with `ExperimentExists` if the name is taken.
    fn create_experiment(&mut self, name: &str) -> Result<String>;

    /// Look up an experiment ID by name
    fn get_experiment_by_name(&self, name: &str) -> Result<Option<String>>;

    /// Create a new named run within an experiment
    ///
    /// The run starts in `Pending` status.
    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<String>;

    /// Start a run, transitioning from Pending to Running
    fn start_run(&mut self, run_id: &str) -> Result<()>;

    /// Complete a running run with the given status
    fn complete_run(&mut self, run_id: &str, status: RunStatus) -> Result<()>;

    /// Record a parameter; logging the same key again overwrites it
    fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()>;

    /// Log a metric value for a run
    fn log_metric(&mut self, run_id: &str, key: &str, step: u64, value: f64) -> Result<()>;

    /// Log a local file or directory under `artifact_path`
    ///
    /// Returns the content hash of the logged files.
    fn log_artifact(&mut self, run_id: &str, artifact_path: &str, local_path: &Path)
        -> Result<String>;

    /// Get metrics for a specific run and key, ordered by step
    fn get_metrics(&self, run_id: &str, key: &str) -> Result<Vec<MetricPoint>>;

    /// All parameters of a run
    fn get_params(&self, run_id: &str) -> Result<BTreeMap<String, String>>;

    /// Relative paths of every artifact file logged for a run, sorted
    fn list_artifacts(&self, run_id: &str) -> Result<Vec<String>>;

    /// Get the current status of a run
    fn get_run_status(&self, run_id: &str) -> Result<RunStatus>;

    /// All runs of an experiment, oldest first
    fn list_runs(&self, experiment_id: &str) -> Result<Vec<RunInfo>>;
}

/// Return the ID of the named experiment, creating it if missing
pub fn get_or_create_experiment<S: ExperimentStorage + ?Sized>(
    storage: &mut S,
    name: &str,
) -> Result<String> {
    match storage.get_experiment_by_name(name)? {
        Some(id) => Ok(id),
        None => storage.create_experiment(name),
    }
}

/// Lock a shared backend, mapping a poisoned lock to a backend error
pub fn lock<S: ?Sized>(storage: &Arc<Mutex<S>>) -> Result<MutexGuard<'_, S>> {
    storage
        .lock()
        .map_err(|_| StorageError::Backend("storage lock poisoned".to_string()))
}

/// One file of a logged artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArtifactFile {
    /// Path relative to the run's artifact root
    pub path: String,
    pub data: Vec<u8>,
}

/// Read the files of `local_path` (a file or a directory tree)
///
/// A file lands at `<artifact_path>/<file name>`; a directory's files keep
/// their paths relative to the directory.
pub(crate) fn collect_artifact_files(
    artifact_path: &str,
    local_path: &Path,
) -> Result<Vec<ArtifactFile>> {
    let prefix = artifact_path.trim_matches('/');
    let join = |rel: &str| {
        if prefix.is_empty() {
            rel.to_string()
        } else {
            format!("{prefix}/{rel}")
        }
    };

    let metadata = fs::metadata(local_path)?;
    if metadata.is_file() {
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(vec![ArtifactFile {
            path: join(&name),
            data: fs::read(local_path)?,
        }]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(local_path).sort_by_file_name() {
        let entry = entry.map_err(|e| StorageError::Backend(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(local_path)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(ArtifactFile {
            path: join(&rel),
            data: fs::read(entry.path())?,
        });
    }
    Ok(files)
}

/// Content hash over artifact paths and bytes
pub(crate) fn compute_hash(files: &[ArtifactFile]) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.path.as_bytes());
        hasher.update([0u8]);
        hasher.update(&file.data);
    }
    let result = hasher.finalize();
    format!("sha256-{}", hex::encode(&result[..16])) // Use first 16 bytes
}
