//! Tracked run handle
//!
//! `Run` wraps one experiment-tracking run: it creates and starts the run
//! in the storage backend, owns a `tracing` span that every log line of the
//! run is recorded under, and finishes the run exactly once.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use pronostico::storage::{ExperimentStorage, InMemoryStorage, RunStatus};
//! use pronostico::run::Run;
//!
//! let mut storage = InMemoryStorage::new();
//! let exp_id = storage.create_experiment("my-exp").unwrap();
//! let storage = Arc::new(Mutex::new(storage));
//!
//! let mut run = Run::new(&exp_id, "first", storage.clone()).unwrap();
//!
//! // Log metrics - auto-increments step
//! run.log_metric("loss", 0.5).unwrap();
//! run.log_metric("loss", 0.4).unwrap();
//!
//! // Or log with explicit step
//! run.log_metric_at("accuracy", 0, 0.85).unwrap();
//!
//! // Complete the run
//! run.finish(RunStatus::Success).unwrap();
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Span;

use crate::storage::{lock, ExperimentStorage, Result, RunStatus, StorageError};

/// A tracked run
///
/// Generic over the storage backend, allowing different backends
/// for the CLI (FileStorage) and tests (InMemoryStorage).
pub struct Run<S: ExperimentStorage> {
    /// Run ID
    pub id: String,
    /// Parent experiment ID
    pub experiment_id: String,
    /// Human-readable run name
    pub name: String,
    /// Storage backend (shared)
    storage: Arc<Mutex<S>>,
    span: Span,
    /// Current step counters per metric key
    step_counters: HashMap<String, u64>,
    /// Whether the run has been finished
    finished: bool,
}

impl<S: ExperimentStorage> Run<S> {
    /// Create and start a run in `experiment_id`
    pub fn new(experiment_id: &str, name: &str, storage: Arc<Mutex<S>>) -> Result<Self> {
        let run_id = {
            let mut store = lock(&storage)?;
            let run_id = store.create_run(experiment_id, name)?;
            store.start_run(&run_id)?;
            run_id
        };

        let span = tracing::info_span!("run", run_id = %run_id, run_name = %name);
        span.in_scope(|| tracing::debug!(experiment_id, "Run started"));

        Ok(Self {
            id: run_id,
            experiment_id: experiment_id.to_string(),
            name: name.to_string(),
            storage,
            span,
            step_counters: HashMap::new(),
            finished: false,
        })
    }

    fn ensure_active(&self) -> Result<()> {
        if self.finished {
            return Err(StorageError::InvalidState(
                "Cannot log to finished run".to_string(),
            ));
        }
        Ok(())
    }

    /// Record a parameter
    pub fn log_param(&mut self, key: &str, value: impl ToString) -> Result<()> {
        self.ensure_active()?;
        let value = value.to_string();
        lock(&self.storage)?.log_param(&self.id, key, &value)?;
        self.span
            .in_scope(|| tracing::debug!(key, value = %value, "param"));
        Ok(())
    }

    /// Log a metric value, auto-incrementing the step
    ///
    /// Each metric key has its own step counter that starts at 0
    /// and increments with each call.
    pub fn log_metric(&mut self, key: &str, value: f64) -> Result<()> {
        let step = self.current_step(key);
        self.log_metric_at(key, step, value)?;
        self.step_counters.insert(key.to_string(), step + 1);
        Ok(())
    }

    /// Log a metric value at a specific step
    pub fn log_metric_at(&mut self, key: &str, step: u64, value: f64) -> Result<()> {
        self.ensure_active()?;
        lock(&self.storage)?.log_metric(&self.id, key, step, value)?;
        self.span
            .in_scope(|| tracing::debug!(key, step, value, "metric"));
        Ok(())
    }

    /// Log a local file or directory under `artifact_path`
    pub fn log_artifact(&mut self, artifact_path: &str, local_path: &Path) -> Result<String> {
        self.ensure_active()?;
        let hash = lock(&self.storage)?.log_artifact(&self.id, artifact_path, local_path)?;
        self.span.in_scope(|| {
            tracing::debug!(artifact_path, local_path = %local_path.display(), hash = %hash, "artifact")
        });
        Ok(hash)
    }

    /// Finish the run with the given status
    ///
    /// Consumes the Run to prevent further operations.
    pub fn finish(mut self, status: RunStatus) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        lock(&self.storage)?.complete_run(&self.id, status)?;
        self.finished = true;
        self.span
            .in_scope(|| tracing::debug!(status = %status, "Run finished"));

        Ok(())
    }

    /// The span this run's log lines are recorded under
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Get the run ID
    pub fn run_id(&self) -> &str {
        &self.id
    }

    /// Check if the run has been finished
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get current step for a metric key
    pub fn current_step(&self, key: &str) -> u64 {
        self.step_counters.get(key).copied().unwrap_or(0)
    }
}

impl<S: ExperimentStorage> std::fmt::Debug for Run<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run")
            .field("id", &self.id)
            .field("experiment_id", &self.experiment_id)
            .field("name", &self.name)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
