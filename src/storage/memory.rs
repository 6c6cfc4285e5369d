//! In-Memory Storage Backend
//!
//! Provides an in-memory implementation of `ExperimentStorage` for tests
//! and dry runs where nothing should touch the tracking directory.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use super::{
    collect_artifact_files, compute_hash, ExperimentStorage, MetricPoint, Result, RunInfo,
    RunStatus, StorageError,
};

/// In-memory experiment storage backend
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    experiments: HashMap<String, ExperimentData>,
    runs: HashMap<String, RunData>,
    metrics: HashMap<String, Vec<MetricData>>, // run_id:key -> metrics
    next_exp_id: AtomicU64,
    next_run_id: AtomicU64,
}

#[derive(Debug, Clone)]
struct ExperimentData {
    name: String,
}

#[derive(Debug, Clone)]
struct RunData {
    seq: u64,
    experiment_id: String,
    name: String,
    status: RunStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    params: BTreeMap<String, String>,
    artifacts: BTreeMap<String, Vec<u8>>, // relative path -> data
}

#[derive(Debug, Clone)]
struct MetricData {
    step: u64,
    value: f64,
    timestamp: DateTime<Utc>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of experiments
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Get the number of runs
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Get the number of metric entries (run_id:key combinations)
    pub fn metric_key_count(&self) -> usize {
        self.metrics.len()
    }

    /// Get the number of artifact files across all runs
    pub fn artifact_count(&self) -> usize {
        self.runs.values().map(|r| r.artifacts.len()).sum()
    }

    /// Bytes of one logged artifact file
    pub fn artifact(&self, run_id: &str, path: &str) -> Option<&[u8]> {
        self.runs
            .get(run_id)?
            .artifacts
            .get(path)
            .map(Vec::as_slice)
    }

    fn run(&self, run_id: &str) -> Result<&RunData> {
        self.runs
            .get(run_id)
            .ok_or_else(|| StorageError::RunNotFound(run_id.to_string()))
    }

    fn run_mut(&mut self, run_id: &str) -> Result<&mut RunData> {
        self.runs
            .get_mut(run_id)
            .ok_or_else(|| StorageError::RunNotFound(run_id.to_string()))
    }
}

impl ExperimentStorage for InMemoryStorage {
    fn create_experiment(&mut self, name: &str) -> Result<String> {
        if self.experiments.values().any(|e| e.name == name) {
            return Err(StorageError::ExperimentExists(name.to_string()));
        }

        let id = self.next_exp_id.fetch_add(1, Ordering::SeqCst);
        let exp_id = format!("exp-{id}");

        self.experiments.insert(
            exp_id.clone(),
            ExperimentData {
                name: name.to_string(),
            },
        );

        Ok(exp_id)
    }

    fn get_experiment_by_name(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .experiments
            .iter()
            .find(|(_, e)| e.name == name)
            .map(|(id, _)| id.clone()))
    }

    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<String> {
        if !self.experiments.contains_key(experiment_id) {
            return Err(StorageError::ExperimentNotFound(experiment_id.to_string()));
        }

        let id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
        let run_id = format!("run-{id}");

        self.runs.insert(
            run_id.clone(),
            RunData {
                seq: id,
                experiment_id: experiment_id.to_string(),
                name: run_name.to_string(),
                status: RunStatus::Pending,
                start_time: None,
                end_time: None,
                params: BTreeMap::new(),
                artifacts: BTreeMap::new(),
            },
        );

        Ok(run_id)
    }

    fn start_run(&mut self, run_id: &str) -> Result<()> {
        let run = self.run_mut(run_id)?;

        if run.status != RunStatus::Pending {
            return Err(StorageError::InvalidState(format!(
                "Run {run_id} is not in Pending state"
            )));
        }

        run.status = RunStatus::Running;
        run.start_time = Some(Utc::now());
        Ok(())
    }

    fn complete_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let run = self.run_mut(run_id)?;

        if run.status != RunStatus::Running {
            return Err(StorageError::InvalidState(format!(
                "Run {run_id} is not in Running state"
            )));
        }

        run.status = status;
        run.end_time = Some(Utc::now());
        Ok(())
    }

    fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.run_mut(run_id)?
            .params
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn log_metric(&mut self, run_id: &str, key: &str, step: u64, value: f64) -> Result<()> {
        self.run(run_id)?;

        let metric_key = format!("{run_id}:{key}");
        let metrics = self.metrics.entry(metric_key).or_default();

        metrics.push(MetricData {
            step,
            value,
            timestamp: Utc::now(),
        });

        Ok(())
    }

    fn log_artifact(
        &mut self,
        run_id: &str,
        artifact_path: &str,
        local_path: &Path,
    ) -> Result<String> {
        self.run(run_id)?;

        let files = collect_artifact_files(artifact_path, local_path)?;
        let hash = compute_hash(&files);

        let run = self.run_mut(run_id)?;
        for file in files {
            run.artifacts.insert(file.path, file.data);
        }

        Ok(hash)
    }

    fn get_metrics(&self, run_id: &str, key: &str) -> Result<Vec<MetricPoint>> {
        self.run(run_id)?;

        let metric_key = format!("{run_id}:{key}");
        let metrics = self.metrics.get(&metric_key).cloned().unwrap_or_default();

        let mut points: Vec<MetricPoint> = metrics
            .into_iter()
            .map(|m| MetricPoint::with_timestamp(m.step, m.value, m.timestamp))
            .collect();

        // Sort by step
        points.sort_by_key(|p| p.step);

        Ok(points)
    }

    fn get_params(&self, run_id: &str) -> Result<BTreeMap<String, String>> {
        Ok(self.run(run_id)?.params.clone())
    }

    fn list_artifacts(&self, run_id: &str) -> Result<Vec<String>> {
        Ok(self.run(run_id)?.artifacts.keys().cloned().collect())
    }

    fn get_run_status(&self, run_id: &str) -> Result<RunStatus> {
        self.run(run_id).map(|r| r.status)
    }

    fn list_runs(&self, experiment_id: &str) -> Result<Vec<RunInfo>> {
        if !self.experiments.contains_key(experiment_id) {
            return Err(StorageError::ExperimentNotFound(experiment_id.to_string()));
        }

        let mut runs: Vec<(&String, &RunData)> = self
            .runs
            .iter()
            .filter(|(_, r)| r.experiment_id == experiment_id)
            .collect();
        runs.sort_by_key(|(_, r)| r.seq);

        Ok(runs
            .into_iter()
            .map(|(id, r)| RunInfo {
                run_id: id.clone(),
                experiment_id: r.experiment_id.clone(),
                run_name: r.name.clone(),
                status: r.status,
                start_time: r.start_time,
                end_time: r.end_time,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn with_run() -> (InMemoryStorage, String) {
        let mut storage = InMemoryStorage::new();
        let exp_id = storage.create_experiment("test-exp").unwrap();
        let run_id = storage.create_run(&exp_id, "test-run").unwrap();
        (storage, run_id)
    }

    #[test]
    fn test_in_memory_storage_new() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.experiment_count(), 0);
        assert_eq!(storage.run_count(), 0);
    }

    #[test]
    fn test_create_experiment() {
        let mut storage = InMemoryStorage::new();
        let exp_id = storage.create_experiment("test-exp").unwrap();

        assert!(exp_id.starts_with("exp-"));
        assert_eq!(storage.experiment_count(), 1);
        assert_eq!(
            storage.get_experiment_by_name("test-exp").unwrap(),
            Some(exp_id)
        );
        assert_eq!(storage.get_experiment_by_name("other").unwrap(), None);
    }

    #[test]
    fn test_create_experiment_duplicate_name() {
        let mut storage = InMemoryStorage::new();
        storage.create_experiment("test-exp").unwrap();
        let result = storage.create_experiment("test-exp");

        match result.unwrap_err() {
            StorageError::ExperimentExists(name) => assert_eq!(name, "test-exp"),
            e => panic!("Expected ExperimentExists, got {e:?}"),
        }
    }

    #[test]
    fn test_create_run() {
        let (storage, run_id) = with_run();

        assert!(run_id.starts_with("run-"));
        assert_eq!(storage.run_count(), 1);
        assert_eq!(storage.get_run_status(&run_id).unwrap(), RunStatus::Pending);
    }

    #[test]
    fn test_create_run_invalid_experiment() {
        let mut storage = InMemoryStorage::new();
        let result = storage.create_run("fake-exp", "run");

        match result.unwrap_err() {
            StorageError::ExperimentNotFound(id) => assert_eq!(id, "fake-exp"),
            e => panic!("Expected ExperimentNotFound, got {e:?}"),
        }
    }

    #[test]
    fn test_run_lifecycle() {
        let (mut storage, run_id) = with_run();

        storage.start_run(&run_id).unwrap();
        assert_eq!(storage.get_run_status(&run_id).unwrap(), RunStatus::Running);

        storage.complete_run(&run_id, RunStatus::Failed).unwrap();
        assert_eq!(storage.get_run_status(&run_id).unwrap(), RunStatus::Failed);
    }

    #[test]
    fn test_start_run_invalid_state() {
        let (mut storage, run_id) = with_run();

        storage.start_run(&run_id).unwrap();
        let result = storage.start_run(&run_id); // Already started

        assert!(matches!(result, Err(StorageError::InvalidState(_))));
    }

    #[test]
    fn test_complete_run_invalid_state() {
        let (mut storage, run_id) = with_run();

        // Try to complete without starting
        let result = storage.complete_run(&run_id, RunStatus::Success);

        assert!(matches!(result, Err(StorageError::InvalidState(_))));
    }

    #[test]
    fn test_log_params_overwrite() {
        let (mut storage, run_id) = with_run();

        storage.log_param(&run_id, "epochs", "10").unwrap();
        storage.log_param(&run_id, "optimizer", "adam").unwrap();
        storage.log_param(&run_id, "epochs", "20").unwrap();

        let params = storage.get_params(&run_id).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["epochs"], "20");
    }

    #[test]
    fn test_get_metrics_ordering() {
        let (mut storage, run_id) = with_run();

        // Log out of order
        storage.log_metric(&run_id, "loss", 2, 0.3).unwrap();
        storage.log_metric(&run_id, "loss", 0, 0.5).unwrap();
        storage.log_metric(&run_id, "loss", 1, 0.4).unwrap();

        let metrics = storage.get_metrics(&run_id, "loss").unwrap();
        let steps: Vec<u64> = metrics.iter().map(|m| m.step).collect();
        assert_eq!(steps, [0, 1, 2]);
        assert!((metrics[0].value - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_get_metrics_empty() {
        let (storage, run_id) = with_run();
        assert!(storage.get_metrics(&run_id, "loss").unwrap().is_empty());
    }

    #[test]
    fn test_log_metric_invalid_run() {
        let mut storage = InMemoryStorage::new();
        let result = storage.log_metric("fake-run", "loss", 0, 0.5);

        match result.unwrap_err() {
            StorageError::RunNotFound(id) => assert_eq!(id, "fake-run"),
            e => panic!("Expected RunNotFound, got {e:?}"),
        }
    }

    #[test]
    fn test_log_artifact_directory() {
        let (mut storage, run_id) = with_run();
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("model_weights.json"), "{}").unwrap();
        fs::write(dir.path().join("model_hyperparameters.yaml"), "a: 1").unwrap();

        let hash = storage.log_artifact(&run_id, "model", dir.path()).unwrap();

        assert!(hash.starts_with("sha256-"));
        assert_eq!(storage.artifact_count(), 2);
        assert_eq!(
            storage.list_artifacts(&run_id).unwrap(),
            ["model/model_hyperparameters.yaml", "model/model_weights.json"]
        );
        assert_eq!(
            storage.artifact(&run_id, "model/model_weights.json"),
            Some(&b"{}"[..])
        );
    }

    #[test]
    fn test_log_artifact_invalid_run() {
        let mut storage = InMemoryStorage::new();
        let dir = TempDir::new().unwrap();
        let result = storage.log_artifact("fake-run", "model", dir.path());

        assert!(matches!(result, Err(StorageError::RunNotFound(_))));
    }

    #[test]
    fn test_list_runs_in_creation_order() {
        let mut storage = InMemoryStorage::new();

        let exp1 = storage.create_experiment("exp-1").unwrap();
        let exp2 = storage.create_experiment("exp-2").unwrap();

        let run1 = storage.create_run(&exp1, "a").unwrap();
        let run2 = storage.create_run(&exp1, "b").unwrap();
        storage.create_run(&exp2, "c").unwrap();
        storage.start_run(&run1).unwrap();

        let runs = storage.list_runs(&exp1).unwrap();
        let ids: Vec<&str> = runs.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(ids, [run1.as_str(), run2.as_str()]);
        assert_eq!(runs[0].run_name, "a");
        assert_eq!(runs[0].status, RunStatus::Running);
        assert!(runs[0].start_time.is_some());
        assert_eq!(runs[1].status, RunStatus::Pending);

        assert!(storage.list_runs("missing").is_err());
    }
}
