//! Directory-backed Storage Backend
//!
//! Layout under the tracking root:
//!
//! ```text
//! <root>/<experiment_id>/meta.yaml
//! <root>/<experiment_id>/<run_id>/meta.yaml
//! <root>/<experiment_id>/<run_id>/params/<key>
//! <root>/<experiment_id>/<run_id>/metrics/<key>      one "timestamp value step" line per point
//! <root>/<experiment_id>/<run_id>/artifacts/<artifact_path>/...
//! ```
//!
//! Timestamps in metric files are milliseconds since the Unix epoch.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;
use walkdir::WalkDir;

use super::{
    collect_artifact_files, compute_hash, ExperimentStorage, MetricPoint, Result, RunInfo,
    RunStatus, StorageError,
};

const META_FILE: &str = "meta.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExperimentMeta {
    experiment_id: String,
    name: String,
    creation_time: DateTime<Utc>,
}

/// Tracking store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a tracking directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn experiments(&self) -> Result<Vec<ExperimentMeta>> {
        let mut experiments = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let meta_path = entry?.path().join(META_FILE);
            if meta_path.is_file() {
                experiments.push(read_yaml::<ExperimentMeta>(&meta_path)?);
            }
        }
        experiments.sort_by(|a, b| a.creation_time.cmp(&b.creation_time));
        Ok(experiments)
    }

    fn experiment_dir(&self, experiment_id: &str) -> Result<PathBuf> {
        let dir = self.root.join(experiment_id);
        if dir.join(META_FILE).is_file() {
            Ok(dir)
        } else {
            Err(StorageError::ExperimentNotFound(experiment_id.to_string()))
        }
    }

    fn run_dir(&self, run_id: &str) -> Result<PathBuf> {
        for entry in fs::read_dir(&self.root)? {
            let candidate = entry?.path().join(run_id);
            if candidate.join(META_FILE).is_file() {
                return Ok(candidate);
            }
        }
        Err(StorageError::RunNotFound(run_id.to_string()))
    }

    fn read_run(&self, run_id: &str) -> Result<(PathBuf, RunInfo)> {
        let dir = self.run_dir(run_id)?;
        let info = read_yaml::<RunInfo>(&dir.join(META_FILE))?;
        Ok((dir, info))
    }

    fn next_experiment_id(&self) -> Result<String> {
        let next = self
            .experiments()?
            .iter()
            .filter_map(|e| e.experiment_id.parse::<u64>().ok())
            .max()
            .map_or(0, |id| id + 1);
        Ok(next.to_string())
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    serde_yaml::from_str(&text)
        .map_err(|e| StorageError::Backend(format!("{}: {e}", path.display())))
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_yaml::to_string(value).map_err(|e| StorageError::Backend(e.to_string()))?;
    fs::write(path, text)?;
    Ok(())
}

/// Metric and param keys become file names; path separators are not allowed
fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(StorageError::Backend(format!("Invalid key: {key:?}")));
    }
    Ok(())
}

fn parse_metric_line(line: &str) -> Option<MetricPoint> {
    let mut parts = line.split_whitespace();
    let millis: i64 = parts.next()?.parse().ok()?;
    let value: f64 = parts.next()?.parse().ok()?;
    let step: u64 = parts.next()?.parse().ok()?;
    let timestamp = Utc.timestamp_millis_opt(millis).single()?;
    Some(MetricPoint::with_timestamp(step, value, timestamp))
}

impl ExperimentStorage for FileStorage {
    fn create_experiment(&mut self, name: &str) -> Result<String> {
        if self.get_experiment_by_name(name)?.is_some() {
            return Err(StorageError::ExperimentExists(name.to_string()));
        }

        let experiment_id = self.next_experiment_id()?;
        let dir = self.root.join(&experiment_id);
        fs::create_dir_all(&dir)?;
        write_yaml(
            &dir.join(META_FILE),
            &ExperimentMeta {
                experiment_id: experiment_id.clone(),
                name: name.to_string(),
                creation_time: Utc::now(),
            },
        )?;

        tracing::debug!(experiment_id = %experiment_id, name, "Created experiment");
        Ok(experiment_id)
    }

    fn get_experiment_by_name(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .experiments()?
            .into_iter()
            .find(|e| e.name == name)
            .map(|e| e.experiment_id))
    }

    fn create_run(&mut self, experiment_id: &str, run_name: &str) -> Result<String> {
        let exp_dir = self.experiment_dir(experiment_id)?;

        let run_id = Uuid::new_v4().simple().to_string();
        let dir = exp_dir.join(&run_id);
        fs::create_dir_all(dir.join("params"))?;
        fs::create_dir_all(dir.join("metrics"))?;
        fs::create_dir_all(dir.join("artifacts"))?;
        write_yaml(
            &dir.join(META_FILE),
            &RunInfo {
                run_id: run_id.clone(),
                experiment_id: experiment_id.to_string(),
                run_name: run_name.to_string(),
                status: RunStatus::Pending,
                start_time: None,
                end_time: None,
            },
        )?;

        Ok(run_id)
    }

    fn start_run(&mut self, run_id: &str) -> Result<()> {
        let (dir, mut info) = self.read_run(run_id)?;

        if info.status != RunStatus::Pending {
            return Err(StorageError::InvalidState(format!(
                "Run {run_id} is not in Pending state"
            )));
        }

        info.status = RunStatus::Running;
        info.start_time = Some(Utc::now());
        write_yaml(&dir.join(META_FILE), &info)
    }

    fn complete_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let (dir, mut info) = self.read_run(run_id)?;

        if info.status != RunStatus::Running {
            return Err(StorageError::InvalidState(format!(
                "Run {run_id} is not in Running state"
            )));
        }

        info.status = status;
        info.end_time = Some(Utc::now());
        write_yaml(&dir.join(META_FILE), &info)
    }

    fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        let dir = self.run_dir(run_id)?;
        fs::write(dir.join("params").join(key), value)?;
        Ok(())
    }

    fn log_metric(&mut self, run_id: &str, key: &str, step: u64, value: f64) -> Result<()> {
        check_key(key)?;
        let dir = self.run_dir(run_id)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("metrics").join(key))?;
        writeln!(file, "{} {value} {step}", Utc::now().timestamp_millis())?;
        Ok(())
    }

    fn log_artifact(
        &mut self,
        run_id: &str,
        artifact_path: &str,
        local_path: &Path,
    ) -> Result<String> {
        let dir = self.run_dir(run_id)?;
        let files = collect_artifact_files(artifact_path, local_path)?;
        let hash = compute_hash(&files);

        let artifacts = dir.join("artifacts");
        for file in &files {
            let dest = artifacts.join(&file.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(dest, &file.data)?;
        }

        tracing::debug!(run_id, artifact_path, files = files.len(), "Logged artifact");
        Ok(hash)
    }

    fn get_metrics(&self, run_id: &str, key: &str) -> Result<Vec<MetricPoint>> {
        check_key(key)?;
        let path = self.run_dir(run_id)?.join("metrics").join(key);
        if !path.is_file() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&path)?;
        let mut points = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let point = parse_metric_line(line).ok_or_else(|| {
                StorageError::Backend(format!("Malformed metric line in {}: {line}", path.display()))
            })?;
            points.push(point);
        }
        points.sort_by_key(|p| p.step);
        Ok(points)
    }

    fn get_params(&self, run_id: &str) -> Result<BTreeMap<String, String>> {
        let dir = self.run_dir(run_id)?.join("params");
        let mut params = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let key = entry.file_name().to_string_lossy().into_owned();
                params.insert(key, fs::read_to_string(entry.path())?);
            }
        }
        Ok(params)
    }

    fn list_artifacts(&self, run_id: &str) -> Result<Vec<String>> {
        let root = self.run_dir(run_id)?.join("artifacts");
        let mut paths = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| StorageError::Backend(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&root) {
                paths.push(
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/"),
                );
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn get_run_status(&self, run_id: &str) -> Result<RunStatus> {
        Ok(self.read_run(run_id)?.1.status)
    }

    fn list_runs(&self, experiment_id: &str) -> Result<Vec<RunInfo>> {
        let exp_dir = self.experiment_dir(experiment_id)?;

        let mut runs = Vec::new();
        for entry in fs::read_dir(exp_dir)? {
            let meta_path = entry?.path().join(META_FILE);
            if meta_path.is_file() {
                runs.push(read_yaml::<RunInfo>(&meta_path)?);
            }
        }
        runs.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        Ok(runs)
    }
}
