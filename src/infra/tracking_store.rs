// ============================================================
// Layer 6 — Local File Tracking Store
// ============================================================
// Directory-backed implementation of TrackingStore and
// ModelRegistry:
//
//   <root>/
//     experiments/<experiment_id>.json
//     runs/<run_id>/run.json
//     runs/<run_id>/artifacts/<artifact_path>/...
//     models/<model_name>/version-<n>.json
//
// Every JSON document is written to a temporary sibling and
// renamed into place, so readers never observe a half-written
// record. Mutations within one process are serialised by a
// single lock.

use std::{
    collections::BTreeMap,
    fs,
    path::{Component, Path, PathBuf},
    sync::Mutex,
};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::tracking::{Experiment, ModelVersion, RunRecord, RunStatus, Stage};
use crate::domain::traits::{ModelRegistry, TrackingStore};
use crate::error::{Result, SentimentError};

const EXPERIMENTS_DIR: &str = "experiments";
const RUNS_DIR:        &str = "runs";
const MODELS_DIR:      &str = "models";
const RUN_FILE:        &str = "run.json";
const ARTIFACTS_DIR:   &str = "artifacts";

fn tracking_err(msg: impl Into<String>) -> SentimentError {
    SentimentError::Tracking(msg.into())
}

// ─── File helpers ─────────────────────────────────────────────────────────────
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracking_err(format!("corrupt record '{}': {e}", path.display()))
    })
}

/// Every `*.json` file directly inside `dir`; empty if `dir` is missing.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// A single path segment usable as a directory name.
fn validate_name(kind: &str, name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != "..";
    if ok {
        Ok(())
    } else {
        Err(tracking_err(format!("invalid {kind} '{name}'")))
    }
}

/// Artifact paths are relative and may not climb out of the run.
fn validate_artifact_path(artifact_path: &str) -> Result<()> {
    let path = Path::new(artifact_path);
    let ok = !artifact_path.is_empty()
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(tracking_err(format!("invalid artifact path '{artifact_path}'")))
    }
}

// ─── FileTrackingStore ────────────────────────────────────────────────────────
pub struct FileTrackingStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileTrackingStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for dir in [EXPERIMENTS_DIR, RUNS_DIR, MODELS_DIR] {
            fs::create_dir_all(root.join(dir))?;
        }
        tracing::debug!("Tracking store at '{}'", root.display());
        Ok(Self { root, lock: Mutex::new(()) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| tracking_err("tracking store lock poisoned"))
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root.join(RUNS_DIR).join(run_id)
    }

    fn model_dir(&self, name: &str) -> PathBuf {
        self.root.join(MODELS_DIR).join(name)
    }

    fn version_file(&self, name: &str, version: u32) -> PathBuf {
        self.model_dir(name).join(format!("version-{version}.json"))
    }

    fn load_run(&self, run_id: &str) -> Result<RunRecord> {
        validate_name("run id", run_id)?;
        let path = self.run_dir(run_id).join(RUN_FILE);
        if !path.exists() {
            return Err(tracking_err(format!("run '{run_id}' not found")));
        }
        read_json(&path)
    }

    fn save_run(&self, run: &RunRecord) -> Result<()> {
        write_json_atomic(&self.run_dir(&run.run_id).join(RUN_FILE), run)
    }

    /// Load a run that is still open for logging.
    fn load_running(&self, run_id: &str) -> Result<RunRecord> {
        let run = self.load_run(run_id)?;
        if run.status != RunStatus::Running {
            return Err(tracking_err(format!(
                "run '{run_id}' is {:?} and can no longer be modified",
                run.status
            )));
        }
        Ok(run)
    }

    fn load_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        let mut versions: Vec<ModelVersion> = json_files(&self.model_dir(name))?
            .iter()
            .map(|p| read_json(p))
            .collect::<Result<_>>()?;
        versions.sort_by_key(|v| v.version);
        Ok(versions)
    }

    fn load_experiments(&self) -> Result<Vec<Experiment>> {
        json_files(&self.root.join(EXPERIMENTS_DIR))?
            .iter()
            .map(|p| read_json(p))
            .collect()
    }
}

impl TrackingStore for FileTrackingStore {
    fn get_experiment_by_name(&self, name: &str) -> Result<Option<Experiment>> {
        Ok(self.load_experiments()?.into_iter().find(|e| e.name == name))
    }

    fn get_or_create_experiment(&self, name: &str) -> Result<Experiment> {
        let _guard = self.guard()?;
        let existing = self.load_experiments()?;
        if let Some(exp) = existing.iter().find(|e| e.name == name) {
            return Ok(exp.clone());
        }

        let next_id = existing
            .iter()
            .filter_map(|e| e.experiment_id.parse::<u64>().ok())
            .max()
            .map_or(0, |id| id + 1);
        let exp = Experiment {
            experiment_id: next_id.to_string(),
            name:          name.to_string(),
            created_at:    Utc::now(),
        };
        write_json_atomic(
            &self.root.join(EXPERIMENTS_DIR).join(format!("{}.json", exp.experiment_id)),
            &exp,
        )?;
        tracing::info!("Created experiment '{}' (id {})", name, exp.experiment_id);
        Ok(exp)
    }

    fn start_run(&self, experiment_id: &str, run_name: &str) -> Result<RunRecord> {
        let _guard = self.guard()?;
        if !self.load_experiments()?.iter().any(|e| e.experiment_id == experiment_id) {
            return Err(tracking_err(format!("experiment '{experiment_id}' not found")));
        }

        let run = RunRecord {
            run_id:        format!("{:032x}", rand::random::<u128>()),
            run_name:      run_name.to_string(),
            experiment_id: experiment_id.to_string(),
            status:        RunStatus::Running,
            start_time:    Utc::now(),
            end_time:      None,
            params:        BTreeMap::new(),
            metrics:       BTreeMap::new(),
            artifacts:     Vec::new(),
        };
        self.save_run(&run)?;
        tracing::info!("Started run {} ('{}')", run.run_id, run_name);
        Ok(run)
    }

    fn end_run(&self, run_id: &str, status: RunStatus) -> Result<RunRecord> {
        if status == RunStatus::Running {
            return Err(tracking_err("a run cannot be ended as RUNNING"));
        }
        let _guard = self.guard()?;
        let mut run = self.load_running(run_id)?;
        run.status   = status;
        run.end_time = Some(Utc::now());
        self.save_run(&run)?;
        tracing::info!("Run {} ended with status {:?}", run_id, status);
        Ok(run)
    }

    fn get_run(&self, run_id: &str) -> Result<RunRecord> {
        self.load_run(run_id)
    }

    fn log_params(&self, run_id: &str, params: &BTreeMap<String, String>) -> Result<()> {
        let _guard = self.guard()?;
        let mut run = self.load_running(run_id)?;
        for (key, value) in params {
            match run.params.get(key) {
                Some(old) if old != value => {
                    return Err(tracking_err(format!(
                        "param '{key}' already logged as '{old}', refusing '{value}'"
                    )));
                }
                Some(_) => {}
                None => {
                    run.params.insert(key.clone(), value.clone());
                }
            }
        }
        self.save_run(&run)
    }

    fn log_metrics(&self, run_id: &str, metrics: &BTreeMap<String, f64>) -> Result<()> {
        let _guard = self.guard()?;
        let mut run = self.load_running(run_id)?;
        run.metrics.extend(metrics.iter().map(|(k, v)| (k.clone(), *v)));
        self.save_run(&run)
    }

    fn log_artifact(&self, run_id: &str, local_path: &Path, artifact_path: &str) -> Result<()> {
        validate_artifact_path(artifact_path)?;
        let _guard = self.guard()?;
        let mut run = self.load_running(run_id)?;

        let target = self.run_dir(run_id).join(ARTIFACTS_DIR).join(artifact_path);
        if target.exists() {
            return Err(tracking_err(format!(
                "artifact '{artifact_path}' already logged for run {run_id}"
            )));
        }
        if local_path.is_dir() {
            copy_dir(local_path, &target)?;
        } else if local_path.is_file() {
            fs::create_dir_all(&target)?;
            let file_name = local_path
                .file_name()
                .ok_or_else(|| tracking_err("artifact file has no name"))?;
            fs::copy(local_path, target.join(file_name))?;
        } else {
            return Err(tracking_err(format!(
                "artifact source '{}' does not exist",
                local_path.display()
            )));
        }

        run.artifacts.push(artifact_path.to_string());
        self.save_run(&run)?;
        tracing::debug!("Logged artifact '{}' for run {}", artifact_path, run_id);
        Ok(())
    }

    fn artifact_location(&self, run_id: &str, artifact_path: &str) -> Result<PathBuf> {
        validate_artifact_path(artifact_path)?;
        let run = self.load_run(run_id)?;
        if !run.has_artifact(artifact_path) {
            return Err(tracking_err(format!(
                "run {run_id} has no artifact '{artifact_path}'"
            )));
        }
        Ok(self.run_dir(run_id).join(ARTIFACTS_DIR).join(artifact_path))
    }

    fn search_runs(&self, experiment_id: &str) -> Result<Vec<RunRecord>> {
        let runs_root = self.root.join(RUNS_DIR);
        let mut runs = Vec::new();
        for entry in fs::read_dir(&runs_root)? {
            let path = entry?.path().join(RUN_FILE);
            if !path.is_file() {
                continue;
            }
            let run: RunRecord = read_json(&path)?;
            if run.experiment_id == experiment_id {
                runs.push(run);
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

impl ModelRegistry for FileTrackingStore {
    fn register_model(&self, name: &str, run_id: &str, artifact_path: &str) -> Result<ModelVersion> {
        validate_name("model name", name)?;
        let _guard = self.guard()?;
        let run = self.load_run(run_id)?;
        if !run.has_artifact(artifact_path) {
            return Err(SentimentError::Registration(format!(
                "run {run_id} has no artifact '{artifact_path}' to register"
            )));
        }

        let next = self
            .load_versions(name)?
            .last()
            .map_or(1, |v| v.version + 1);
        let now = Utc::now();
        let version = ModelVersion {
            name:          name.to_string(),
            version:       next,
            source_run_id: run_id.to_string(),
            artifact_path: artifact_path.to_string(),
            stage:         Stage::None,
            created_at:    now,
            updated_at:    now,
        };
        write_json_atomic(&self.version_file(name, next), &version)?;
        tracing::info!("Registered '{}' version {} from run {}", name, next, run_id);
        Ok(version)
    }

    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        validate_name("model name", name)?;
        self.load_versions(name)
    }

    fn latest_version(&self, name: &str, stage: Stage) -> Result<Option<ModelVersion>> {
        Ok(self
            .list_versions(name)?
            .into_iter()
            .filter(|v| v.stage == stage)
            .max_by_key(|v| v.version))
    }

    fn transition_stage(
        &self,
        name:             &str,
        version:          u32,
        stage:            Stage,
        archive_existing: bool,
    ) -> Result<ModelVersion> {
        validate_name("model name", name)?;
        let _guard = self.guard()?;
        let versions = self.load_versions(name)?;
        let mut target = versions
            .iter()
            .find(|v| v.version == version)
            .cloned()
            .ok_or_else(|| tracking_err(format!("model '{name}' has no version {version}")))?;

        let now = Utc::now();
        if archive_existing && matches!(stage, Stage::Staging | Stage::Production) {
            for other in versions.iter().filter(|v| v.version != version && v.stage == stage) {
                let mut archived = other.clone();
                archived.stage      = Stage::Archived;
                archived.updated_at = now;
                write_json_atomic(&self.version_file(name, archived.version), &archived)?;
                tracing::info!("Archived '{}' version {}", name, archived.version);
            }
        }

        target.stage      = stage;
        target.updated_at = now;
        write_json_atomic(&self.version_file(name, version), &target)?;
        tracing::info!("'{}' version {} moved to stage {}", name, version, stage);
        Ok(target)
    }
}
