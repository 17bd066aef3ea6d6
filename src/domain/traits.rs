// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline is written against these traits, not against
// concrete storage:
//
//   ReviewSource   — where labelled reviews come from
//                    (CsvReviewLoader)
//   TrackingStore  — experiments, runs, params, metrics,
//                    artifacts (FileTrackingStore)
//   ModelRegistry  — named model versions and their stages
//                    (FileTrackingStore)
//
// The tracking store is an external collaborator: any backend
// that satisfies these contracts can stand in for the local
// file implementation.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::domain::review::ReviewRecord;
use crate::domain::tracking::{Experiment, ModelVersion, RunRecord, RunStatus, Stage};
use crate::error::Result;

// ─── ReviewSource ─────────────────────────────────────────────────────────────
pub trait ReviewSource {
    /// Load every labelled review, in file order.
    fn load_all(&self) -> Result<Vec<ReviewRecord>>;
}

// ─── TrackingStore ────────────────────────────────────────────────────────────
pub trait TrackingStore {
    fn get_experiment_by_name(&self, name: &str) -> Result<Option<Experiment>>;

    /// Return the named experiment, creating it on first use.
    fn get_or_create_experiment(&self, name: &str) -> Result<Experiment>;

    /// Open a new RUNNING run under the experiment.
    fn start_run(&self, experiment_id: &str, run_name: &str) -> Result<RunRecord>;

    /// Close a run with its terminal status.
    fn end_run(&self, run_id: &str, status: RunStatus) -> Result<RunRecord>;

    fn get_run(&self, run_id: &str) -> Result<RunRecord>;

    /// Parameters are write-once: re-logging a key with a different value fails.
    fn log_params(&self, run_id: &str, params: &BTreeMap<String, String>) -> Result<()>;

    fn log_metrics(&self, run_id: &str, metrics: &BTreeMap<String, f64>) -> Result<()>;

    /// Copy a local file or directory into the run under `artifact_path`.
    fn log_artifact(&self, run_id: &str, local_path: &Path, artifact_path: &str) -> Result<()>;

    /// Local path of a previously logged artifact.
    fn artifact_location(&self, run_id: &str, artifact_path: &str) -> Result<PathBuf>;

    /// All runs of an experiment ordered by start time, then run id.
    fn search_runs(&self, experiment_id: &str) -> Result<Vec<RunRecord>>;
}

// ─── ModelRegistry ────────────────────────────────────────────────────────────
pub trait ModelRegistry {
    /// Register a run's artifact as the next version of `name`, in stage None.
    fn register_model(&self, name: &str, run_id: &str, artifact_path: &str) -> Result<ModelVersion>;

    /// All versions of `name`, ascending by version number.
    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>>;

    /// The highest version of `name` currently labelled `stage`.
    fn latest_version(&self, name: &str, stage: Stage) -> Result<Option<ModelVersion>>;

    /// Move a version to `stage`. With `archive_existing`, other versions
    /// already in that stage are moved to Archived.
    fn transition_stage(
        &self,
        name:             &str,
        version:          u32,
        stage:            Stage,
        archive_existing: bool,
    ) -> Result<ModelVersion>;
}
