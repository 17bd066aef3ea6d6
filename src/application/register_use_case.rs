// ============================================================
// Layer 2 — RegisterUseCase
// ============================================================
// Promotes the best training run to the serving stage:
//
//   Step 1: Look up the experiment and list its runs
//   Step 2: Keep FINISHED runs that report a finite f1_score
//   Step 3: Pick the highest f1_score; on a tie the earliest
//           run in search order wins
//   Step 4: Register that run's bundle as a new model version
//   Step 5: Move the new version to Production
//
// Prior Production versions keep their label unless
// `archive_existing` is set; serving always resolves the highest
// Production version, so the new one takes over either way.

use std::path::PathBuf;

use crate::config::{DEFAULT_MODEL_NAME, DEFAULT_TRACKING_DIR, EXPERIMENT_NAME, MODEL_ARTIFACT_PATH};
use crate::domain::tracking::{ModelVersion, RunRecord, RunStatus, Stage};
use crate::domain::traits::{ModelRegistry, TrackingStore};
use crate::error::{Result, SentimentError};
use crate::infra::{metrics::F1_SCORE_KEY, tracking_store::FileTrackingStore};

#[derive(Debug, Clone)]
pub struct RegisterConfig {
    pub tracking_dir:     PathBuf,
    pub model_name:       String,
    pub archive_existing: bool,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            tracking_dir:     PathBuf::from(DEFAULT_TRACKING_DIR),
            model_name:       DEFAULT_MODEL_NAME.to_string(),
            archive_existing: false,
        }
    }
}

pub struct RegisterUseCase {
    config: RegisterConfig,
}

impl RegisterUseCase {
    pub fn new(config: RegisterConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ModelVersion> {
        let store = FileTrackingStore::open(&self.config.tracking_dir)?;
        register_best_model(
            &store,
            EXPERIMENT_NAME,
            &self.config.model_name,
            self.config.archive_existing,
        )
    }
}

fn eligible_f1(run: &RunRecord) -> Option<f64> {
    if run.status != RunStatus::Finished {
        return None;
    }
    run.metric(F1_SCORE_KEY).filter(|f1| f1.is_finite())
}

/// First run with the maximum f1_score among eligible runs.
pub fn select_best_run(runs: &[RunRecord]) -> Option<&RunRecord> {
    runs.iter()
        .filter_map(|run| eligible_f1(run).map(|f1| (run, f1)))
        .fold(None, |best: Option<(&RunRecord, f64)>, (run, f1)| match best {
            Some((_, best_f1)) if best_f1 >= f1 => best,
            _ => Some((run, f1)),
        })
        .map(|(run, _)| run)
}

pub fn register_best_model<S>(
    store:            &S,
    experiment_name:  &str,
    model_name:       &str,
    archive_existing: bool,
) -> Result<ModelVersion>
where
    S: TrackingStore + ModelRegistry + ?Sized,
{
    // ── Step 1: Runs of the experiment ────────────────────────────────────────
    let experiment = store.get_experiment_by_name(experiment_name)?.ok_or_else(|| {
        SentimentError::Registration(format!("experiment '{experiment_name}' does not exist"))
    })?;
    let runs = store.search_runs(&experiment.experiment_id)?;
    if runs.is_empty() {
        return Err(SentimentError::Registration(format!(
            "experiment '{experiment_name}' has no runs"
        )));
    }

    // ── Steps 2–3: Best eligible run ─────────────────────────────────────────
    let best = select_best_run(&runs).ok_or_else(|| {
        SentimentError::Registration(format!(
            "none of the {} runs in '{experiment_name}' finished with an {F1_SCORE_KEY}",
            runs.len()
        ))
    })?;
    tracing::info!(
        "Best run {} with {}={:.4} (of {} runs)",
        best.run_id,
        F1_SCORE_KEY,
        eligible_f1(best).unwrap_or_default(),
        runs.len(),
    );

    // ── Steps 4–5: Register and promote ───────────────────────────────────────
    let version = store.register_model(model_name, &best.run_id, MODEL_ARTIFACT_PATH)?;
    let promoted = store.transition_stage(
        model_name,
        version.version,
        Stage::Production,
        archive_existing,
    )?;
    tracing::info!("Registered version: {}", promoted.version);
    Ok(promoted)
}
