// ============================================================
// Layer 2 — Loading the Serving Model
// ============================================================
// Resolves (model name, stage) to a concrete registered version,
// finds the bundle inside that version's source run, and loads
// it into an immutable SentimentPredictor.
//
// Every failure on this path is reported as a ModelLoad error:
// the caller (server startup or the `predict` command) must not
// fall back to a stale or absent model.

use crate::domain::tracking::Stage;
use crate::domain::traits::{ModelRegistry, TrackingStore};
use crate::error::{Result, SentimentError};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::SentimentPredictor;

pub fn load_production_predictor<S>(store: &S, model_name: &str, stage: Stage) -> Result<SentimentPredictor>
where
    S: TrackingStore + ModelRegistry + ?Sized,
{
    resolve_and_load(store, model_name, stage).map_err(SentimentError::into_model_load)
}

fn resolve_and_load<S>(store: &S, model_name: &str, stage: Stage) -> Result<SentimentPredictor>
where
    S: TrackingStore + ModelRegistry + ?Sized,
{
    let version = store.latest_version(model_name, stage)?.ok_or_else(|| {
        SentimentError::ModelLoad(format!("no version of '{model_name}' in stage {stage}"))
    })?;
    let bundle_dir = store.artifact_location(&version.source_run_id, &version.artifact_path)?;
    let predictor  = CheckpointManager::new(bundle_dir).load_predictor()?;

    tracing::info!(
        "Loaded model {} v{} from stage {}",
        version.name, version.version, version.stage,
    );
    Ok(predictor.with_version(version))
}
