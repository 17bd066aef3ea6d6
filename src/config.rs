// ============================================================
// Shared Names and Defaults
// ============================================================
// Names that training, registration and serving must agree on.
// The environment-resolved settings (tracking location, model
// name, stage, bind address) are parsed by the CLI layer and
// fall back to the defaults below.

/// Experiment every training run is filed under
pub const EXPERIMENT_NAME: &str = "sentiment-analysis";

/// Display name given to each training run
pub const RUN_NAME: &str = "logreg-tfidf";

/// Artifact path of the vectorizer + classifier bundle inside a run
pub const MODEL_ARTIFACT_PATH: &str = "sentiment_model";

/// Artifact path of the per-epoch training log inside a run
pub const TRAINING_LOG_ARTIFACT_PATH: &str = "training_log";

/// Registered model name shared by the registrar and the server
pub const DEFAULT_MODEL_NAME: &str = "sentiment_model";

pub const DEFAULT_MODEL_STAGE: &str = "Production";

pub const DEFAULT_TRACKING_DIR: &str = "mlruns";

pub const DEFAULT_DATA_PATH: &str = "data/imdb.csv";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Seed used for both dataset split stages and mini-batch shuffling
pub const DEFAULT_SEED: u64 = 42;
