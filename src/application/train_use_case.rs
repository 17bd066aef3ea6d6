// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one tracked training run, in order:
//
//   Step 1: Open the experiment, start a run   (Layer 6 - infra)
//   Step 2: Load, normalise, split reviews     (Layer 4 - data)
//   Step 3: Fit TF-IDF on train only           (Layer 5 - ml)
//   Step 4: Fit the classifier                 (Layer 5 - ml)
//   Step 5: Score the validation partition     (Layer 6 - infra)
//   Step 6: Log params, metrics, artifacts     (Layer 6 - infra)
//   Step 7: End the run FINISHED
//
// If anything fails after Step 1 the run is ended FAILED and the
// original error is returned. Exactly one run is created per call.

use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_DATA_PATH, DEFAULT_SEED, DEFAULT_TRACKING_DIR, EXPERIMENT_NAME,
    MODEL_ARTIFACT_PATH, RUN_NAME, TRAINING_LOG_ARTIFACT_PATH,
};
use crate::data::{batcher::FeatureBatcher, dataset::load_dataset, loader::CsvReviewLoader};
use crate::domain::tracking::{RunRecord, RunStatus};
use crate::domain::traits::{ReviewSource, TrackingStore};
use crate::error::{Result, SentimentError};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{ClassificationMetrics, MetricsLogger},
    tracking_store::FileTrackingStore,
};
use crate::ml::{
    inferencer::{predict_labels, predict_probabilities},
    trainer::{run_training, FitConfig, InnerBackend, LabelledRows},
    vectorizer::{TfidfVectorizer, VectorizerConfig},
};

/// Name recorded under the `model` run parameter
const MODEL_KIND: &str = "LogisticRegression";

// ─── Training Configuration ──────────────────────────────────────────────────
// Every value here is also logged as a run parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:    PathBuf,
    pub tracking_dir: PathBuf,
    pub max_features: usize,
    pub max_iter:     usize,
    pub lr:           f64,
    pub batch_size:   usize,
    pub l2:           f64,
    pub tol:          f64,
    pub seed:         u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let fit = FitConfig::default();
        Self {
            data_path:    PathBuf::from(DEFAULT_DATA_PATH),
            tracking_dir: PathBuf::from(DEFAULT_TRACKING_DIR),
            max_features: VectorizerConfig::default().max_features,
            max_iter:     fit.max_iter,
            lr:           fit.learning_rate,
            batch_size:   fit.batch_size,
            l2:           fit.l2,
            tol:          fit.tol,
            seed:         DEFAULT_SEED,
        }
    }
}

impl TrainConfig {
    pub fn vectorizer_config(&self) -> VectorizerConfig {
        VectorizerConfig {
            max_features: self.max_features,
            ..VectorizerConfig::default()
        }
    }

    pub fn fit_config(&self) -> FitConfig {
        FitConfig {
            max_iter:      self.max_iter,
            learning_rate: self.lr,
            batch_size:    self.batch_size,
            l2:            self.l2,
            tol:           self.tol,
            seed:          self.seed,
        }
    }

    fn run_params(&self, n_train: usize, n_val: usize) -> BTreeMap<String, String> {
        let vec_cfg = self.vectorizer_config();
        [
            ("max_features", self.max_features.to_string()),
            ("ngram_range",  vec_cfg.ngram_range_label()),
            ("model",        MODEL_KIND.to_string()),
            ("max_iter",     self.max_iter.to_string()),
            ("lr",           self.lr.to_string()),
            ("batch_size",   self.batch_size.to_string()),
            ("l2",           self.l2.to_string()),
            ("seed",         self.seed.to_string()),
            ("n_train",      n_train.to_string()),
            ("n_val",        n_val.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train against the local file store at `tracking_dir`.
    pub fn execute(&self) -> Result<RunRecord> {
        let store  = FileTrackingStore::open(&self.config.tracking_dir)?;
        let source = CsvReviewLoader::new(&self.config.data_path);
        self.execute_with(&source, &store)
    }

    /// Train against any review source and tracking store.
    pub fn execute_with(
        &self,
        source: &dyn ReviewSource,
        store:  &dyn TrackingStore,
    ) -> Result<RunRecord> {
        // ── Step 1: Experiment + run ─────────────────────────────────────────
        let experiment = store.get_or_create_experiment(EXPERIMENT_NAME)?;
        let run = store.start_run(&experiment.experiment_id, RUN_NAME)?;

        match self.train_in_run(source, store, &run.run_id) {
            Ok(()) => {
                let finished = store.end_run(&run.run_id, RunStatus::Finished)?;
                tracing::info!("Run ID: {}", finished.run_id);
                Ok(finished)
            }
            Err(e) => {
                tracing::error!("Training run {} failed: {}", run.run_id, e);
                if let Err(end_err) = store.end_run(&run.run_id, RunStatus::Failed) {
                    tracing::warn!("Could not mark run {} FAILED: {}", run.run_id, end_err);
                }
                Err(e)
            }
        }
    }

    fn train_in_run(
        &self,
        source: &dyn ReviewSource,
        store:  &dyn TrackingStore,
        run_id: &str,
    ) -> Result<()> {
        let cfg = &self.config;

        // ── Step 2: Load + split ──────────────────────────────────────────────
        let split = load_dataset(source, cfg.seed)?;
        let (train_x, val_x, _test_x, train_y, val_y, _test_y) = split.into_parts();

        // ── Step 3: Vectorizer, fitted on the training partition only ────────
        let vectorizer = TfidfVectorizer::fit(&train_x, cfg.vectorizer_config())?;
        let train_rows = vectorizer.transform_all(&train_x);
        let val_rows   = vectorizer.transform_all(&val_x);
        tracing::info!("Vectorizer fitted: {} features", vectorizer.n_features());

        // ── Step 4: Classifier ────────────────────────────────────────────────
        let workspace = tempfile::tempdir()?;
        let log = MetricsLogger::new(workspace.path())?;
        let outcome = run_training(
            &cfg.fit_config(),
            vectorizer.n_features(),
            LabelledRows::new(&train_rows, &train_y),
            LabelledRows::new(&val_rows, &val_y),
            &log,
        )?;

        // ── Step 5: Validation metrics ────────────────────────────────────────
        let batcher = FeatureBatcher::<InnerBackend>::new(
            Default::default(),
            vectorizer.n_features(),
        );
        let probs = predict_probabilities(&outcome.model, &batcher, &val_rows, cfg.batch_size.max(1))?;
        let metrics = ClassificationMetrics::compute(&val_y, &predict_labels(&probs));
        tracing::info!(
            "Validation: accuracy={:.4} precision={:.4} recall={:.4} f1={:.4}",
            metrics.accuracy, metrics.precision, metrics.recall, metrics.f1_score,
        );
        if !metrics.f1_score.is_finite() {
            return Err(SentimentError::Training("validation f1_score is not finite".into()));
        }

        // ── Step 6: Record everything under the run ──────────────────────────
        store.log_params(run_id, &cfg.run_params(train_y.len(), val_y.len()))?;
        store.log_metrics(run_id, &metrics.to_map())?;

        let bundle_dir = workspace.path().join(MODEL_ARTIFACT_PATH);
        CheckpointManager::new(&bundle_dir).save(&vectorizer, &outcome.model)?;
        store.log_artifact(run_id, &bundle_dir, MODEL_ARTIFACT_PATH)?;
        store.log_artifact(run_id, log.csv_path(), TRAINING_LOG_ARTIFACT_PATH)?;

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::{ReviewRecord, Sentiment};
    use crate::infra::metrics::F1_SCORE_KEY;
    use crate::test_support;

    struct MissingSource;

    impl ReviewSource for MissingSource {
        fn load_all(&self) -> Result<Vec<ReviewRecord>> {
            Err(SentimentError::Data("no such file".into()))
        }
    }

    struct FixedSource(Vec<ReviewRecord>);

    impl ReviewSource for FixedSource {
        fn load_all(&self) -> Result<Vec<ReviewRecord>> {
            Ok(self.0.clone())
        }
    }

    fn small_config() -> TrainConfig {
        TrainConfig { max_iter: 30, batch_size: 8, ..TrainConfig::default() }
    }

    fn source() -> FixedSource {
        let (texts, labels) = test_support::labelled_reviews();
        let records = texts
            .iter()
            .zip(&labels)
            .cycle()
            .take(texts.len() * 3)
            .map(|(t, &y)| ReviewRecord::new(t.clone(), Sentiment::from_label(y)))
            .collect();
        FixedSource(records)
    }

    #[test]
    fn test_successful_run_is_fully_recorded() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::open(dir.path()).unwrap();
        let run = TrainUseCase::new(small_config()).execute_with(&source(), &store).unwrap();

        assert_eq!(run.status, RunStatus::Finished);
        assert_eq!(run.param("max_features"), Some("5000"));
        assert_eq!(run.param("ngram_range"), Some("(1, 2)"));
        assert_eq!(run.param("model"), Some("LogisticRegression"));
        assert_eq!(run.param("n_train"), Some("28"));
        for key in ["accuracy", "precision", "recall", F1_SCORE_KEY] {
            let v = run.metric(key).unwrap();
            assert!((0.0..=1.0).contains(&v), "{key} = {v}");
        }
        assert!(run.has_artifact(MODEL_ARTIFACT_PATH));
        assert!(run.has_artifact(TRAINING_LOG_ARTIFACT_PATH));

        let bundle = store.artifact_location(&run.run_id, MODEL_ARTIFACT_PATH).unwrap();
        CheckpointManager::new(bundle).load_predictor().unwrap();
    }

    #[test]
    fn test_each_invocation_creates_one_run() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::open(dir.path()).unwrap();
        let uc = TrainUseCase::new(small_config());
        let a = uc.execute_with(&source(), &store).unwrap();
        let b = uc.execute_with(&source(), &store).unwrap();
        assert_ne!(a.run_id, b.run_id);

        let exp = store.get_experiment_by_name(EXPERIMENT_NAME).unwrap().unwrap();
        assert_eq!(store.search_runs(&exp.experiment_id).unwrap().len(), 2);
    }

    #[test]
    fn test_failure_marks_run_failed() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::open(dir.path()).unwrap();
        let err = TrainUseCase::new(small_config())
            .execute_with(&MissingSource, &store)
            .unwrap_err();
        assert!(matches!(err, SentimentError::Data(_)));

        let exp  = store.get_experiment_by_name(EXPERIMENT_NAME).unwrap().unwrap();
        let runs = store.search_runs(&exp.experiment_id).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, RunStatus::Failed);
    }

    #[test]
    fn test_execute_reads_csv_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_path:    test_support::write_review_csv(dir.path(), 3),
            tracking_dir: dir.path().join("mlruns"),
            ..small_config()
        };
        let run = TrainUseCase::new(cfg).execute().unwrap();
        assert_eq!(run.status, RunStatus::Finished);
    }
}
