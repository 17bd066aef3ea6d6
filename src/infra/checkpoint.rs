// ============================================================
// Layer 6 — Model Bundle (Checkpoint Manager)
// ============================================================
// Saves and restores the vectorizer + classifier pair as ONE
// versioned artifact directory:
//
//   sentiment_model/
//     bundle.json       ← manifest (schema version, widths,
//                         vectorizer fingerprint)
//     vectorizer.json   ← fitted TF-IDF vocabulary + idf
//     classifier.mpk    ← classifier weights (burn named
//                         MessagePack, full precision)
//
// The manifest pins the exact vectorizer the classifier was
// fitted against (SHA-256 of vectorizer.json) and the feature
// width. Loading re-checks both, so a vectorizer from another
// run cannot be paired with this classifier by accident.
//
// Full precision keeps reloaded weights bit-identical to the
// in-memory ones, so predictions do not drift after a reload.

use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::{
    backend::ndarray::NdArrayDevice,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, SentimentError};
use crate::ml::inferencer::SentimentPredictor;
use crate::ml::model::{SentimentClassifier, SentimentClassifierConfig};
use crate::ml::trainer::InnerBackend;
use crate::ml::vectorizer::TfidfVectorizer;

/// Bumped whenever the bundle layout changes
pub const BUNDLE_SCHEMA_VERSION: u32 = 1;

const MANIFEST_FILE:    &str = "bundle.json";
const VECTORIZER_FILE:  &str = "vectorizer.json";
const CLASSIFIER_STEM:  &str = "classifier";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub schema_version:    u32,
    pub n_features:        usize,
    pub vectorizer_sha256: String,

    /// Class names in label order
    pub classes:    Vec<String>,
    pub classifier: SentimentClassifierConfig,
    pub created_at: DateTime<Utc>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn load_err(msg: impl Into<String>) -> SentimentError {
    SentimentError::ModelLoad(msg.into())
}

/// Reads and writes one bundle directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the pair and its manifest into the bundle directory.
    pub fn save(
        &self,
        vectorizer: &TfidfVectorizer,
        model:      &SentimentClassifier<InnerBackend>,
    ) -> Result<BundleManifest> {
        if model.n_features() != vectorizer.n_features() {
            return Err(SentimentError::Training(format!(
                "refusing to bundle a {}-feature classifier with a {}-feature vectorizer",
                model.n_features(),
                vectorizer.n_features()
            )));
        }
        fs::create_dir_all(&self.dir)?;

        let vectorizer_json = serde_json::to_vec(vectorizer)?;
        fs::write(self.dir.join(VECTORIZER_FILE), &vectorizer_json)?;

        let classifier_path = self.dir.join(CLASSIFIER_STEM);
        NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .record(model.clone().into_record(), classifier_path.clone())
            .map_err(|e| {
                SentimentError::Training(format!(
                    "failed to save classifier to '{}': {e:?}",
                    classifier_path.display()
                ))
            })?;

        let manifest = BundleManifest {
            schema_version:    BUNDLE_SCHEMA_VERSION,
            n_features:        vectorizer.n_features(),
            vectorizer_sha256: sha256_hex(&vectorizer_json),
            classes:           vec!["negative".into(), "positive".into()],
            classifier:        SentimentClassifierConfig::new(model.n_features()),
            created_at:        Utc::now(),
        };
        fs::write(
            self.dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        tracing::debug!(
            "Saved model bundle ({} features) to '{}'",
            manifest.n_features,
            self.dir.display()
        );
        Ok(manifest)
    }

    pub fn load_manifest(&self) -> Result<BundleManifest> {
        let path = self.dir.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).map_err(|e| {
            load_err(format!("cannot read bundle manifest '{}': {e}", path.display()))
        })?;
        let manifest: BundleManifest = serde_json::from_str(&json)
            .map_err(|e| load_err(format!("malformed bundle manifest: {e}")))?;

        if manifest.schema_version != BUNDLE_SCHEMA_VERSION {
            return Err(load_err(format!(
                "bundle schema version {} is not supported (expected {})",
                manifest.schema_version, BUNDLE_SCHEMA_VERSION
            )));
        }
        Ok(manifest)
    }

    /// Load and cross-check both halves of the bundle.
    pub fn load(&self) -> Result<(BundleManifest, TfidfVectorizer, SentimentClassifier<InnerBackend>)> {
        let manifest = self.load_manifest()?;

        // ── Vectorizer: fingerprint must match the manifest ──────────────────
        let vec_path = self.dir.join(VECTORIZER_FILE);
        let bytes = fs::read(&vec_path).map_err(|e| {
            load_err(format!("cannot read vectorizer '{}': {e}", vec_path.display()))
        })?;
        if sha256_hex(&bytes) != manifest.vectorizer_sha256 {
            return Err(load_err(
                "vectorizer does not match the one this classifier was trained with",
            ));
        }
        let vectorizer: TfidfVectorizer = serde_json::from_slice(&bytes)
            .map_err(|e| load_err(format!("cannot deserialise vectorizer: {e}")))?;
        if vectorizer.n_features() != manifest.n_features {
            return Err(load_err(format!(
                "vectorizer has {} features, manifest declares {}",
                vectorizer.n_features(),
                manifest.n_features
            )));
        }

        // ── Classifier: rebuild the architecture, then restore weights ───────
        let device = NdArrayDevice::default();
        let model: SentimentClassifier<InnerBackend> = manifest.classifier.init(&device);
        let classifier_path = self.dir.join(CLASSIFIER_STEM);
        let record = NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .load(classifier_path.clone(), &device)
            .map_err(|e| {
                load_err(format!(
                    "cannot load classifier '{}': {e:?}",
                    classifier_path.display()
                ))
            })?;
        let model = model.load_record(record);

        if model.n_features() != manifest.n_features {
            return Err(load_err(format!(
                "classifier weights expect {} features, manifest declares {}",
                model.n_features(),
                manifest.n_features
            )));
        }

        tracing::debug!("Loaded model bundle from '{}'", self.dir.display());
        Ok((manifest, vectorizer, model))
    }

    pub fn load_predictor(&self) -> Result<SentimentPredictor> {
        let (_, vectorizer, model) = self.load()?;
        SentimentPredictor::new(vectorizer, model)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_reloaded_bundle_predicts_identically() {
        let fitted = test_support::fit_small_model();
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("bundle"));
        ckpt.save(&fitted.vectorizer, &fitted.model).unwrap();

        let before = SentimentPredictor::new(fitted.vectorizer.clone(), fitted.model.clone()).unwrap();
        let after  = ckpt.load_predictor().unwrap();

        let held_out = test_support::held_out_texts();
        let a = before.predict_batch(&held_out).unwrap();
        let b = after.predict_batch(&held_out).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.sentiment, y.sentiment);
            assert!((x.confidence - y.confidence).abs() < 1e-6);
        }
    }

    #[test]
    fn test_manifest_records_pairing() {
        let fitted = test_support::fit_small_model();
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let saved = ckpt.save(&fitted.vectorizer, &fitted.model).unwrap();

        let manifest = ckpt.load_manifest().unwrap();
        assert_eq!(manifest.schema_version, BUNDLE_SCHEMA_VERSION);
        assert_eq!(manifest.n_features, fitted.vectorizer.n_features());
        assert_eq!(manifest.vectorizer_sha256, saved.vectorizer_sha256);
        assert_eq!(manifest.vectorizer_sha256.len(), 64);
    }

    #[test]
    fn test_swapped_vectorizer_is_detected() {
        let fitted = test_support::fit_small_model();
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        ckpt.save(&fitted.vectorizer, &fitted.model).unwrap();

        // Replace the vectorizer with one fitted on different text
        let other = TfidfVectorizer::fit(
            &["completely different corpus".to_string()],
            Default::default(),
        )
        .unwrap();
        fs::write(dir.path().join(VECTORIZER_FILE), serde_json::to_vec(&other).unwrap()).unwrap();

        let err = ckpt.load().unwrap_err();
        assert!(matches!(err, SentimentError::ModelLoad(_)), "{err:?}");
    }

    #[test]
    fn test_unknown_schema_version_is_rejected() {
        let fitted = test_support::fit_small_model();
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let mut manifest = ckpt.save(&fitted.vectorizer, &fitted.model).unwrap();
        manifest.schema_version = BUNDLE_SCHEMA_VERSION + 1;
        fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_string(&manifest).unwrap(),
        )
        .unwrap();

        let err = ckpt.load().unwrap_err();
        match err {
            SentimentError::ModelLoad(msg) => assert!(msg.contains("schema version")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_bundle_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CheckpointManager::new(dir.path().join("nope")).load().unwrap_err();
        assert!(matches!(err, SentimentError::ModelLoad(_)));
    }
}
