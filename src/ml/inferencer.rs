// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Scores free text with a fitted vectorizer + classifier pair.
//
//   text ─► normalize ─► TF-IDF transform ─► softmax(linear)
//        ─► label = argmax, confidence = max probability
//
// Requests go through the same normaliser as the training data.
//
// burn modules are Send but not Sync; the classifier sits behind
// a Mutex so one predictor can be shared across request threads.

use std::sync::Mutex;

use burn::{backend::ndarray::NdArrayDevice, prelude::*};

use crate::data::batcher::FeatureBatcher;
use crate::data::preprocessor::normalize;
use crate::domain::review::{Prediction, Sentiment};
use crate::domain::tracking::ModelVersion;
use crate::error::{Result, SentimentError};
use crate::ml::model::{SentimentClassifier, NUM_CLASSES};
use crate::ml::trainer::InnerBackend;
use crate::ml::vectorizer::{SparseVector, TfidfVectorizer};

/// Class probabilities `[p_negative, p_positive]` for each row.
pub fn predict_probabilities<B: Backend>(
    model:      &SentimentClassifier<B>,
    batcher:    &FeatureBatcher<B>,
    rows:       &[SparseVector],
    batch_size: usize,
) -> Result<Vec<[f32; 2]>> {
    let mut out = Vec::with_capacity(rows.len());
    for chunk in rows.chunks(batch_size.max(1)) {
        let refs: Vec<&SparseVector> = chunk.iter().collect();
        let flat: Vec<f32> = model
            .probabilities(batcher.features(&refs))
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| SentimentError::Training(format!("cannot read probabilities: {e:?}")))?;
        out.extend(flat.chunks_exact(NUM_CLASSES).map(|p| [p[0], p[1]]));
    }
    Ok(out)
}

/// Label 1 wins only when strictly more probable than label 0.
pub fn to_prediction(p: [f32; 2]) -> Prediction {
    let label = u8::from(p[1] > p[0]);
    Prediction {
        sentiment:  Sentiment::from_label(label),
        confidence: p[0].max(p[1]),
    }
}

pub fn predict_labels(probs: &[[f32; 2]]) -> Vec<u8> {
    probs.iter().map(|&p| to_prediction(p).sentiment.label()).collect()
}

/// An immutable, loaded vectorizer + classifier pair.
pub struct SentimentPredictor {
    vectorizer: TfidfVectorizer,
    model:      Mutex<SentimentClassifier<InnerBackend>>,
    batcher:    FeatureBatcher<InnerBackend>,
    version:    Option<ModelVersion>,
}

impl std::fmt::Debug for SentimentPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentPredictor")
            .field("n_features", &self.vectorizer.n_features())
            .field("version", &self.version)
            .finish()
    }
}

impl SentimentPredictor {
    /// Pair a vectorizer with a classifier, refusing mismatched widths.
    pub fn new(vectorizer: TfidfVectorizer, model: SentimentClassifier<InnerBackend>) -> Result<Self> {
        if model.n_features() != vectorizer.n_features() {
            return Err(SentimentError::ModelLoad(format!(
                "classifier expects {} features but vectorizer produces {}",
                model.n_features(),
                vectorizer.n_features()
            )));
        }
        let batcher = FeatureBatcher::new(NdArrayDevice::default(), vectorizer.n_features());
        Ok(Self {
            vectorizer,
            model: Mutex::new(model),
            batcher,
            version: None,
        })
    }

    pub fn with_version(mut self, version: ModelVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Registered version this predictor was loaded from, if any
    pub fn version(&self) -> Option<&ModelVersion> {
        self.version.as_ref()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let mut predictions = self.predict_batch(std::slice::from_ref(&text))?;
        predictions
            .pop()
            .ok_or_else(|| SentimentError::Training("no prediction returned".into()))
    }

    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        let rows: Vec<SparseVector> = texts
            .iter()
            .map(|t| self.vectorizer.transform(&normalize(t.as_ref())))
            .collect();

        let model = self
            .model
            .lock()
            .map_err(|_| SentimentError::Training("classifier lock poisoned".into()))?;
        let probs = predict_probabilities(&*model, &self.batcher, &rows, rows.len())?;

        Ok(probs.into_iter().map(to_prediction).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SentimentClassifierConfig;
    use crate::ml::vectorizer::VectorizerConfig;

    fn fitted_vectorizer() -> TfidfVectorizer {
        TfidfVectorizer::fit(
            &["good movie".to_string(), "bad movie".to_string()],
            VectorizerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_to_prediction_picks_larger_probability() {
        let p = to_prediction([0.2, 0.8]);
        assert_eq!(p.sentiment, Sentiment::Positive);
        assert!((p.confidence - 0.8).abs() < 1e-6);

        let n = to_prediction([0.7, 0.3]);
        assert_eq!(n.sentiment, Sentiment::Negative);
        assert!((n.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_exact_tie_is_negative() {
        assert_eq!(to_prediction([0.5, 0.5]).sentiment, Sentiment::Negative);
        assert_eq!(predict_labels(&[[0.5, 0.5], [0.1, 0.9]]), vec![0, 1]);
    }

    #[test]
    fn test_mismatched_widths_are_rejected() {
        let vectorizer = fitted_vectorizer();
        let model = SentimentClassifierConfig::new(vectorizer.n_features() + 1)
            .init::<InnerBackend>(&NdArrayDevice::default());
        let err = SentimentPredictor::new(vectorizer, model).unwrap_err();
        assert!(matches!(err, SentimentError::ModelLoad(_)));
    }

    #[test]
    fn test_untrained_predictor_is_confidently_undecided() {
        let vectorizer = fitted_vectorizer();
        let model = SentimentClassifierConfig::new(vectorizer.n_features())
            .init::<InnerBackend>(&NdArrayDevice::default());
        let predictor = SentimentPredictor::new(vectorizer, model).unwrap();

        let p = predictor.predict("A good movie!").unwrap();
        assert!((p.confidence - 0.5).abs() < 1e-6);

        let batch = predictor.predict_batch(&["good", "bad", ""]).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|p| (0.5..=1.0).contains(&p.confidence)));
    }
}
