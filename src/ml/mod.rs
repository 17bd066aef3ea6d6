// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Feature extraction and the classifier:
//
//   vectorizer.rs — TF-IDF over word unigrams and bigrams,
//                   vocabulary capped by corpus frequency,
//                   smooth idf, L2-normalised rows
//
//   model.rs      — logistic regression as one Linear layer
//                   (n_features → 2) with softmax output
//
//   trainer.rs    — Adam on cross-entropy with weight decay,
//                   seeded mini-batches, tol early stop
//
//   inferencer.rs — batched probability scoring and the
//                   immutable SentimentPredictor used to serve
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// TF-IDF feature extraction
pub mod vectorizer;

/// Logistic-regression classifier module
pub mod model;

/// Training loop with per-epoch validation
pub mod trainer;

/// Scoring and the loaded predictor
pub mod inferencer;
