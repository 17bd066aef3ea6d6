// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From the review CSV to tensor batches:
//
//   reviews.csv
//       │
//       ▼
//   CsvReviewLoader   → reads `review` / `sentiment` rows
//       │
//       ▼
//   normalize         → lowercase, strip tags, letters only,
//       │                drop stopwords
//       ▼
//   load_dataset      → seeded 80 / 10 / 10 split
//       │
//       ▼
//   (TfidfVectorizer in Layer 5)
//       │
//       ▼
//   FeatureBatcher    → dense feature tensors + label tensors
//
// Each step is independently testable and replaceable.

/// Reads labelled reviews from CSV
pub mod loader;

/// The deterministic text normaliser
pub mod preprocessor;

/// Two-stage train / validation / test split
pub mod dataset;

/// Stacks sparse rows into Burn tensors
pub mod batcher;

/// Seeded shuffle-and-split
pub mod splitter;
