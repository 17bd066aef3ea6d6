// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence and bookkeeping shared by the other layers:
//
//   checkpoint.rs     — the model bundle: vectorizer and
//                       classifier saved as one directory with
//                       a manifest that pins them together
//
//   tracking_store.rs — local file-backed experiment tracking
//                       and model registry (runs, params,
//                       metrics, artifacts, versions, stages)
//
//   metrics.rs        — per-epoch CSV log and the held-out
//                       classification metrics

/// Vectorizer + classifier bundle saving and loading
pub mod checkpoint;

/// File-backed TrackingStore and ModelRegistry
pub mod tracking_store;

/// Training log and evaluation metrics
pub mod metrics;
