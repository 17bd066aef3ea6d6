// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define what the
// system works with. No burn types, no file I/O, no HTTP.
//
//   review.rs    — ReviewRecord, Sentiment, Prediction
//   tracking.rs  — Experiment, RunRecord, ModelVersion, Stage
//   traits.rs    — ReviewSource, TrackingStore, ModelRegistry

pub mod review;

pub mod tracking;

pub mod traits;
