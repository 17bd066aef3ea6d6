// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case drives the data,
// ml and infra layers through one offline job or the serving
// startup. No tensor code and no printing here.

/// One tracked training run
pub mod train_use_case;

/// Promote the best run to Production
pub mod register_use_case;

/// Resolve and load the serving model
pub mod predict_use_case;
