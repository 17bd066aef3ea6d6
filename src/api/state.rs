// ============================================================
// Layer 1 — Serving State
// ============================================================
// The loaded model lives in a write-once slot shared by every
// request handler:
//
//   empty            → Unloaded (startup still in progress)
//   Ready(predictor) → serving
//   Failed(message)  → startup load failed; never retried
//
// The slot is filled exactly once by the startup loader.
// Handlers only read it, so no request ever blocks on loading.

use std::sync::{Arc, OnceLock};

use crate::error::Result;
use crate::ml::inferencer::SentimentPredictor;

#[derive(Debug)]
pub enum ModelSlot {
    Ready(Arc<SentimentPredictor>),
    Failed(String),
}

/// Snapshot of the slot as seen by one request.
#[derive(Debug, Clone)]
pub enum ModelStatus {
    Unloaded,
    Ready(Arc<SentimentPredictor>),
    Failed(String),
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Unloaded  => "unloaded",
            ModelStatus::Ready(_)  => "ready",
            ModelStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    slot: Arc<OnceLock<ModelSlot>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State that is already serving `predictor`.
    pub fn ready(predictor: SentimentPredictor) -> Self {
        let state = Self::new();
        state.finish_loading(Ok(predictor));
        state
    }

    pub fn status(&self) -> ModelStatus {
        match self.slot.get() {
            None                          => ModelStatus::Unloaded,
            Some(ModelSlot::Ready(p))     => ModelStatus::Ready(Arc::clone(p)),
            Some(ModelSlot::Failed(msg))  => ModelStatus::Failed(msg.clone()),
        }
    }

    /// Record the outcome of the one startup load. Later calls are ignored.
    pub fn finish_loading(&self, outcome: Result<SentimentPredictor>) {
        let slot = match outcome {
            Ok(predictor) => {
                if let Some(v) = predictor.version() {
                    tracing::info!("Serving model {} v{} ({})", v.name, v.version, v.stage);
                }
                ModelSlot::Ready(Arc::new(predictor))
            }
            Err(e) => {
                tracing::error!("Failed to load model: {}", e);
                ModelSlot::Failed(e.to_string())
            }
        };
        if self.slot.set(slot).is_err() {
            tracing::warn!("Model already loaded; ignoring second load result");
        }
    }
}
