// ============================================================
// Layer 1 — HTTP Handlers
// ============================================================
//   POST /predict  {text}  → {sentiment, confidence}
//   GET  /health           → {status, model?}
//
// Predict checks the model state before the input, so a server
// that is still loading answers 503 even for empty text.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::state::{AppState, ModelStatus};
use crate::domain::review::Prediction;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name:    String,
    pub version: u32,
    pub stage:   String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model:  Option<ModelInfo>,
}

pub async fn predict(
    State(state): State<AppState>,
    Json(body):   Json<PredictRequest>,
) -> Result<Json<Prediction>, ApiError> {
    let predictor = match state.status() {
        ModelStatus::Ready(p)    => p,
        ModelStatus::Unloaded    => return Err(ApiError::ServiceUnavailable("Model not loaded".into())),
        ModelStatus::Failed(msg) => return Err(ApiError::ModelLoadFailed(msg)),
    };
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Input text cannot be empty".into()));
    }

    let prediction = predictor
        .predict(&body.text)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tracing::debug!("Predicted {} ({:.3})", prediction.sentiment, prediction.confidence);
    Ok(Json(prediction))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = state.status();
    let (code, model) = match &status {
        ModelStatus::Ready(p) => (
            StatusCode::OK,
            p.version().map(|v| ModelInfo {
                name:    v.name.clone(),
                version: v.version,
                stage:   v.stage.to_string(),
            }),
        ),
        _ => (StatusCode::SERVICE_UNAVAILABLE, None),
    };
    (code, Json(HealthResponse { status: status.as_str(), model }))
}
