// HTTP error responses: `{"detail": "<message>"}` with the status
// code of the failure class.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Startup load has not finished; the caller may retry later
    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    BadRequest(String),

    /// Startup load failed; this process will not serve
    #[error("Failed to load model: {0}")]
    ModelLoadFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_)         => StatusCode::BAD_REQUEST,
            ApiError::ModelLoadFailed(_)    => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_)           => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
