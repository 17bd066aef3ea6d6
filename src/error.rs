// ============================================================
// Error Types
// ============================================================
// One variant per failure class of the pipeline. Offline jobs
// (train, register) surface these to the operator; the HTTP
// layer maps the request-time ones onto status codes.
//
// None of these are retried anywhere in the system.

use std::io;

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`SentimentError`].
pub type Result<T> = std::result::Result<T, SentimentError>;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// Dataset missing or malformed. Training only, fatal.
    #[error("dataset error: {0}")]
    Data(String),

    /// No eligible run to promote. Fatal.
    #[error("registration error: {0}")]
    Registration(String),

    /// Version, artifact or bundle could not be resolved at startup.
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// The tracking store rejected or could not serve a request.
    #[error("tracking store error: {0}")]
    Tracking(String),

    /// Fitting or scoring failed (empty vocabulary, tensor readback).
    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SentimentError {
    /// Re-tag any error as a startup load failure, keeping its message.
    pub fn into_model_load(self) -> Self {
        match self {
            SentimentError::ModelLoad(_) => self,
            other => SentimentError::ModelLoad(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_model_load_keeps_message() {
        let err = SentimentError::Tracking("run 'abc' not found".into()).into_model_load();
        match err {
            SentimentError::ModelLoad(msg) => assert!(msg.contains("run 'abc' not found")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_model_load_is_not_rewrapped() {
        let err = SentimentError::ModelLoad("missing".into()).into_model_load();
        assert_eq!(err.to_string(), "model load error: missing");
    }
}
