use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Domain-specific error types for the prediction service.
/// Failure semantics by category:
/// - `InvalidInput` is surfaced to the caller as a 400, never silently corrected
/// - `DataUnavailable` means a collaborator (weather, injuries, matchup data)
///   had nothing for us -- callers degrade and continue, never abort a prediction
/// - `Numeric` covers degenerate math (zero std-dev, no odds edge); callers
///   fall back to neutral values
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("numeric degeneracy: {0}")]
    Numeric(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PredictError {
    fn from(e: reqwest::Error) -> Self {
        PredictError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for PredictError {
    fn from(e: serde_json::Error) -> Self {
        PredictError::Parse(e.to_string())
    }
}

impl From<rusqlite::Error> for PredictError {
    fn from(e: rusqlite::Error) -> Self {
        PredictError::Database(e.to_string())
    }
}

impl From<std::io::Error> for PredictError {
    fn from(e: std::io::Error) -> Self {
        PredictError::Database(e.to_string())
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = match &self {
            PredictError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PredictError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub type PredictResult<T> = Result<T, PredictError>;
