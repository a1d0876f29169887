//! JSON error responses for the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::diagnosis::DiagnosisError;

/// Errors returned by route handlers as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required keys absent from the body; holds the quoted key names.
    #[error("Missing {0}")]
    MissingFields(String),
    /// The body is not a JSON object of the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    /// Validation or provider failure.
    #[error(transparent)]
    Diagnosis(#[from] DiagnosisError),
    /// The blocking diagnosis task panicked or was cancelled.
    #[error("diagnosis task failed: {0}")]
    Task(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Diagnosis(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Diagnosis(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
