//! Error types for triage-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message returned when subject or description is missing
pub const MISSING_INPUT_MESSAGE: &str = "Please provide both subject and description";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Subject or description missing or empty (400)
    #[error("{}", MISSING_INPUT_MESSAGE)]
    MissingInput,

    /// Unusable request body (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// triage-common error, including classifier failures (500)
    #[error(transparent)]
    Common(#[from] triage_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingInput | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Common(_) => {
                error!(error = %self, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": "error",
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
