use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::generator::GenerationError;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rejected parameters (400) or no readable file from either backend (500)
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Generation(GenerationError::InvalidParameters(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Config(_) | Self::Internal(_) | Self::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Generation(GenerationError::InvalidParameters(_)) => "INVALID_PARAMETERS",
            Self::Generation(_) => "GENERATION_FAILED",
        }
    }
}

/// Error body: `{ error: { code, message } }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// Encode an error body as `MessagePack`, or JSON if that fails.
pub(crate) fn error_response(status: StatusCode, code: &'static str, message: String) -> Response {
    let body = ErrorResponse {
        error: ErrorDetail { code, message },
    };

    match rmp_serde::to_vec_named(&body) {
        Ok(bytes) => (status, [("content-type", "application/msgpack")], bytes).into_response(),
        Err(_) => {
            let json = serde_json::to_string(&body).unwrap_or_else(|_| {
                r#"{"error":{"code":"SERIALIZATION_ERROR","message":"Failed to serialize error"}}"#
                    .to_string()
            });
            (status, [("content-type", "application/json")], json).into_response()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }
        error_response(self.status_code(), self.code(), self.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_generation_failure_maps_to_500() {
        let err = AppError::from(GenerationError::Unreadable(PathBuf::from("/tmp/gone.wav")));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "GENERATION_FAILED");
        assert!(err.to_string().starts_with("generation failed"));
    }

    #[test]
    fn test_invalid_parameters_map_to_400() {
        let err = AppError::from(GenerationError::InvalidParameters(
            crate::mood::ParameterError::Tempo(999),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_PARAMETERS");
    }

    #[test]
    fn test_unreadable_body_has_no_path() {
        let err = AppError::from(GenerationError::Unreadable(PathBuf::from("/var/tmp/x.wav")));
        assert!(!err.to_string().contains("/var/tmp"));
    }

    #[test]
    fn test_bad_request_code() {
        let err = AppError::BadRequest("empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_error_body_is_msgpack() {
        let response = error_response(StatusCode::BAD_REQUEST, "BAD_REQUEST", "x".to_string());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/msgpack"
        );
    }
}
