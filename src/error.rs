//! Custom error types and handling
//!
//! This module defines the application's error types and implements
//! conversion to HTTP responses for the Axum framework.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Infrastructure errors
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in response
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ServiceUnavailable(_) => "INFRASTRUCTURE_UNAVAILABLE",
            Self::Docker(_) => "DOCKER_ERROR",
            Self::Workspace(_) => "WORKSPACE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Docker(_) | Self::Workspace(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// HTTP status the Docker daemon answered with, when there was one
    pub fn docker_status(&self) -> Option<u16> {
        match self {
            Self::Docker(message) => message.split_once(':')?.0.parse().ok(),
            _ => None,
        }
    }

    /// True when the daemon reports the object as missing (404) or
    /// already being removed (409)
    pub fn is_gone(&self) -> bool {
        matches!(self.docker_status(), Some(404) | Some(409))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors but don't expose details to clients
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Docker(e) => {
                tracing::error!("Docker error: {}", e);
                "A container engine error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Implement From for common error types
impl From<bollard::errors::Error> for AppError {
    fn from(err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => AppError::Docker(format!("{}: {}", status_code, message)),
            bollard::errors::Error::RequestTimeoutError => {
                AppError::Timeout("Docker request timed out".to_string())
            }
            other => AppError::Docker(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Workspace(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_maps_to_503() {
        let err = AppError::ServiceUnavailable("Docker is not running".to_string());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "INFRASTRUCTURE_UNAVAILABLE");
    }

    #[test]
    fn test_docker_404_is_gone() {
        let err: AppError = bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message: "No such container: abc".to_string(),
        }
        .into();
        assert_eq!(err.docker_status(), Some(404));
        assert!(err.is_gone());

        let err: AppError = bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(!err.is_gone());
        assert_eq!(AppError::Docker("connection refused".to_string()).docker_status(), None);
    }
}
