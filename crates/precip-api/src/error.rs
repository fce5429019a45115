//! # API Error Types
//!
//! Unified error handling for the HTTP layer. Every failure leaves the
//! service as a `{"success": false, "error": {...}}` envelope.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use precip_analytics::AnalyticsError;
use precip_domain::DomainError;

/// API-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid query parameters: {0}")]
    InvalidQuery(String),

    #[error("{0}")]
    InvalidFilter(#[from] DomainError),

    #[error("{0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Failed to read dataset {path}: {source}")]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset: {0}")]
    DatasetFormat(#[from] serde_json::Error),

    #[error("Invalid record at index {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: DomainError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidQuery(_) | Self::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            Self::Analytics(err) => match err {
                AnalyticsError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
                AnalyticsError::Conversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AnalyticsError::EmptyInput(_)
                | AnalyticsError::InsufficientData { .. }
                | AnalyticsError::DegenerateDistribution(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::DatasetIo { .. }
            | Self::DatasetFormat(_)
            | Self::InvalidRecord { .. }
            | Self::Config(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::InvalidFilter(_) => "INVALID_FILTER",
            Self::Analytics(err) => err.error_code(),
            Self::DatasetIo { .. } => "DATASET_IO",
            Self::DatasetFormat(_) => "DATASET_FORMAT",
            Self::InvalidRecord { .. } => "INVALID_RECORD",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        } else {
            tracing::warn!(code = self.error_code(), error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "code": self.error_code(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_errors_are_unprocessable() {
        let err: ApiError = AnalyticsError::InsufficientData {
            found: 1,
            required: 2,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "INSUFFICIENT_DATA");

        let err: ApiError = AnalyticsError::EmptyInput("no days".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_filter_errors_are_bad_requests() {
        let err: ApiError = DomainError::InvalidFilter("month must be between 1 and 12".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_FILTER");
    }

    #[test]
    fn test_dataset_errors_are_internal() {
        let err = ApiError::InvalidRecord {
            index: 7,
            source: DomainError::InvalidDate("x".into()),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("index 7"));
    }
}
