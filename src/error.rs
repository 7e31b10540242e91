//! Error types for sub-store
//!
//! This module provides error handling for the library, including:
//! - Domain errors raised by the subscription registry (validation, conflict, not found)
//! - Collaborator errors raised during download dispatch (upstream, artifact)
//! - Storage errors from the key-value layer
//! - HTTP status code mapping and the `{status, code, message}` failure envelope

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for sub-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sub-store
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "bind_address")
        key: Option<String>,
    },

    /// Input failed validation (bad subscription name, unknown target, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// A record with the same identity already exists
    #[error("conflict: {0}")]
    Conflict(String),

    /// Record not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Key-value store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Upstream subscription server could not be reached or answered with an error
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Artifact production failed
    #[error("artifact error: {0}")]
    Artifact(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Key-value store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A persisted value could not be decoded into the expected shape
    #[error("corrupt value under key '{key}': {reason}")]
    CorruptValue {
        /// The store key holding the bad value
        key: String,
        /// Why decoding failed
        reason: String,
    },
}

/// API failure envelope
///
/// Returned by API endpoints when an error occurs.
///
/// ```json
/// {
///   "status": "failed",
///   "code": "not_found",
///   "message": "not found: subscription 'work'"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Always `"failed"`
    pub status: String,

    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "failed".to_string(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict
            Error::Conflict(_) => 409,

            // 500 Internal Server Error - Server-side issues
            Error::Store(_) => 500,
            Error::Io(_) => 500,
            Error::Artifact(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::Upstream(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Conflict(_) => "conflict",
            Error::NotFound(_) => "not_found",
            Error::Store(StoreError::CorruptValue { .. }) => "corrupt_value",
            Error::Store(_) => "store_error",
            Error::Upstream(_) => "upstream_error",
            Error::Artifact(_) => "artifact_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::new(error.error_code(), error.to_string())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// match arm in ToHttpStatus that can be built without I/O.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("bind_address".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Validation("bad name".into()),
                400,
                "validation_error",
            ),
            (Error::Conflict("exists".into()), 409, "conflict"),
            (Error::NotFound("subscription work".into()), 404, "not_found"),
            (
                Error::Store(StoreError::QueryFailed("timeout".into())),
                500,
                "store_error",
            ),
            (
                Error::Store(StoreError::CorruptValue {
                    key: "subs".into(),
                    reason: "expected object".into(),
                }),
                500,
                "corrupt_value",
            ),
            (Error::Upstream("HTTP 503".into()), 502, "upstream_error"),
            (Error::Artifact("boom".into()), 500, "artifact_error"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_status_code() {
        for (error, expected_status, _) in all_error_variants() {
            assert_eq!(
                error.status_code(),
                expected_status,
                "wrong status for {:?}",
                error
            );
        }
    }

    #[test]
    fn every_variant_maps_to_expected_error_code() {
        for (error, _, expected_code) in all_error_variants() {
            assert_eq!(error.error_code(), expected_code, "wrong code for {:?}", error);
        }
    }

    #[test]
    fn validation_is_400_not_500() {
        assert_eq!(Error::Validation("x".into()).status_code(), 400);
    }

    #[test]
    fn not_found_is_404() {
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
    }

    #[test]
    fn api_error_from_error_carries_failed_status_and_display_message() {
        let error = Error::Conflict("subscription 'work' already exists".into());
        let display = error.to_string();
        let api_error: ApiError = error.into();

        assert_eq!(api_error.status, "failed");
        assert_eq!(api_error.code, "conflict");
        assert_eq!(api_error.message, display);
    }

    #[test]
    fn api_error_serializes_envelope_fields() {
        let api_error = ApiError::new("validation_error", "name contains illegal characters");
        let json = serde_json::to_value(&api_error).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["code"], "validation_error");
        assert_eq!(json["message"], "name contains illegal characters");
    }
}
