//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the request-level error type: each variant maps to a
//! specific HTTP status code and structured JSON error response.
//! [`CacheError`] and [`SyncError`] are internal to the cache and the
//! synchronization loop respectively; only the former ever reaches a caller.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3002,
///     "message": "event cache unavailable: static/data/sismos.geojson",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                 |
/// |-----------|------------|-----------------------------|
/// | 1000–1999 | Validation | 400 Bad Request             |
/// | 3000–3999 | Server     | 500 / 503                   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Query parameters could not be parsed or validated.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No snapshot has ever been written to the cache.
    #[error("event cache unavailable: {0}")]
    CacheUnavailable(String),

    /// The cache file exists but cannot be read or parsed.
    #[error("event cache corrupt: {0}")]
    CacheCorrupt(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::CacheUnavailable(_) => 3002,
            Self::CacheCorrupt(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::CacheCorrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Failures reading or replacing the on-disk event cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache file does not exist yet.
    #[error("no snapshot at {}", .0.display())]
    Unavailable(PathBuf),

    /// The cache file exists but its content is not a feature collection.
    #[error("cannot parse {}: {source}", path.display())]
    Corrupt {
        /// Cache file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Filesystem failure while reading or replacing the file.
    #[error("cache i/o on {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl From<CacheError> for GatewayError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Unavailable(_) => Self::CacheUnavailable(err.to_string()),
            CacheError::Corrupt { .. } | CacheError::Io { .. } => {
                Self::CacheCorrupt(err.to_string())
            }
        }
    }
}

/// Failures of a single synchronization iteration.
///
/// These never escape the scheduler loop; they are logged and the loop
/// proceeds to its next sleep.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// Transport failure or timeout talking to the upstream source.
    #[error("upstream request failed: {0}")]
    Network(String),

    /// Upstream answered 2xx but the body is not a feature collection.
    #[error("upstream payload rejected: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// The fetched snapshot could not be written to the cache.
    #[error("cache write failed: {0}")]
    CacheWrite(#[from] CacheError),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
