//! Health check response DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// State of the cache artifact as seen by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    /// A snapshot exists.
    Ready,
    /// No refresh has succeeded yet.
    Empty,
    /// The file exists but its metadata cannot be read.
    Unreadable,
}

/// Cache section of [`HealthResponse`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheHealth {
    /// Cache state.
    pub state: CacheState,
    /// Cache artifact path.
    pub path: String,
    /// When the current snapshot was written.
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// Response body of `GET /health`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// Server time (RFC 3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Cache status.
    pub cache: CacheHealth,
}
