//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{CacheHealth, CacheState, HealthResponse};
use crate::app_state::AppState;

/// `GET /health` — Service health status and cache freshness.
///
/// The process is healthy as long as it answers; an empty cache is
/// reported, not treated as a failure.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and when the event cache was last refreshed.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.query_service.cache();
    let (cache_state, last_refreshed_at) = match cache.modified_at().await {
        Ok(Some(at)) => (CacheState::Ready, Some(at)),
        Ok(None) => (CacheState::Empty, None),
        Err(e) => {
            tracing::warn!(error = %e, "cannot stat event cache");
            (CacheState::Unreadable, None)
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cache: CacheHealth {
                state: cache_state,
                path: cache.path().display().to_string(),
                last_refreshed_at,
            },
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
