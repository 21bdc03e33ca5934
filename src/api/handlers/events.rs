//! Event query handlers: filtered views of the cached snapshot.

use axum::extract::{Query, State};
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{EventQueryParams, LegacyEventDto, LegacyQueryParams};
use crate::app_state::AppState;
use crate::domain::FilteredEvent;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::QueryOutcome;

/// Response header carrying the number of records skipped as malformed.
pub const SKIPPED_RECORDS_HEADER: &str = "x-skipped-records";

/// `GET /events` — Filtered events from the cache.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for bad parameters,
/// [`GatewayError::CacheUnavailable`] before the first successful refresh,
/// and [`GatewayError::CacheCorrupt`] if the cache cannot be parsed.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Query cached events",
    description = "Returns cached events with magnitude >= minMagnitude whose UTC calendar day lies in [startDate, endDate], in cache order.",
    params(EventQueryParams),
    responses(
        (status = 200, description = "Matching events", body = Vec<FilteredEvent>),
        (status = 400, description = "Invalid filter parameters", body = ErrorResponse),
        (status = 500, description = "Cache is corrupt", body = ErrorResponse),
        (status = 503, description = "No snapshot fetched yet", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventQueryParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let outcome = run_query(&state, params).await?;
    let skipped = skipped_header(&outcome);
    Ok(([(SKIPPED_RECORDS_HEADER, skipped)], Json(outcome.events)))
}

/// `GET /api/sismos_filtrados` — Same query with the legacy parameter
/// names and item shape.
///
/// # Errors
///
/// Same as [`list_events`].
#[utoipa::path(
    get,
    path = "/api/sismos_filtrados",
    tag = "Events",
    summary = "Query cached events (compatibility shape)",
    description = "Accepts min_magnitud, start_time, end_time and returns items with lat, lng, magnitud, profundidad, fecha, lugar.",
    params(LegacyQueryParams),
    responses(
        (status = 200, description = "Matching events", body = Vec<LegacyEventDto>),
        (status = 400, description = "Invalid filter parameters", body = ErrorResponse),
        (status = 500, description = "Cache is corrupt", body = ErrorResponse),
        (status = 503, description = "No snapshot fetched yet", body = ErrorResponse),
    )
)]
pub async fn legacy_filtered_events(
    State(state): State<AppState>,
    Query(params): Query<LegacyQueryParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let outcome = run_query(&state, params.into()).await?;
    let skipped = skipped_header(&outcome);
    let items: Vec<LegacyEventDto> = outcome.events.into_iter().map(Into::into).collect();
    Ok(([(SKIPPED_RECORDS_HEADER, skipped)], Json(items)))
}

async fn run_query(
    state: &AppState,
    params: EventQueryParams,
) -> Result<QueryOutcome, GatewayError> {
    let filter = params.into_filter(state.default_start_date, Utc::now().date_naive())?;
    state.query_service.query(&filter).await
}

fn skipped_header(outcome: &QueryOutcome) -> HeaderValue {
    HeaderValue::from(outcome.skipped)
}

/// Versioned event routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", get(list_events))
}

/// Compatibility routes mounted at the root level.
pub fn legacy_routes() -> Router<AppState> {
    Router::new().route("/api/sismos_filtrados", get(legacy_filtered_events))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::api::build_router;
    use crate::app_state::AppState;
    use crate::cache::EventCache;
    use crate::service::QueryService;

    /// 2025-07-15 00:00:00 UTC.
    const JULY_15: i64 = 1_752_537_600_000;

    fn state_for(dir: &TempDir) -> (EventCache, AppState) {
        let cache = EventCache::new(dir.path().join("events.geojson"));
        let Some(default_start_date) = NaiveDate::from_ymd_opt(2025, 1, 1) else {
            panic!("valid date");
        };
        let state = AppState {
            query_service: Arc::new(QueryService::new(cache.clone())),
            default_start_date,
        };
        (cache, state)
    }

    async fn seed(cache: &EventCache) {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "geometry": { "coordinates": [-71.6, -33.0, 35.2] },
                    "properties": { "mag": 5.0, "time": JULY_15, "place": "10km N of Example" }
                },
                {
                    "geometry": { "coordinates": [] },
                    "properties": { "mag": 5.0, "time": JULY_15, "place": "broken" }
                }
            ]
        });
        let Ok(bytes) = serde_json::to_vec(&doc) else {
            panic!("serialize");
        };
        assert!(cache.write(&bytes).await.is_ok());
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, Option<String>, Value) {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("request build failed");
        };
        let Ok(response) = build_router().with_state(state).oneshot(request).await;
        let status = response.status();
        let skipped = response
            .headers()
            .get(super::SKIPPED_RECORDS_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let Ok(body) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, skipped, json)
    }

    #[tokio::test]
    async fn events_endpoint_filters_and_projects() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let (cache, state) = state_for(&dir);
        seed(&cache).await;

        let (status, skipped, body) = get(
            state,
            "/api/v1/events?minMagnitude=4.5&startDate=2025-07-01&endDate=2025-07-31",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(skipped.as_deref(), Some("1"));
        assert_eq!(
            body,
            json!([{
                "lat": -33.0,
                "lng": -71.6,
                "depthKm": 35.2,
                "magnitude": 5.0,
                "occurredAt": "2025-07-15 00:00:00",
                "place": "10km N of Example"
            }])
        );
    }

    #[tokio::test]
    async fn events_endpoint_returns_empty_list_above_threshold() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let (cache, state) = state_for(&dir);
        seed(&cache).await;

        let (status, _, body) = get(state, "/api/v1/events?minMagnitude=6.0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn missing_cache_is_service_unavailable() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let (_, state) = state_for(&dir);

        let (status, _, body) = get(state, "/api/v1/events").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], 3002);
    }

    #[tokio::test]
    async fn bad_filter_is_bad_request() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let (cache, state) = state_for(&dir);
        seed(&cache).await;

        let (status, _, body) = get(state, "/api/v1/events?startDate=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn legacy_endpoint_uses_compat_shape() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir");
        };
        let (cache, state) = state_for(&dir);
        seed(&cache).await;

        let (status, _, body) = get(
            state,
            "/api/sismos_filtrados?min_magnitud=4.5&start_time=2025-07-01&end_time=2025-07-31",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "lat": -33.0,
                "lng": -71.6,
                "magnitud": 5.0,
                "profundidad": 35.2,
                "fecha": "2025-07-15 00:00:00",
                "lugar": "10km N of Example"
            }])
        );
    }
}
