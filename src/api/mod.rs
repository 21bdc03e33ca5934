//! REST API layer: route handlers, DTOs, router composition, and the
//! OpenAPI document.
//!
//! Versioned endpoints are mounted under `/api/v1`; the health check and
//! the compatibility endpoint live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "quake-gateway", description = "Filtered views of a cached seismic event feed"),
    paths(
        handlers::events::list_events,
        handlers::events::legacy_filtered_events,
        handlers::system::health_handler,
    ),
    components(schemas(
        crate::domain::FilteredEvent,
        dto::LegacyEventDto,
        dto::HealthResponse,
        dto::CacheHealth,
        dto::CacheState,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Events", description = "Queries over the cached event snapshot"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::events::legacy_routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
