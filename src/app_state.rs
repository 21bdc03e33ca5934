//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::service::QueryService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Query service over the event cache.
    pub query_service: Arc<QueryService>,
    /// `startDate` used when a query omits it.
    pub default_start_date: NaiveDate,
}
