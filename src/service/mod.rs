//! Service layer: query orchestration over the event cache.
//!
//! [`QueryService`] reads the cache, applies a [`crate::domain::QueryFilter`]
//! and projects the matching records.

pub mod query_service;

pub use query_service::{QueryOutcome, QueryService, apply_filter};
