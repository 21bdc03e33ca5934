//! Query service: filtered, projected views of the cached snapshot.

use crate::cache::EventCache;
use crate::domain::{FeatureCollection, FilteredEvent, QueryFilter, RawEvent};
use crate::error::GatewayError;

/// Result of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// Matching events in cache order.
    pub events: Vec<FilteredEvent>,
    /// Records skipped because they could not be interpreted.
    pub skipped: usize,
}

/// Read-only query engine over the [`EventCache`].
///
/// Stateless: every call reads the cache afresh and never writes to it,
/// so identical filters over an unchanged cache give identical results.
#[derive(Debug, Clone)]
pub struct QueryService {
    cache: EventCache,
}

impl QueryService {
    /// Creates a query service reading from `cache`.
    #[must_use]
    pub const fn new(cache: EventCache) -> Self {
        Self { cache }
    }

    /// Returns a reference to the underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &EventCache {
        &self.cache
    }

    /// Reads the cache and returns the events matching `filter`.
    ///
    /// No fetch is attempted when the cache is missing.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CacheUnavailable`] if no snapshot exists yet
    /// and [`GatewayError::CacheCorrupt`] if it cannot be read or parsed.
    pub async fn query(&self, filter: &QueryFilter) -> Result<QueryOutcome, GatewayError> {
        let collection = self.cache.read().await?;
        let outcome = apply_filter(&collection, filter);

        if outcome.skipped > 0 {
            tracing::warn!(skipped = outcome.skipped, "malformed records skipped");
        }
        tracing::debug!(
            matched = outcome.events.len(),
            total = collection.len(),
            min_magnitude = filter.min_magnitude,
            start_date = %filter.start_date,
            end_date = %filter.end_date,
            "query evaluated"
        );
        Ok(outcome)
    }
}

/// Applies `filter` to every feature of `collection` in stored order.
///
/// Records that cannot be interpreted are skipped and counted; they never
/// fail the query. Events without a magnitude are filtered out, not
/// counted as malformed.
#[must_use]
pub fn apply_filter(collection: &FeatureCollection, filter: &QueryFilter) -> QueryOutcome {
    let (start_key, end_key) = filter.date_keys();
    let mut events = Vec::new();
    let mut skipped = 0;

    for (index, feature) in collection.features.iter().enumerate() {
        let event = match RawEvent::from_feature(feature) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed record");
                skipped += 1;
                continue;
            }
        };

        let Some(magnitude) = event.magnitude.filter(|m| *m >= filter.min_magnitude) else {
            continue;
        };

        let projected = match FilteredEvent::project(&event, magnitude) {
            Ok(projected) => projected,
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed record");
                skipped += 1;
                continue;
            }
        };

        let day = projected.day();
        if start_key.as_str() <= day && day <= end_key.as_str() {
            events.push(projected);
        }
    }

    QueryOutcome { events, skipped }
}
