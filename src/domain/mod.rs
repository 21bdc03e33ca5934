//! Domain layer: upstream event shape, query filter, and result projection.
//!
//! [`RawEvent`] mirrors one upstream feature, [`QueryFilter`] carries the
//! per-request predicate, and [`FilteredEvent`] is what callers receive.

pub mod filtered_event;
pub mod query_filter;
pub mod raw_event;

pub use filtered_event::FilteredEvent;
pub use query_filter::QueryFilter;
pub use raw_event::{FeatureCollection, MalformedRecord, RawEvent};
