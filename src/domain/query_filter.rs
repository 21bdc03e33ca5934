//! Per-request filter applied by the query service.

use chrono::NaiveDate;

/// Filter of one query.
///
/// `start_date <= end_date` is not enforced: an inverted range is legal
/// and matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    /// Events below this magnitude are dropped.
    pub min_magnitude: f64,
    /// First calendar day (UTC) included in the result.
    pub start_date: NaiveDate,
    /// Last calendar day (UTC) included in the result.
    pub end_date: NaiveDate,
}

impl QueryFilter {
    /// Creates a filter.
    #[must_use]
    pub const fn new(min_magnitude: f64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            min_magnitude,
            start_date,
            end_date,
        }
    }

    /// Returns the inclusive date bounds as ISO `YYYY-MM-DD` keys.
    ///
    /// ISO calendar dates order lexicographically the same way they order
    /// chronologically, so callers compare event days against these keys
    /// as plain strings.
    #[must_use]
    pub fn date_keys(&self) -> (String, String) {
        (
            self.start_date.format("%Y-%m-%d").to_string(),
            self.end_date.format("%Y-%m-%d").to_string(),
        )
    }
}
