//! Query result projection of a [`RawEvent`].

use chrono::DateTime;
use serde::Serialize;
use utoipa::ToSchema;

use super::raw_event::{MalformedRecord, RawEvent};

/// Timestamp pattern of [`FilteredEvent::occurred_at`].
pub const OCCURRED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One event as returned to query callers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilteredEvent {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Depth in kilometers; `null` when upstream omitted it.
    pub depth_km: Option<f64>,
    /// Event magnitude.
    pub magnitude: f64,
    /// UTC origin time as `YYYY-MM-DD HH:MM:SS`.
    pub occurred_at: String,
    /// Human-readable location.
    pub place: Option<String>,
}

impl FilteredEvent {
    /// Projects an event that already passed the magnitude check.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord::TimeOutOfRange`] if the event time cannot
    /// be represented as a calendar date.
    pub fn project(event: &RawEvent, magnitude: f64) -> Result<Self, MalformedRecord> {
        let occurred_at = DateTime::from_timestamp_millis(event.occurred_at_millis)
            .ok_or(MalformedRecord::TimeOutOfRange(event.occurred_at_millis))?;

        Ok(Self {
            lat: event.latitude,
            lng: event.longitude,
            depth_km: event.depth_km,
            magnitude,
            occurred_at: occurred_at.format(OCCURRED_AT_FORMAT).to_string(),
            place: event.place.clone(),
        })
    }

    /// Calendar day part (`YYYY-MM-DD`) of [`Self::occurred_at`].
    #[must_use]
    pub fn day(&self) -> &str {
        self.occurred_at
            .split_once(' ')
            .map_or(self.occurred_at.as_str(), |(day, _)| day)
    }
}
