//! Query parameter and response DTOs for the event endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{FilteredEvent, QueryFilter};
use crate::error::GatewayError;

/// Query string of `GET /api/v1/events`.
///
/// Values are taken as raw strings so malformed input produces a
/// structured `InvalidRequest` instead of a bare extractor rejection.
/// Empty values fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventQueryParams {
    /// Minimum magnitude, inclusive. Defaults to `0`.
    pub min_magnitude: Option<String>,
    /// First UTC day included (`YYYY-MM-DD`). Defaults to the configured floor.
    pub start_date: Option<String>,
    /// Last UTC day included (`YYYY-MM-DD`). Defaults to today.
    pub end_date: Option<String>,
}

/// Query string of the compatibility endpoint `GET /api/sismos_filtrados`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LegacyQueryParams {
    /// Minimum magnitude, inclusive.
    pub min_magnitud: Option<String>,
    /// First UTC day included (`YYYY-MM-DD`).
    pub start_time: Option<String>,
    /// Last UTC day included (`YYYY-MM-DD`).
    pub end_time: Option<String>,
}

impl From<LegacyQueryParams> for EventQueryParams {
    fn from(legacy: LegacyQueryParams) -> Self {
        Self {
            min_magnitude: legacy.min_magnitud,
            start_date: legacy.start_time,
            end_date: legacy.end_time,
        }
    }
}

impl EventQueryParams {
    /// Validates the parameters and builds a [`QueryFilter`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the magnitude is not a
    /// finite number or a date is not `YYYY-MM-DD`.
    pub fn into_filter(
        self,
        default_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<QueryFilter, GatewayError> {
        let min_magnitude = match non_empty(self.min_magnitude) {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|m| m.is_finite())
                .ok_or_else(|| {
                    GatewayError::InvalidRequest(format!("minMagnitude is not a number: {raw}"))
                })?,
            None => 0.0,
        };

        let start_date = parse_date("startDate", self.start_date)?.unwrap_or(default_start);
        let end_date = parse_date("endDate", self.end_date)?.unwrap_or(today);

        Ok(QueryFilter::new(min_magnitude, start_date, end_date))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(name: &str, value: Option<String>) -> Result<Option<NaiveDate>, GatewayError> {
    non_empty(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                GatewayError::InvalidRequest(format!("{name} must be YYYY-MM-DD, got {raw}"))
            })
        })
        .transpose()
}

/// Item shape of the compatibility endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LegacyEventDto {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Magnitude.
    pub magnitud: f64,
    /// Depth in kilometers.
    pub profundidad: Option<f64>,
    /// UTC origin time as `YYYY-MM-DD HH:MM:SS`.
    pub fecha: String,
    /// Human-readable location.
    pub lugar: Option<String>,
}

impl From<FilteredEvent> for LegacyEventDto {
    fn from(event: FilteredEvent) -> Self {
        Self {
            lat: event.lat,
            lng: event.lng,
            magnitud: event.magnitude,
            profundidad: event.depth_km,
            fecha: event.occurred_at,
            lugar: event.place,
        }
    }
}
