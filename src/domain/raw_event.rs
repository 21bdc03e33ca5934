//! Upstream wire shape of the event feed.
//!
//! The cache stores the upstream GeoJSON document verbatim. Parsing is
//! split in two stages: [`FeatureCollection`] only requires the outer
//! shape, and each feature is converted to a [`RawEvent`] on its own so a
//! single malformed record cannot invalidate the whole snapshot.

use serde::Deserialize;

/// Top-level GeoJSON `FeatureCollection`.
///
/// Features are kept as untyped JSON until [`RawEvent::from_feature`]
/// inspects them. A document without a `features` member is an empty
/// collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    /// Raw feature objects in upstream order.
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

impl FeatureCollection {
    /// Parses a serialized collection.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if the bytes are not a JSON object
    /// with an optional `features` array.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Number of features in the collection, malformed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct WireFeature {
    geometry: WireGeometry,
    properties: WireProperties,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    coordinates: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct WireProperties {
    #[serde(default)]
    mag: Option<f64>,
    time: i64,
    #[serde(default)]
    place: Option<String>,
}

/// Reason a feature could not be turned into a [`RawEvent`].
#[derive(Debug, thiserror::Error)]
pub enum MalformedRecord {
    /// Feature does not match the expected geometry/properties shape.
    #[error("unexpected feature shape: {0}")]
    Shape(#[from] serde_json::Error),

    /// Longitude or latitude is missing from the coordinate triple.
    #[error("coordinate triple lacks longitude or latitude")]
    MissingCoordinates,

    /// Event time is outside the representable calendar range.
    #[error("event time {0} ms is out of range")]
    TimeOutOfRange(i64),
}

/// One seismic event as published upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Hypocenter depth in kilometers, when published.
    pub depth_km: Option<f64>,
    /// Event magnitude, when published.
    pub magnitude: Option<f64>,
    /// Origin time as UTC epoch milliseconds.
    pub occurred_at_millis: i64,
    /// Human-readable location.
    pub place: Option<String>,
}

impl RawEvent {
    /// Converts one untyped feature into a [`RawEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] if the feature lacks geometry or
    /// properties, the magnitude or time is not numeric, or the coordinate
    /// triple has no longitude/latitude.
    pub fn from_feature(feature: &serde_json::Value) -> Result<Self, MalformedRecord> {
        let wire = WireFeature::deserialize(feature)?;

        let mut coords = wire.geometry.coordinates.into_iter();
        let (Some(Some(longitude)), Some(Some(latitude))) = (coords.next(), coords.next()) else {
            return Err(MalformedRecord::MissingCoordinates);
        };
        let depth_km = coords.next().flatten();

        Ok(Self {
            longitude,
            latitude,
            depth_km,
            magnitude: wire.properties.mag,
            occurred_at_millis: wire.properties.time,
            place: wire.properties.place,
        })
    }
}
