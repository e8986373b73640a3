use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single recorded (or synthesized) track position
///
/// Points are plain values: interpolation copies originals and builds new
/// synthetic points, it never edits a point in place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPoint {
    /// Recording instant in UTC, `None` when absent or unparsable
    pub time: Option<DateTime<Utc>>,
    /// Signed degrees, NaN when the source value is missing or unparsable
    pub latitude: f64,
    /// Signed degrees, NaN when the source value is missing or unparsable
    pub longitude: f64,
    /// Meters, `None` when not recorded
    pub elevation: Option<f64>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            time: None,
            latitude,
            longitude,
            elevation: None,
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Check if both coordinates are usable for interpolation
    pub fn has_position(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}
