//! Visit: a platform-detected dwell at a place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, epoch};

/// A stay at one place, reported retrospectively by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub arrival: Timestamp,
    pub departure: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
    pub horizontal_accuracy: f64,
}

impl Visit {
    /// Sentinel using the UTC epoch for both instants and NaN elsewhere.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            arrival: epoch(),
            departure: epoch(),
            latitude: f64::NAN,
            longitude: f64::NAN,
            horizontal_accuracy: f64::NAN,
        }
    }

    /// Whether this is the [`empty`](Self::empty) sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrival == epoch()
            && self.departure == epoch()
            && self.latitude.is_nan()
            && self.longitude.is_nan()
            && self.horizontal_accuracy.is_nan()
    }

    /// Time spent at the place.
    #[must_use]
    pub fn dwell(&self) -> chrono::TimeDelta {
        self.departure - self.arrival
    }
}

impl fmt::Display for Visit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Visit at Lat: {}, Lng: {} (\u{b1}{} m) from {} to {}",
            self.latitude,
            self.longitude,
            self.horizontal_accuracy,
            self.arrival.to_rfc3339(),
            self.departure.to_rfc3339(),
        )
    }
}
