//! Location: a single position fix reported by the platform.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A position fix with optional accuracy, motion and floor data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub horizontal_accuracy: Option<f64>,
    pub vertical_accuracy: Option<f64>,
    /// Direction of travel in degrees from true north.
    pub course: Option<f64>,
    /// Speed in metres per second.
    pub speed: Option<f64>,
    pub timestamp: Option<Timestamp>,
    pub floor_level: Option<i32>,
}

impl Location {
    /// A fix with coordinates only.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::builder(latitude, longitude).build()
    }

    /// Create a builder seeded with the two required coordinates.
    #[must_use]
    pub fn builder(latitude: f64, longitude: f64) -> LocationBuilder {
        LocationBuilder {
            location: Self {
                latitude,
                longitude,
                altitude: None,
                horizontal_accuracy: None,
                vertical_accuracy: None,
                course: None,
                speed: None,
                timestamp: None,
                floor_level: None,
            },
        }
    }

    /// Sentinel with NaN coordinates and nothing else set.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    /// Whether this is the [`empty`](Self::empty) sentinel.
    ///
    /// `PartialEq` cannot detect it because NaN never compares equal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latitude.is_nan()
            && self.longitude.is_nan()
            && self.altitude.is_none()
            && self.horizontal_accuracy.is_none()
            && self.vertical_accuracy.is_none()
            && self.course.is_none()
            && self.speed.is_none()
            && self.timestamp.is_none()
            && self.floor_level.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat: {}, Lng: {}", self.latitude, self.longitude)?;
        if let Some(altitude) = self.altitude {
            write!(f, ", Alt: {altitude} m")?;
        }
        if let Some(accuracy) = self.horizontal_accuracy {
            write!(f, ", Acc: {accuracy} m")?;
        }
        if let Some(speed) = self.speed {
            write!(f, ", Speed: {speed} m/s")?;
        }
        if let Some(course) = self.course {
            write!(f, ", Course: {course}\u{b0}")?;
        }
        if let Some(floor) = self.floor_level {
            write!(f, ", Floor: {floor}")?;
        }
        if let Some(ts) = self.timestamp {
            write!(f, ", At: {}", ts.to_rfc3339())?;
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Location`].
#[derive(Debug)]
pub struct LocationBuilder {
    location: Location,
}

impl LocationBuilder {
    #[must_use]
    pub fn altitude(mut self, altitude: f64) -> Self {
        self.location.altitude = Some(altitude);
        self
    }

    #[must_use]
    pub fn horizontal_accuracy(mut self, accuracy: f64) -> Self {
        self.location.horizontal_accuracy = Some(accuracy);
        self
    }

    #[must_use]
    pub fn vertical_accuracy(mut self, accuracy: f64) -> Self {
        self.location.vertical_accuracy = Some(accuracy);
        self
    }

    #[must_use]
    pub fn course(mut self, course: f64) -> Self {
        self.location.course = Some(course);
        self
    }

    #[must_use]
    pub fn speed(mut self, speed: f64) -> Self {
        self.location.speed = Some(speed);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.location.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn floor_level(mut self, floor_level: i32) -> Self {
        self.location.floor_level = Some(floor_level);
        self
    }

    /// Consume the builder and return the [`Location`].
    #[must_use]
    pub fn build(self) -> Location {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::from_unix_seconds;

    #[test]
    fn should_build_with_only_coordinates() {
        let location = Location::new(48.8566, 2.3522);
        assert!((location.latitude - 48.8566).abs() < f64::EPSILON);
        assert!((location.longitude - 2.3522).abs() < f64::EPSILON);
        assert!(location.altitude.is_none());
        assert!(location.timestamp.is_none());
        assert!(location.floor_level.is_none());
    }

    #[test]
    fn should_build_with_all_fields() {
        let ts = from_unix_seconds(1_700_000_000.0).unwrap();
        let location = Location::builder(1.0, 2.0)
            .altitude(3.0)
            .horizontal_accuracy(4.0)
            .vertical_accuracy(5.0)
            .course(6.0)
            .speed(7.0)
            .timestamp(ts)
            .floor_level(-2)
            .build();

        assert_eq!(location.altitude, Some(3.0));
        assert_eq!(location.horizontal_accuracy, Some(4.0));
        assert_eq!(location.vertical_accuracy, Some(5.0));
        assert_eq!(location.course, Some(6.0));
        assert_eq!(location.speed, Some(7.0));
        assert_eq!(location.timestamp, Some(ts));
        assert_eq!(location.floor_level, Some(-2));
    }

    #[test]
    fn should_detect_empty_sentinel() {
        assert!(Location::empty().is_empty());
        assert!(!Location::builder(0.0, 0.0).build().is_empty());
    }

    #[test]
    fn should_compare_structurally() {
        let a = Location::builder(10.0, 20.0).speed(1.5).build();
        let b = Location::builder(10.0, 20.0).speed(1.5).build();
        let c = Location::builder(10.0, 20.0).speed(2.5).build();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn should_display_coordinates_and_present_fields() {
        let location = Location::builder(40.7128, -74.006)
            .altitude(500.0)
            .speed(5.0)
            .build();
        assert_eq!(
            location.to_string(),
            "Lat: 40.7128, Lng: -74.006, Alt: 500 m, Speed: 5 m/s"
        );
    }

    #[test]
    fn should_preserve_coordinates_through_serde_json() {
        let location = Location::builder(40.7128, -74.006)
            .timestamp(from_unix_seconds(1_677_648_652.0).unwrap())
            .build();
        let json = serde_json::to_string(&location).unwrap();
        let parsed: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, location);
        assert!((parsed.latitude - 40.7128).abs() < f64::EPSILON);
        assert!((parsed.longitude - (-74.006)).abs() < f64::EPSILON);
    }

    #[test]
    fn should_serialize_with_camel_case_keys() {
        let location = Location::builder(1.0, 2.0).horizontal_accuracy(3.0).build();
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["horizontalAccuracy"], serde_json::json!(3.0));
        assert!(json["floorLevel"].is_null());
    }
}
