//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for location fixes and visit arrival/departure.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// The UTC epoch, used by the `empty` sentinels.
#[must_use]
pub fn epoch() -> Timestamp {
    DateTime::UNIX_EPOCH
}

/// Convert fractional seconds since the Unix epoch into a [`Timestamp`].
///
/// Precision is one millisecond: the value is scaled to milliseconds and
/// truncated toward zero. Returns `None` for non-finite input or instants
/// chrono cannot represent.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn from_unix_seconds(seconds: f64) -> Option<Timestamp> {
    let millis = (seconds * 1000.0).trunc();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Convert a [`Timestamp`] back into fractional seconds since the Unix epoch.
#[must_use]
pub fn to_unix_seconds(ts: Timestamp) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = ts.timestamp_millis() as f64;
    millis / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_convert_whole_seconds() {
        let ts = from_unix_seconds(1_677_648_652.0).unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-03-01T05:30:52+00:00");
    }

    #[test]
    fn should_truncate_to_millisecond_precision() {
        let ts = from_unix_seconds(1.234_567_9).unwrap();
        assert_eq!(ts.timestamp_millis(), 1234);
    }

    #[test]
    fn should_truncate_negative_values_toward_zero() {
        let ts = from_unix_seconds(-1.0005).unwrap();
        assert_eq!(ts.timestamp_millis(), -1000);
    }

    #[test]
    fn should_reject_non_finite_seconds() {
        assert!(from_unix_seconds(f64::NAN).is_none());
        assert!(from_unix_seconds(f64::INFINITY).is_none());
    }

    #[test]
    fn should_reject_out_of_range_seconds() {
        assert!(from_unix_seconds(1e300).is_none());
    }

    #[test]
    fn should_roundtrip_through_unix_seconds() {
        let ts = from_unix_seconds(1_700_000_000.5).unwrap();
        assert!((to_unix_seconds(ts) - 1_700_000_000.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_expose_epoch() {
        assert_eq!(epoch().timestamp(), 0);
    }
}
