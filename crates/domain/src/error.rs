//! Error types used across the workspace.
//!
//! Two families live here:
//! - [`MonitorError`] is a *value*: environment-sourced failures (bad
//!   payloads, platform-reported problems) travel on the update streams as
//!   the error arm of a [`MonitorResult`](crate::result::MonitorResult).
//! - [`PlaceWatchError`] is *raised*: local misuse and failed lifecycle
//!   requests are returned to the caller directly.

use serde::{Deserialize, Serialize};

/// Platform code reported when the user refused location access.
pub const LOCATION_PERMISSION_DENIED: &str = "LOCATION_PERMISSION_DENIED";

/// Platform code reported when significant-change monitoring is not
/// supported on the device.
pub const SIGNIFICANT_LOCATION_MONITORING_UNAVAILABLE: &str =
    "SIGNIFICANT_LOCATION_MONITORING_UNAVAILABLE";

/// Closed set of normalized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    LocationPermissionDenied,
    SignificantLocationMonitoringUnavailable,
    Unknown,
    /// Reserved for the "not an error" sentinel.
    None,
}

impl ErrorCode {
    /// Map a platform code string. Anything unrecognised is [`Unknown`](Self::Unknown).
    #[must_use]
    pub fn from_platform_code(code: &str) -> Self {
        match code {
            LOCATION_PERMISSION_DENIED => Self::LocationPermissionDenied,
            SIGNIFICANT_LOCATION_MONITORING_UNAVAILABLE => {
                Self::SignificantLocationMonitoringUnavailable
            }
            _ => Self::Unknown,
        }
    }

    /// Message used when the platform did not supply one.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            Self::LocationPermissionDenied => "Location permission denied",
            Self::SignificantLocationMonitoringUnavailable => {
                "Significant location monitoring unavailable"
            }
            Self::Unknown => "Unknown (likely OS-level) error occurred",
            Self::None => "No error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocationPermissionDenied => f.write_str("locationPermissionDenied"),
            Self::SignificantLocationMonitoringUnavailable => {
                f.write_str("significantLocationMonitoringUnavailable")
            }
            Self::Unknown => f.write_str("unknown"),
            Self::None => f.write_str("none"),
        }
    }
}

/// A normalized error delivered as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} ({code})")]
#[serde(rename_all = "camelCase")]
pub struct MonitorError {
    pub message: String,
    pub code: ErrorCode,
}

impl MonitorError {
    #[must_use]
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Build an error carrying the code's default message.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code.default_message(), code)
    }

    /// Generic fallback for failures nothing more specific is known about.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new("Unknown", ErrorCode::Unknown)
    }

    /// The "not an error" sentinel.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("", ErrorCode::None)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code == ErrorCode::None && self.message.is_empty()
    }
}

/// Failures raised to the caller of a lifecycle operation.
#[derive(Debug, thiserror::Error)]
pub enum PlaceWatchError {
    /// The monitor was disposed; construct a new instance instead.
    #[error("monitor has been disposed")]
    Disposed,

    /// The platform rejected a start or stop request.
    #[error("platform request failed: {0}")]
    Platform(#[source] MonitorError),
}

impl PlaceWatchError {
    /// The normalized platform error, if this is a platform failure.
    #[must_use]
    pub fn platform_error(&self) -> Option<&MonitorError> {
        match self {
            Self::Platform(err) => Some(err),
            Self::Disposed => None,
        }
    }
}

impl From<MonitorError> for PlaceWatchError {
    fn from(err: MonitorError) -> Self {
        Self::Platform(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_permission_denied_code() {
        assert_eq!(
            ErrorCode::from_platform_code("LOCATION_PERMISSION_DENIED"),
            ErrorCode::LocationPermissionDenied
        );
    }

    #[test]
    fn should_map_monitoring_unavailable_code() {
        assert_eq!(
            ErrorCode::from_platform_code("SIGNIFICANT_LOCATION_MONITORING_UNAVAILABLE"),
            ErrorCode::SignificantLocationMonitoringUnavailable
        );
    }

    #[test]
    fn should_map_anything_else_to_unknown() {
        for code in ["", "ERROR", "location_permission_denied", "NONE"] {
            assert_eq!(ErrorCode::from_platform_code(code), ErrorCode::Unknown);
        }
    }

    #[test]
    fn should_provide_default_message_per_code() {
        assert_eq!(
            ErrorCode::LocationPermissionDenied.default_message(),
            "Location permission denied"
        );
        assert_eq!(
            ErrorCode::SignificantLocationMonitoringUnavailable.default_message(),
            "Significant location monitoring unavailable"
        );
        assert_eq!(
            ErrorCode::Unknown.default_message(),
            "Unknown (likely OS-level) error occurred"
        );
        assert_eq!(ErrorCode::None.default_message(), "No error");
    }

    #[test]
    fn should_build_sentinels() {
        let unknown = MonitorError::unknown();
        assert_eq!(unknown.message, "Unknown");
        assert_eq!(unknown.code, ErrorCode::Unknown);

        let empty = MonitorError::empty();
        assert_eq!(empty.message, "");
        assert_eq!(empty.code, ErrorCode::None);
        assert!(empty.is_empty());
        assert!(!unknown.is_empty());
    }

    #[test]
    fn should_display_message_and_code() {
        let err = MonitorError::from_code(ErrorCode::LocationPermissionDenied);
        assert_eq!(
            err.to_string(),
            "Location permission denied (locationPermissionDenied)"
        );
    }

    #[test]
    fn should_display_disposed_error() {
        assert_eq!(
            PlaceWatchError::Disposed.to_string(),
            "monitor has been disposed"
        );
    }

    #[test]
    fn should_expose_platform_error_from_raised_failure() {
        let err: PlaceWatchError = MonitorError::unknown().into();
        assert_eq!(err.platform_error(), Some(&MonitorError::unknown()));
        assert!(PlaceWatchError::Disposed.platform_error().is_none());
    }
}
