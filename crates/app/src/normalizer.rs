//! Payload normalizer: turns raw platform items into domain results.
//!
//! Pure functions operating on `serde_json::Value` payloads and
//! [`PlatformFailure`]s, no IO. Nothing here returns a hard error: malformed
//! input becomes the error arm of a [`MonitorResult`] and flows to consumers
//! like any other update.
//!
//! ## Location payload
//!
//! | Key | Type | Required |
//! |-----|------|----------|
//! | `latitude`, `longitude` | number | yes |
//! | `altitude`, `horizontalAccuracy`, `verticalAccuracy`, `course`, `speed` | number | no |
//! | `timestamp` | number, unix seconds | no |
//! | `floorLevel` | int32 | no |
//! | `permissionStatus` | string | no |
//!
//! ## Visit payload
//!
//! | Key | Type | Required |
//! |-----|------|----------|
//! | `arrivalDate`, `departureDate` | number, unix seconds | yes |
//! | `latitude`, `longitude`, `horizontalAccuracy` | number | yes |
//! | `permissionStatus` | string | no |

mod fields;

pub use fields::{FieldError, Fields, PERMISSION_STATUS, permission_status_of};

use serde_json::Value;

use placewatch_domain::error::{ErrorCode, MonitorError};
use placewatch_domain::location::Location;
use placewatch_domain::permission::PermissionStatus;
use placewatch_domain::result::{LocationResult, MonitorResult, VisitResult};
use placewatch_domain::visit::Visit;

use crate::ports::{PlatformEvent, PlatformFailure};

/// Message used when a location payload lacks usable coordinates.
pub const MISSING_COORDINATES_MESSAGE: &str = "Latitude or longitude is missing";

/// Prefix of the message used when a visit payload cannot be decoded.
pub const VISIT_PARSE_PREFIX: &str = "Failed to parse visit data:";

/// Normalize a raw location payload.
///
/// Non-object payloads yield [`MonitorResult::unknown_error`]. Missing or
/// non-numeric coordinates yield an [`ErrorCode::Unknown`] error carrying
/// [`MISSING_COORDINATES_MESSAGE`]. Optional fields never cause an error.
#[must_use]
pub fn to_location_result(payload: &Value) -> LocationResult {
    let Some(fields) = Fields::from_value(payload) else {
        return MonitorResult::unknown_error();
    };
    let permission_status = fields.permission_status();

    match decode_location(&fields) {
        Ok(location) => MonitorResult::success(location, permission_status),
        Err(_) => MonitorResult::failure(
            MonitorError::new(MISSING_COORDINATES_MESSAGE, ErrorCode::Unknown),
            permission_status,
        ),
    }
}

fn decode_location(fields: &Fields<'_>) -> Result<Location, FieldError> {
    let latitude = fields.required_f64("latitude")?;
    let longitude = fields.required_f64("longitude")?;

    Ok(Location {
        latitude,
        longitude,
        altitude: fields.optional_f64("altitude"),
        horizontal_accuracy: fields.optional_f64("horizontalAccuracy"),
        vertical_accuracy: fields.optional_f64("verticalAccuracy"),
        course: fields.optional_f64("course"),
        speed: fields.optional_f64("speed"),
        timestamp: fields.optional_instant("timestamp"),
        floor_level: fields.optional_i32("floorLevel"),
    })
}

/// Normalize a raw visit payload.
///
/// Non-object payloads yield [`MonitorResult::unknown_error`]. Any missing,
/// mistyped or unrepresentable required field yields an
/// [`ErrorCode::Unknown`] error whose message starts with
/// [`VISIT_PARSE_PREFIX`] followed by the cause.
#[must_use]
pub fn to_visit_result(payload: &Value) -> VisitResult {
    let Some(fields) = Fields::from_value(payload) else {
        return MonitorResult::unknown_error();
    };
    let permission_status = fields.permission_status();

    match decode_visit(&fields) {
        Ok(visit) => MonitorResult::success(visit, permission_status),
        Err(cause) => MonitorResult::failure(
            MonitorError::new(format!("{VISIT_PARSE_PREFIX} {cause}"), ErrorCode::Unknown),
            permission_status,
        ),
    }
}

fn decode_visit(fields: &Fields<'_>) -> Result<Visit, FieldError> {
    Ok(Visit {
        arrival: fields.required_instant("arrivalDate")?,
        departure: fields.required_instant("departureDate")?,
        latitude: fields.required_f64("latitude")?,
        longitude: fields.required_f64("longitude")?,
        horizontal_accuracy: fields.required_f64("horizontalAccuracy")?,
    })
}

/// Normalize a platform failure into the error arm of a result.
///
/// Structured signals keep their permission status (from
/// `details.permissionStatus`); transport failures carry no structure and
/// fall back to [`MonitorResult::unknown_error`].
#[must_use]
pub fn from_platform_failure<T>(failure: &PlatformFailure) -> MonitorResult<T> {
    match failure {
        PlatformFailure::Signal(signal) => {
            let permission_status = signal
                .details
                .as_ref()
                .map_or(PermissionStatus::NotSpecified, permission_status_of);
            MonitorResult::failure(error_from_failure(failure), permission_status)
        }
        PlatformFailure::Transport(_) => MonitorResult::unknown_error(),
    }
}

/// The [`MonitorError`] half of [`from_platform_failure`].
#[must_use]
pub fn error_from_failure(failure: &PlatformFailure) -> MonitorError {
    match failure {
        PlatformFailure::Signal(signal) => {
            let code = ErrorCode::from_platform_code(&signal.code);
            match &signal.message {
                Some(message) => MonitorError::new(message.clone(), code),
                None => MonitorError::from_code(code),
            }
        }
        PlatformFailure::Transport(_) => MonitorError::unknown(),
    }
}

/// Normalize one item from the raw location source.
#[must_use]
pub fn normalize_location_event(event: PlatformEvent) -> LocationResult {
    match event {
        PlatformEvent::Payload(payload) => to_location_result(&payload),
        PlatformEvent::Failure(failure) => from_platform_failure(&failure),
    }
}

/// Normalize one item from the raw visit source.
#[must_use]
pub fn normalize_visit_event(event: PlatformEvent) -> VisitResult {
    match event {
        PlatformEvent::Payload(payload) => to_visit_result(&payload),
        PlatformEvent::Failure(failure) => from_platform_failure(&failure),
    }
}
