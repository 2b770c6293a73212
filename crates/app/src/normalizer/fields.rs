//! Schema reader over an untyped platform payload.
//!
//! Every field the normalizer reads goes through one of these accessors so
//! presence and type are checked explicitly. Required accessors return a
//! [`FieldError`]; optional accessors are permissive and turn absence or a
//! wrong type into `None`. JSON `null` counts as absent.

use serde_json::{Map, Value};

use placewatch_domain::permission::PermissionStatus;
use placewatch_domain::time::{Timestamp, from_unix_seconds};

/// Key holding the permission status in payloads and error details.
pub const PERMISSION_STATUS: &str = "permissionStatus";

/// Why a required payload field could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("field `{field}` is not a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{0}` is not a representable instant")]
    OutOfRange(&'static str),
}

/// Typed view over a payload object.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// `None` when the payload is not an object at all.
    #[must_use]
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(|map| Self { map })
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|value| !value.is_null())
    }

    /// A required number (integer or float).
    ///
    /// # Errors
    ///
    /// [`FieldError::Missing`] when absent, [`FieldError::WrongType`] when
    /// the value is not numeric.
    pub fn required_f64(&self, field: &'static str) -> Result<f64, FieldError> {
        let value = self.get(field).ok_or(FieldError::Missing(field))?;
        value.as_f64().ok_or(FieldError::WrongType {
            field,
            expected: "number",
        })
    }

    /// A required instant encoded as fractional unix seconds.
    ///
    /// # Errors
    ///
    /// Same as [`required_f64`](Self::required_f64), plus
    /// [`FieldError::OutOfRange`] when the instant is not representable.
    pub fn required_instant(&self, field: &'static str) -> Result<Timestamp, FieldError> {
        let seconds = self.required_f64(field)?;
        from_unix_seconds(seconds).ok_or(FieldError::OutOfRange(field))
    }

    #[must_use]
    pub fn optional_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    /// An optional 32-bit integer; floats and out-of-range integers are `None`.
    #[must_use]
    pub fn optional_i32(&self, field: &str) -> Option<i32> {
        self.get(field)
            .and_then(Value::as_i64)
            .and_then(|raw| i32::try_from(raw).ok())
    }

    #[must_use]
    pub fn optional_str(&self, field: &str) -> Option<&'a str> {
        self.get(field).and_then(Value::as_str)
    }

    #[must_use]
    pub fn optional_instant(&self, field: &str) -> Option<Timestamp> {
        self.optional_f64(field).and_then(from_unix_seconds)
    }

    /// The `permissionStatus` field mapped onto [`PermissionStatus`].
    #[must_use]
    pub fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::from_platform(self.optional_str(PERMISSION_STATUS))
    }
}

/// Permission status of an arbitrary value that may or may not be an object.
#[must_use]
pub fn permission_status_of(value: &Value) -> PermissionStatus {
    Fields::from_value(value).map_or(PermissionStatus::NotSpecified, |fields| {
        fields.permission_status()
    })
}
