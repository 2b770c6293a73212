//! Monitor result: the value carried on every update stream.
//!
//! A [`MonitorResult`] holds either a success payload or a [`MonitorError`],
//! never both, together with the permission status the platform reported
//! at the time. Consumers are expected to handle both arms; use
//! [`fold`](MonitorResult::fold) for an exhaustive match.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::location::Location;
use crate::permission::PermissionStatus;
use crate::visit::Visit;

/// Result of a location update.
pub type LocationResult = MonitorResult<Location>;

/// Result of a visit update.
pub type VisitResult = MonitorResult<Visit>;

/// Success-or-error outcome tagged with a [`PermissionStatus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorResult<T> {
    outcome: Outcome<T>,
    permission_status: PermissionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Outcome<T> {
    Success(T),
    Error(MonitorError),
}

impl<T> MonitorResult<T> {
    #[must_use]
    pub fn success(value: T, permission_status: PermissionStatus) -> Self {
        Self {
            outcome: Outcome::Success(value),
            permission_status,
        }
    }

    #[must_use]
    pub fn failure(error: MonitorError, permission_status: PermissionStatus) -> Self {
        Self {
            outcome: Outcome::Error(error),
            permission_status,
        }
    }

    /// Generic fallback: [`MonitorError::unknown`] with no reported status.
    #[must_use]
    pub fn unknown_error() -> Self {
        Self::failure(MonitorError::unknown(), PermissionStatus::NotSpecified)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&MonitorError> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Error(err) => Some(err),
        }
    }

    #[must_use]
    pub fn permission_status(&self) -> PermissionStatus {
        self.permission_status
    }

    /// Exhaustive match: calls exactly one of the two closures.
    pub fn fold<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_error: impl FnOnce(MonitorError) -> R,
    ) -> R {
        match self.outcome {
            Outcome::Success(value) => on_success(value),
            Outcome::Error(err) => on_error(err),
        }
    }

    /// Convert into a std [`Result`], dropping the permission status.
    ///
    /// # Errors
    ///
    /// Returns the carried [`MonitorError`] when this is an error result.
    pub fn into_result(self) -> Result<T, MonitorError> {
        self.fold(Ok, Err)
    }
}
