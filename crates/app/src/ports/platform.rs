//! Platform port: lifecycle requests and raw event sources of the native
//! location layer.
//!
//! A platform bridges the OS location services (significant-change
//! monitoring, visit detection) into placewatch. It is an opaque producer:
//! it emits untyped key/value payloads and raw error signals, and accepts
//! start/stop requests. All interpretation happens in the
//! [`normalizer`](crate::normalizer).

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio_stream::Stream;

/// Boxed stream of raw items from one platform source.
pub type PlatformEvents = Pin<Box<dyn Stream<Item = PlatformEvent> + Send + 'static>>;

/// A raw item yielded by a platform event source.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// An update payload, believed to be a JSON object.
    Payload(serde_json::Value),
    /// The source reported a failure instead of an update.
    Failure(PlatformFailure),
}

/// A failure reported by the platform or its transport.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformFailure {
    /// A structured error signal from the native layer.
    Signal(PlatformSignal),
    /// A transport-level failure with no structure (e.g. the channel closed
    /// unexpectedly). Normalizes to the generic unknown error.
    Transport(String),
}

/// Structured error signal as emitted by the native layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSignal {
    /// One of the codes in [`placewatch_domain::error`], or anything else
    /// for "unknown".
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Extra detail map; `permissionStatus` is the only key read.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl PlatformSignal {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<PlatformSignal> for PlatformFailure {
    fn from(signal: PlatformSignal) -> Self {
        Self::Signal(signal)
    }
}

impl std::fmt::Display for PlatformFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signal(signal) => match &signal.message {
                Some(message) => write!(f, "{}: {message}", signal.code),
                None => f.write_str(&signal.code),
            },
            Self::Transport(reason) => write!(f, "transport failure: {reason}"),
        }
    }
}

/// The native location layer as seen by the monitoring core.
///
/// Implementations live in adapter crates (e.g. `adapter_virtual`). The core
/// drives each lifecycle in this order:
///
/// 1. [`location_events`](Self::location_events): subscribe to the raw source
/// 2. [`start_monitoring`](Self::start_monitoring): ask the OS to begin
/// 3. (raw events flow until the lifecycle is stopped)
/// 4. drop the subscription, then [`stop_monitoring`](Self::stop_monitoring)
///
/// The visit lifecycle follows the same steps with the `visit_` methods.
/// No timeouts are applied to any of these futures.
pub trait LocationPlatform: Send + Sync {
    /// Ask the OS to begin continuous/significant-change location updates.
    fn start_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send;

    /// Ask the OS to stop location updates.
    fn stop_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send;

    /// Ask the OS to begin visit detection.
    fn start_visit_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send;

    /// Ask the OS to stop visit detection.
    fn stop_visit_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send;

    /// Subscribe to raw location items.
    ///
    /// The subscription exists as soon as this returns: items emitted
    /// afterwards are buffered for the returned stream even before it is
    /// first polled. The stream ends only when the platform tears it down.
    fn location_events(&self) -> PlatformEvents;

    /// Subscribe to raw visit items. Same contract as
    /// [`location_events`](Self::location_events).
    fn visit_events(&self) -> PlatformEvents;
}

impl<T: LocationPlatform> LocationPlatform for std::sync::Arc<T> {
    fn start_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send {
        (**self).start_monitoring()
    }

    fn stop_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send {
        (**self).stop_monitoring()
    }

    fn start_visit_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send {
        (**self).start_visit_monitoring()
    }

    fn stop_visit_monitoring(&self) -> impl Future<Output = Result<(), PlatformFailure>> + Send {
        (**self).stop_visit_monitoring()
    }

    fn location_events(&self) -> PlatformEvents {
        (**self).location_events()
    }

    fn visit_events(&self) -> PlatformEvents {
        (**self).visit_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_signal_with_message() {
        let failure: PlatformFailure = PlatformSignal::new("LOCATION_PERMISSION_DENIED")
            .with_message("user said no")
            .into();
        assert_eq!(failure.to_string(), "LOCATION_PERMISSION_DENIED: user said no");
    }

    #[test]
    fn should_display_signal_without_message() {
        let failure: PlatformFailure = PlatformSignal::new("E42").into();
        assert_eq!(failure.to_string(), "E42");
    }

    #[test]
    fn should_display_transport_failure() {
        let failure = PlatformFailure::Transport("channel closed".to_string());
        assert_eq!(failure.to_string(), "transport failure: channel closed");
    }

    #[test]
    fn should_deserialize_signal_with_optional_fields_missing() {
        let signal: PlatformSignal =
            serde_json::from_value(serde_json::json!({"code": "X"})).unwrap();
        assert_eq!(signal, PlatformSignal::new("X"));
    }
}
