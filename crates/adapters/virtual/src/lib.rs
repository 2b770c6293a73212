//! # placewatch-adapter-virtual
//!
//! In-process [`LocationPlatform`] for demos and tests.
//!
//! ## Raw sources
//!
//! | Source | Injected with | Fed by route playback |
//! |--------|---------------|-----------------------|
//! | location | [`emit_location`](VirtualPlatform::emit_location), [`fail_location`](VirtualPlatform::fail_location) | one fix per waypoint |
//! | visit | [`emit_visit`](VirtualPlatform::emit_visit), [`fail_visit`](VirtualPlatform::fail_visit) | one visit per waypoint with `dwell_secs` |
//!
//! Route playback starts with location monitoring and is aborted when it
//! stops or the platform is dropped.
//!
//! ## Dependency rule
//!
//! Depends on `placewatch-app` (port traits) and `placewatch-domain` only.

pub mod config;
mod route;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use placewatch_app::ports::{LocationPlatform, PlatformEvent, PlatformEvents, PlatformFailure};

pub use config::{VirtualConfig, Waypoint};
pub use route::ROUTE_ACCURACY_M;

use route::RoutePlayer;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn subscribe(sender: &broadcast::Sender<PlatformEvent>, source: &'static str) -> PlatformEvents {
    let events = BroadcastStream::new(sender.subscribe()).filter_map(move |item| match item {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(source, skipped, "raw subscriber lagged");
            None
        }
    });
    Box::pin(events)
}

#[derive(Debug, Default)]
struct Calls {
    start: AtomicUsize,
    stop: AtomicUsize,
    visit_start: AtomicUsize,
    visit_stop: AtomicUsize,
}

/// Simulated native location layer.
pub struct VirtualPlatform {
    config: VirtualConfig,
    locations: broadcast::Sender<PlatformEvent>,
    visits: broadcast::Sender<PlatformEvent>,
    refuse_start: Mutex<Option<PlatformFailure>>,
    refuse_visit_start: Mutex<Option<PlatformFailure>>,
    calls: Calls,
    route: Mutex<Option<JoinHandle<()>>>,
}

impl Default for VirtualPlatform {
    fn default() -> Self {
        Self::new(VirtualConfig::default())
    }
}

impl VirtualPlatform {
    #[must_use]
    pub fn new(config: VirtualConfig) -> Self {
        let capacity = config.channel_capacity.max(1);
        Self {
            locations: broadcast::channel(capacity).0,
            visits: broadcast::channel(capacity).0,
            config,
            refuse_start: Mutex::new(None),
            refuse_visit_start: Mutex::new(None),
            calls: Calls::default(),
            route: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &VirtualConfig {
        &self.config
    }

    /// Push a raw location payload. Returns how many subscribers got it.
    pub fn emit_location(&self, payload: serde_json::Value) -> usize {
        self.locations
            .send(PlatformEvent::Payload(payload))
            .unwrap_or(0)
    }

    /// Push a raw visit payload. Returns how many subscribers got it.
    pub fn emit_visit(&self, payload: serde_json::Value) -> usize {
        self.visits.send(PlatformEvent::Payload(payload)).unwrap_or(0)
    }

    /// Report a failure on the location source.
    pub fn fail_location(&self, failure: impl Into<PlatformFailure>) -> usize {
        self.locations
            .send(PlatformEvent::Failure(failure.into()))
            .unwrap_or(0)
    }

    /// Report a failure on the visit source.
    pub fn fail_visit(&self, failure: impl Into<PlatformFailure>) -> usize {
        self.visits
            .send(PlatformEvent::Failure(failure.into()))
            .unwrap_or(0)
    }

    /// Make every following location start request fail with `failure`.
    pub fn refuse_start_with(&self, failure: impl Into<PlatformFailure>) {
        *lock(&self.refuse_start) = Some(failure.into());
    }

    /// Make every following visit start request fail with `failure`.
    pub fn refuse_visit_start_with(&self, failure: impl Into<PlatformFailure>) {
        *lock(&self.refuse_visit_start) = Some(failure.into());
    }

    /// Accept start requests again.
    pub fn clear_refusals(&self) {
        lock(&self.refuse_start).take();
        lock(&self.refuse_visit_start).take();
    }

    #[must_use]
    pub fn start_calls(&self) -> usize {
        self.calls.start.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.calls.stop.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn visit_start_calls(&self) -> usize {
        self.calls.visit_start.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn visit_stop_calls(&self) -> usize {
        self.calls.visit_stop.load(Ordering::SeqCst)
    }

    /// Live subscriptions to the location source.
    #[must_use]
    pub fn location_subscribers(&self) -> usize {
        self.locations.receiver_count()
    }

    /// Live subscriptions to the visit source.
    #[must_use]
    pub fn visit_subscribers(&self) -> usize {
        self.visits.receiver_count()
    }

    /// Whether a route is currently being played.
    #[must_use]
    pub fn is_playing_route(&self) -> bool {
        lock(&self.route)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn start_route(&self) {
        if self.config.waypoints.is_empty() {
            return;
        }
        let mut route = lock(&self.route);
        if let Some(previous) = route.take() {
            previous.abort();
        }
        *route = Some(RoutePlayer::start(
            self.config.waypoints.clone(),
            Duration::from_millis(self.config.interval_ms),
            self.config.permission_status,
            self.locations.clone(),
            self.visits.clone(),
        ));
        tracing::info!(
            waypoints = self.config.waypoints.len(),
            interval_ms = self.config.interval_ms,
            "route playback started"
        );
    }

    fn stop_route(&self) {
        if let Some(handle) = lock(&self.route).take() {
            handle.abort();
            tracing::debug!("route playback aborted");
        }
    }
}

impl LocationPlatform for VirtualPlatform {
    async fn start_monitoring(&self) -> Result<(), PlatformFailure> {
        self.calls.start.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = lock(&self.refuse_start).clone() {
            tracing::debug!(%failure, "refusing location start");
            return Err(failure);
        }
        self.start_route();
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<(), PlatformFailure> {
        self.calls.stop.fetch_add(1, Ordering::SeqCst);
        self.stop_route();
        Ok(())
    }

    async fn start_visit_monitoring(&self) -> Result<(), PlatformFailure> {
        self.calls.visit_start.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = lock(&self.refuse_visit_start).clone() {
            tracing::debug!(%failure, "refusing visit start");
            return Err(failure);
        }
        Ok(())
    }

    async fn stop_visit_monitoring(&self) -> Result<(), PlatformFailure> {
        self.calls.visit_stop.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location_events(&self) -> PlatformEvents {
        subscribe(&self.locations, "location")
    }

    fn visit_events(&self) -> PlatformEvents {
        subscribe(&self.visits, "visit")
    }
}

impl Drop for VirtualPlatform {
    fn drop(&mut self) {
        self.stop_route();
    }
}
