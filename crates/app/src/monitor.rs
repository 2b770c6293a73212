//! Monitoring core: owns the location and visit lifecycles of one platform.
//!
//! [`LocationMonitor`] subscribes to the platform's raw sources on demand,
//! runs every raw item through the [`normalizer`](crate::normalizer) and
//! republishes the resulting [`MonitorResult`]s on two multicast
//! [`UpdateBus`]es that stay open until [`dispose`](LocationMonitor::dispose).
//!
//! ## Lifecycle
//!
//! ```text
//!            start_*                      stop_*
//!  inactive ─────────► subscribe ─► platform start ─► active ─────────► cancel ─► platform stop ─► inactive
//!                                     │ fails
//!                                     └─► cancel subscription, return error (still inactive)
//!
//!  dispose: disposed = true ─► stop both lifecycles concurrently ─► close both buses
//! ```
//!
//! Every operation takes `&self`; share the monitor through an `Arc` to
//! drive it from several tasks. Each lifecycle is guarded by its own async
//! mutex, so concurrent starts of the same lifecycle perform a single
//! platform request, and the two lifecycles never wait on each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;

use placewatch_domain::error::PlaceWatchError;
use placewatch_domain::id::MonitorId;
use placewatch_domain::location::Location;
use placewatch_domain::result::{LocationResult, MonitorResult, VisitResult};
use placewatch_domain::visit::Visit;

use crate::normalizer::{error_from_failure, normalize_location_event, normalize_visit_event};
use crate::ports::{LocationPlatform, PlatformEvent, PlatformEvents, PlatformFailure};
use crate::update_bus::{UpdateBus, UpdateStream};

/// Default per-subscriber buffer of each update bus.
pub const DEFAULT_CAPACITY: usize = 64;

/// Tuning for a [`LocationMonitor`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// How many updates a subscriber may fall behind before it starts
    /// skipping the oldest ones.
    pub capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Location,
    Visit,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Visit => "visit",
        }
    }
}

/// Forwarding task draining one raw source. Aborted when dropped.
struct Forwarder {
    handle: Option<JoinHandle<()>>,
}

impl Forwarder {
    fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(task)),
        }
    }

    /// Abort the task and wait until it, and the raw subscription it owns,
    /// are gone.
    async fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            // Only `JoinError::Cancelled` or a finished task can come back.
            let _ = handle.await;
        }
    }
}

impl Drop for Forwarder {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// State of one monitoring lifecycle.
struct Lifecycle<T> {
    kind: Kind,
    /// Present while a raw subscription is attached.
    subscription: Mutex<Option<Forwarder>>,
    active: AtomicBool,
    updates: Arc<UpdateBus<MonitorResult<T>>>,
    normalize: fn(PlatformEvent) -> MonitorResult<T>,
}

impl<T: Clone + Send + 'static> Lifecycle<T> {
    fn new(kind: Kind, capacity: usize, normalize: fn(PlatformEvent) -> MonitorResult<T>) -> Self {
        Self {
            kind,
            subscription: Mutex::new(None),
            active: AtomicBool::new(false),
            updates: Arc::new(UpdateBus::new(capacity)),
            normalize,
        }
    }
}

/// Location and visit monitoring over a [`LocationPlatform`].
pub struct LocationMonitor<P> {
    id: MonitorId,
    platform: P,
    disposed: AtomicBool,
    location: Lifecycle<Location>,
    visit: Lifecycle<Visit>,
}

impl<P: LocationPlatform> LocationMonitor<P> {
    /// Create a monitor with the default configuration.
    #[must_use]
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, &MonitorConfig::default())
    }

    #[must_use]
    pub fn with_config(platform: P, config: &MonitorConfig) -> Self {
        let id = MonitorId::new();
        tracing::debug!(monitor = %id, capacity = config.capacity, "monitor created");
        Self {
            id,
            platform,
            disposed: AtomicBool::new(false),
            location: Lifecycle::new(Kind::Location, config.capacity, normalize_location_event),
            visit: Lifecycle::new(Kind::Visit, config.capacity, normalize_visit_event),
        }
    }

    #[must_use]
    pub fn id(&self) -> MonitorId {
        self.id
    }

    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.location.active.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_visit_monitoring(&self) -> bool {
        self.visit.active.load(Ordering::SeqCst)
    }

    /// A new independent subscription to location results.
    ///
    /// Only results published after this call are delivered. The stream ends
    /// when the monitor is disposed (immediately, if it already was).
    #[must_use]
    pub fn location_updates(&self) -> UpdateStream<LocationResult> {
        self.location.updates.stream()
    }

    /// A new independent subscription to visit results.
    #[must_use]
    pub fn visit_updates(&self) -> UpdateStream<VisitResult> {
        self.visit.updates.stream()
    }

    /// Start location monitoring. A no-op when already started.
    ///
    /// # Errors
    ///
    /// [`PlaceWatchError::Disposed`] after [`dispose`](Self::dispose);
    /// [`PlaceWatchError::Platform`] when the platform refuses to start, in
    /// which case the raw subscription is torn down again.
    pub async fn start_monitoring(&self) -> Result<(), PlaceWatchError> {
        self.start(&self.location).await
    }

    /// Start visit monitoring. A no-op when already started.
    ///
    /// # Errors
    ///
    /// Same as [`start_monitoring`](Self::start_monitoring).
    pub async fn start_visit_monitoring(&self) -> Result<(), PlaceWatchError> {
        self.start(&self.visit).await
    }

    /// Stop location monitoring. A no-op when not started.
    ///
    /// # Errors
    ///
    /// [`PlaceWatchError::Disposed`] after [`dispose`](Self::dispose);
    /// [`PlaceWatchError::Platform`] when the platform stop request fails.
    /// The lifecycle is inactive afterwards either way.
    pub async fn stop_monitoring(&self) -> Result<(), PlaceWatchError> {
        self.ensure_not_disposed()?;
        self.stop(&self.location).await
    }

    /// Stop visit monitoring. A no-op when not started.
    ///
    /// # Errors
    ///
    /// Same as [`stop_monitoring`](Self::stop_monitoring).
    pub async fn stop_visit_monitoring(&self) -> Result<(), PlaceWatchError> {
        self.ensure_not_disposed()?;
        self.stop(&self.visit).await
    }

    /// Stop both lifecycles and close both update streams.
    ///
    /// Idempotent. The monitor cannot be restarted afterwards; build a new
    /// one instead. Teardown always runs to completion.
    ///
    /// # Errors
    ///
    /// The first [`PlaceWatchError::Platform`] reported by a stop request.
    pub async fn dispose(&self) -> Result<(), PlaceWatchError> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let (location, visit) = tokio::join!(self.stop(&self.location), self.stop(&self.visit));

        self.location.updates.close();
        self.visit.updates.close();
        tracing::info!(monitor = %self.id, "monitor disposed");

        location.and(visit)
    }

    fn ensure_not_disposed(&self) -> Result<(), PlaceWatchError> {
        if self.is_disposed() {
            return Err(PlaceWatchError::Disposed);
        }
        Ok(())
    }

    async fn start<T>(&self, lifecycle: &Lifecycle<T>) -> Result<(), PlaceWatchError>
    where
        T: Clone + Send + 'static,
    {
        self.ensure_not_disposed()?;
        let mut subscription = lifecycle.subscription.lock().await;
        // dispose may have run while we waited for the lock.
        self.ensure_not_disposed()?;

        let kind = lifecycle.kind.as_str();
        if subscription.is_some() {
            tracing::debug!(monitor = %self.id, kind, "already monitoring");
            return Ok(());
        }

        // Subscribe before asking the platform to start so nothing emitted
        // right after the start request is lost.
        let events = match lifecycle.kind {
            Kind::Location => self.platform.location_events(),
            Kind::Visit => self.platform.visit_events(),
        };
        // Dropping this guard (failed start, or the caller giving up on the
        // start future) tears the subscription down again.
        let forwarder = Forwarder::spawn(forward(
            events,
            Arc::clone(&lifecycle.updates),
            lifecycle.normalize,
            self.id,
            lifecycle.kind,
        ));

        let request = match lifecycle.kind {
            Kind::Location => self.platform.start_monitoring().await,
            Kind::Visit => self.platform.start_visit_monitoring().await,
        };
        if let Err(failure) = request {
            forwarder.cancel().await;
            tracing::warn!(monitor = %self.id, kind, %failure, "platform refused to start");
            return Err(platform_error(&failure));
        }

        *subscription = Some(forwarder);
        lifecycle.active.store(true, Ordering::SeqCst);
        tracing::info!(monitor = %self.id, kind, "monitoring started");
        Ok(())
    }

    async fn stop<T>(&self, lifecycle: &Lifecycle<T>) -> Result<(), PlaceWatchError> {
        let mut subscription = lifecycle.subscription.lock().await;
        let Some(forwarder) = subscription.take() else {
            return Ok(());
        };

        let kind = lifecycle.kind.as_str();
        forwarder.cancel().await;

        let request = match lifecycle.kind {
            Kind::Location => self.platform.stop_monitoring().await,
            Kind::Visit => self.platform.stop_visit_monitoring().await,
        };
        lifecycle.active.store(false, Ordering::SeqCst);

        match request {
            Ok(()) => {
                tracing::info!(monitor = %self.id, kind, "monitoring stopped");
                Ok(())
            }
            Err(failure) => {
                tracing::warn!(monitor = %self.id, kind, %failure, "platform failed to stop");
                Err(platform_error(&failure))
            }
        }
    }
}

impl<P> Drop for LocationMonitor<P> {
    fn drop(&mut self) {
        if *self.disposed.get_mut() {
            return;
        }
        let location = self.location.subscription.get_mut().take();
        let visit = self.visit.subscription.get_mut().take();
        let aborted = [location, visit].into_iter().flatten().count();
        self.location.updates.close();
        self.visit.updates.close();
        if aborted > 0 {
            tracing::warn!(
                monitor = %self.id,
                aborted,
                "monitor dropped without dispose, platform was not asked to stop"
            );
        }
    }
}

fn platform_error(failure: &PlatformFailure) -> PlaceWatchError {
    PlaceWatchError::Platform(error_from_failure(failure))
}

/// Drain one raw source into its update bus, preserving order.
async fn forward<T>(
    mut events: PlatformEvents,
    updates: Arc<UpdateBus<MonitorResult<T>>>,
    normalize: fn(PlatformEvent) -> MonitorResult<T>,
    monitor: MonitorId,
    kind: Kind,
) where
    T: Clone + Send + 'static,
{
    let kind = kind.as_str();
    while let Some(event) = events.next().await {
        let result = normalize(event);
        if let Some(err) = result.error() {
            tracing::debug!(%monitor, kind, code = %err.code, message = %err.message, "error update");
        }
        let delivered = updates.publish(result);
        tracing::trace!(%monitor, kind, delivered, "update published");
    }
    tracing::debug!(%monitor, kind, "raw source ended");
}
