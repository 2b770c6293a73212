//! # placewatchd: placewatch daemon
//!
//! Composition root that wires the virtual platform into the monitoring
//! core and logs every update until interrupted.
//!
//! ## Responsibilities
//! - Load configuration (`placewatch.toml`, environment overrides)
//! - Initialize `tracing` with the configured filter
//! - Construct the platform adapter and the [`LocationMonitor`]
//! - Attach one logging consumer per update stream
//! - Start monitoring, wait for SIGINT/SIGTERM, dispose
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::fmt::Display;

use tokio_stream::StreamExt as _;
use tracing_subscriber::EnvFilter;

use placewatch_adapter_virtual::VirtualPlatform;
use placewatch_app::monitor::LocationMonitor;
use placewatch_app::ports::LocationPlatform;
use placewatch_app::update_bus::UpdateStream;
use placewatch_domain::error::PlaceWatchError;
use placewatch_domain::permission::PermissionStatus;
use placewatch_domain::result::MonitorResult;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let env_filter = EnvFilter::try_new(&config.logging.filter)?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let platform = VirtualPlatform::new(config.platform.clone());
    let monitor = LocationMonitor::with_config(platform, &config.monitor_config());
    tracing::info!(
        monitor = %monitor.id(),
        waypoints = config.platform.waypoints.len(),
        visits = config.monitor.visits_enabled,
        "placewatchd starting"
    );

    let locations = tokio::spawn(log_updates("location", monitor.location_updates()));
    let visits = tokio::spawn(log_updates("visit", monitor.visit_updates()));

    let outcome = start(&monitor, config.monitor.visits_enabled).await;
    if outcome.is_ok() {
        shutdown_signal().await?;
    }

    let disposed = monitor.dispose().await;
    let (locations, visits) = tokio::join!(locations, visits);
    locations?;
    visits?;

    outcome?;
    disposed?;
    tracing::info!("placewatchd stopped");
    Ok(())
}

async fn start<P: LocationPlatform>(
    monitor: &LocationMonitor<P>,
    visits_enabled: bool,
) -> Result<(), PlaceWatchError> {
    monitor.start_monitoring().await?;
    if visits_enabled {
        monitor.start_visit_monitoring().await?;
    }
    Ok(())
}

/// Log every result of one update stream until it closes.
async fn log_updates<T: Display + Clone + Send + 'static>(
    kind: &'static str,
    mut updates: UpdateStream<MonitorResult<T>>,
) {
    while let Some(update) = updates.next().await {
        let permission = update.permission_status();
        if !permission.allows_updates() && permission != PermissionStatus::NotSpecified {
            tracing::warn!(kind, %permission, "location access is not granted, updates may stop");
        }
        update.fold(
            |value| tracing::info!(kind, %permission, "{value}"),
            |err| tracing::warn!(kind, %permission, code = %err.code, "{}", err.message),
        );
    }
    tracing::debug!(kind, "update stream closed");
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    tracing::info!("received shutdown signal, disposing monitor");
    Ok(())
}
