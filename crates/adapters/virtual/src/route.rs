//! Scripted route playback.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use placewatch_app::normalizer::PERMISSION_STATUS;
use placewatch_app::ports::PlatformEvent;
use placewatch_domain::permission::PermissionStatus;
use placewatch_domain::time::{self, Timestamp};

use crate::config::Waypoint;

/// Horizontal accuracy reported for every generated fix and visit, in meters.
pub const ROUTE_ACCURACY_M: f64 = 10.0;

/// Background task walking a route and feeding the raw sources.
pub(crate) struct RoutePlayer {
    waypoints: Vec<Waypoint>,
    interval: Duration,
    permission_status: PermissionStatus,
    locations: broadcast::Sender<PlatformEvent>,
    visits: broadcast::Sender<PlatformEvent>,
}

impl RoutePlayer {
    pub(crate) fn start(
        waypoints: Vec<Waypoint>,
        interval: Duration,
        permission_status: PermissionStatus,
        locations: broadcast::Sender<PlatformEvent>,
        visits: broadcast::Sender<PlatformEvent>,
    ) -> JoinHandle<()> {
        let player = Self {
            waypoints,
            // tokio intervals reject a zero period.
            interval: interval.max(Duration::from_millis(1)),
            permission_status,
            locations,
            visits,
        };

        tokio::spawn(player.run())
    }

    /// One waypoint per tick, the first one immediately.
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            ticker.tick().await;
            let at = time::now();

            let payload = location_payload(waypoint, self.permission_status, at);
            let delivered = self
                .locations
                .send(PlatformEvent::Payload(payload))
                .unwrap_or(0);
            tracing::debug!(index, delivered, "route waypoint emitted");

            if let Some(dwell_secs) = waypoint.dwell_secs {
                let payload = visit_payload(waypoint, self.permission_status, at, dwell_secs);
                let delivered = self.visits.send(PlatformEvent::Payload(payload)).unwrap_or(0);
                tracing::debug!(index, dwell_secs, delivered, "route visit emitted");
            }
        }
        tracing::info!(waypoints = self.waypoints.len(), "route finished");
    }
}

/// Raw location payload for a waypoint reached at `at`.
pub(crate) fn location_payload(
    waypoint: &Waypoint,
    permission_status: PermissionStatus,
    at: Timestamp,
) -> Value {
    let mut payload = json!({
        "latitude": waypoint.latitude,
        "longitude": waypoint.longitude,
        "horizontalAccuracy": ROUTE_ACCURACY_M,
        "timestamp": time::to_unix_seconds(at),
        PERMISSION_STATUS: permission_status.as_str(),
    });
    if let Some(map) = payload.as_object_mut() {
        if let Some(altitude) = waypoint.altitude {
            map.insert("altitude".to_string(), json!(altitude));
        }
        if let Some(speed) = waypoint.speed {
            map.insert("speed".to_string(), json!(speed));
        }
    }
    payload
}

/// Raw visit payload for a dwell starting at `arrival`.
pub(crate) fn visit_payload(
    waypoint: &Waypoint,
    permission_status: PermissionStatus,
    arrival: Timestamp,
    dwell_secs: u32,
) -> Value {
    let arrival = time::to_unix_seconds(arrival);
    json!({
        "arrivalDate": arrival,
        "departureDate": arrival + f64::from(dwell_secs),
        "latitude": waypoint.latitude,
        "longitude": waypoint.longitude,
        "horizontalAccuracy": ROUTE_ACCURACY_M,
        PERMISSION_STATUS: permission_status.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use placewatch_app::normalizer::{to_location_result, to_visit_result};

    fn at() -> Timestamp {
        time::from_unix_seconds(1_700_000_000.0).unwrap()
    }

    #[test]
    fn should_build_location_payload_the_normalizer_accepts() {
        let mut waypoint = Waypoint::new(48.8566, 2.3522);
        waypoint.altitude = Some(35.0);

        let payload = location_payload(&waypoint, PermissionStatus::Limited, at());
        let result = to_location_result(&payload);

        let location = result.value().unwrap();
        assert!((location.latitude - 48.8566).abs() < f64::EPSILON);
        assert_eq!(location.altitude, Some(35.0));
        assert_eq!(location.speed, None);
        assert_eq!(location.timestamp, Some(at()));
        assert_eq!(result.permission_status(), PermissionStatus::Limited);
    }

    #[test]
    fn should_build_visit_payload_spanning_the_dwell() {
        let waypoint = Waypoint::new(1.0, 2.0).with_dwell(600);

        let payload = visit_payload(&waypoint, PermissionStatus::Granted, at(), 600);
        let result = to_visit_result(&payload);

        let visit = result.value().unwrap();
        assert_eq!(visit.arrival, at());
        assert_eq!(visit.dwell().num_seconds(), 600);
        assert!((visit.horizontal_accuracy - ROUTE_ACCURACY_M).abs() < f64::EPSILON);
    }
}
