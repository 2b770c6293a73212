//! Virtual platform configuration.

use serde::Deserialize;

use placewatch_domain::permission::PermissionStatus;

/// Configuration for the [`VirtualPlatform`](crate::VirtualPlatform).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// Delay between two route waypoints, in milliseconds.
    pub interval_ms: u64,
    /// Permission status attached to every generated payload.
    pub permission_status: PermissionStatus,
    /// Scripted route played once each time location monitoring starts.
    ///
    /// When empty, raw items only come from the `emit_*` / `fail_*` methods.
    pub waypoints: Vec<Waypoint>,
    /// Buffer of each raw source before slow subscribers start skipping.
    pub channel_capacity: usize,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            permission_status: PermissionStatus::Granted,
            waypoints: Vec::new(),
            channel_capacity: 64,
        }
    }
}

/// One stop of a scripted route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    /// When set, a visit of this length is reported on arrival.
    #[serde(default)]
    pub dwell_secs: Option<u32>,
}

impl Waypoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            speed: None,
            dwell_secs: None,
        }
    }

    #[must_use]
    pub fn with_dwell(mut self, secs: u32) -> Self {
        self.dwell_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_defaults_when_empty() {
        let config: VirtualConfig = toml::from_str("").unwrap();
        assert_eq!(config.interval_ms, 1_000);
        assert_eq!(config.permission_status, PermissionStatus::Granted);
        assert!(config.waypoints.is_empty());
        assert_eq!(config.channel_capacity, 64);
    }

    #[test]
    fn should_parse_route() {
        let toml_str = r#"
            interval_ms = 250
            permission_status = "limited"

            [[waypoints]]
            latitude = 48.8566
            longitude = 2.3522
            altitude = 35.0

            [[waypoints]]
            latitude = 48.8606
            longitude = 2.3376
            speed = 1.4
            dwell_secs = 900
        "#;
        let config: VirtualConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.permission_status, PermissionStatus::Limited);
        assert_eq!(config.waypoints.len(), 2);
        assert_eq!(config.waypoints[0].altitude, Some(35.0));
        assert_eq!(config.waypoints[0].dwell_secs, None);
        assert_eq!(config.waypoints[1].speed, Some(1.4));
        assert_eq!(config.waypoints[1].dwell_secs, Some(900));
    }

    #[test]
    fn should_reject_waypoint_without_coordinates() {
        let toml_str = r"
            [[waypoints]]
            latitude = 1.0
        ";
        assert!(toml::from_str::<VirtualConfig>(toml_str).is_err());
    }
}
