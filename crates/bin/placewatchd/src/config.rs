//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `placewatch.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use placewatch_adapter_virtual::VirtualConfig;
use placewatch_app::monitor::{DEFAULT_CAPACITY, MonitorConfig};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitoring core settings.
    pub monitor: MonitorSection,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Virtual platform settings.
    #[serde(rename = "virtual")]
    pub platform: VirtualConfig,
}

/// `[monitor]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Per-subscriber update buffer.
    pub capacity: usize,
    /// Start visit monitoring alongside location monitoring.
    pub visits_enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `placewatch.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("placewatch.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("PLACEWATCH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(capacity) = var("PLACEWATCH_CAPACITY").and_then(|val| val.parse().ok()) {
            self.monitor.capacity = capacity;
        }
        if let Some(enabled) = var("PLACEWATCH_VISITS").and_then(|val| parse_flag(&val)) {
            self.monitor.visits_enabled = enabled;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.capacity == 0 {
            return Err(ConfigError::Validation(
                "monitor.capacity must be non-zero".to_string(),
            ));
        }
        if !self.platform.waypoints.is_empty() && self.platform.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "virtual.interval_ms must be non-zero when a route is configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings handed to the monitoring core.
    #[must_use]
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            capacity: self.monitor.capacity,
        }
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            visits_enabled: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "placewatchd=info,placewatch=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
