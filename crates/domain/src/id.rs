//! Monitor instance identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one monitoring core instance across its lifetime.
///
/// Carried as a structured field on every log line the core emits so that
/// several monitors running in the same process can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(uuid::Uuid);

impl Default for MonitorId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl MonitorId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The short form is enough to correlate log lines.
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        assert_ne!(MonitorId::new(), MonitorId::new());
    }

    #[test]
    fn should_display_eight_hex_chars() {
        let id = MonitorId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 8);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(id.0.simple().to_string().starts_with(&text));
    }

    #[test]
    fn should_serialize_as_plain_uuid_string() {
        let id = MonitorId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }
}
