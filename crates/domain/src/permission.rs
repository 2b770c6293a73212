//! Permission status: the OS-level authorization state for location access,
//! normalized to a cross-platform vocabulary.

use serde::{Deserialize, Serialize};

/// Normalized location-permission state reported alongside every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    PermanentlyDenied,
    NotDetermined,
    Restricted,
    Limited,
    /// The platform did not report a status. Never inferred.
    #[default]
    NotSpecified,
}

impl PermissionStatus {
    /// Map the platform's status string onto the closed vocabulary.
    ///
    /// Total: any unrecognised or absent value maps to
    /// [`NotSpecified`](Self::NotSpecified).
    #[must_use]
    pub fn from_platform(value: Option<&str>) -> Self {
        match value {
            Some("granted") => Self::Granted,
            Some("denied") => Self::Denied,
            Some("permanentlyDenied") => Self::PermanentlyDenied,
            Some("notDetermined") => Self::NotDetermined,
            Some("restricted") => Self::Restricted,
            Some("limited") => Self::Limited,
            _ => Self::NotSpecified,
        }
    }

    /// The platform string for this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::PermanentlyDenied => "permanentlyDenied",
            Self::NotDetermined => "notDetermined",
            Self::Restricted => "restricted",
            Self::Limited => "limited",
            Self::NotSpecified => "notSpecified",
        }
    }

    /// Whether location updates can be expected under this status.
    #[must_use]
    pub fn allows_updates(self) -> bool {
        matches!(self, Self::Granted | Self::Limited)
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECOGNISED: [(&str, PermissionStatus); 6] = [
        ("granted", PermissionStatus::Granted),
        ("denied", PermissionStatus::Denied),
        ("permanentlyDenied", PermissionStatus::PermanentlyDenied),
        ("notDetermined", PermissionStatus::NotDetermined),
        ("restricted", PermissionStatus::Restricted),
        ("limited", PermissionStatus::Limited),
    ];

    #[test]
    fn should_map_every_recognised_string() {
        for (raw, expected) in RECOGNISED {
            assert_eq!(PermissionStatus::from_platform(Some(raw)), expected, "{raw}");
        }
    }

    #[test]
    fn should_map_absent_value_to_not_specified() {
        assert_eq!(
            PermissionStatus::from_platform(None),
            PermissionStatus::NotSpecified
        );
    }

    #[test]
    fn should_map_unknown_strings_to_not_specified() {
        for raw in ["", "Granted", "GRANTED", "authorizedAlways", "notSpecified", " denied"] {
            assert_eq!(
                PermissionStatus::from_platform(Some(raw)),
                PermissionStatus::NotSpecified,
                "{raw:?}"
            );
        }
    }

    #[test]
    fn should_default_to_not_specified() {
        assert_eq!(PermissionStatus::default(), PermissionStatus::NotSpecified);
    }

    #[test]
    fn should_display_platform_string() {
        for (raw, status) in RECOGNISED {
            assert_eq!(status.to_string(), raw);
        }
    }

    #[test]
    fn should_serialize_with_camel_case_names() {
        let json = serde_json::to_string(&PermissionStatus::PermanentlyDenied).unwrap();
        assert_eq!(json, "\"permanentlyDenied\"");
    }

    #[test]
    fn should_allow_updates_only_when_granted_or_limited() {
        assert!(PermissionStatus::Granted.allows_updates());
        assert!(PermissionStatus::Limited.allows_updates());
        assert!(!PermissionStatus::Denied.allows_updates());
        assert!(!PermissionStatus::NotSpecified.allows_updates());
    }
}
