//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the monitoring core and the outside
//! world. They are defined here (in `app`) so that both the core and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod platform;

pub use platform::{
    LocationPlatform, PlatformEvent, PlatformEvents, PlatformFailure, PlatformSignal,
};
