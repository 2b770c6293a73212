//! # placewatch-app
//!
//! Application layer: the monitoring core and its **port definitions**.
//!
//! ## Responsibilities
//! - Define the driven port a native location layer implements:
//!   - [`ports::LocationPlatform`]: lifecycle requests plus raw event sources
//! - Normalize raw platform payloads and failures into domain results
//!   ([`normalizer`])
//! - Provide **in-process infrastructure** (the multicast [`update_bus`])
//! - Own the location and visit lifecycles ([`monitor::LocationMonitor`])
//!
//! ## Dependency rule
//! Depends on `placewatch-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod monitor;
pub mod normalizer;
pub mod ports;
pub mod update_bus;
