//! # placewatch-domain
//!
//! Pure domain model for the placewatch location monitoring system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Locations** (a single position fix with optional accuracy data)
//! - Define **Visits** (a dwell at a place, reported with arrival/departure)
//! - Define the normalized **permission** vocabulary
//! - Define **MonitorResult**, the success-or-error value carried on every
//!   update stream
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod location;
pub mod permission;
pub mod result;
pub mod visit;
