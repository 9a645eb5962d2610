//! # lumen-domain
//!
//! Pure domain model for the lumen lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **SwitchState** — the on/off vocabulary shared with the bus
//! - Define **Events** — occupancy reports and button presses, together with
//!   their wire payloads
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod event;
pub mod id;
pub mod state;
