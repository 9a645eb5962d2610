//! # lumen-app
//!
//! Application layer — controllers and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SwitchGateway` — fire-and-forget on/off commands
//!   - `LightGateway` — queryable on/off state and commands
//!   - `OccupancyGate` — predicate consulted before an occupancy turn-on
//! - Provide the **controllers** that carry the behavior:
//!   - `ZoneController` — occupancy-driven switching with an auto-off timer
//!   - `ButtonController` — debounced press handling with verification
//!   - `EventRouter` — maps bus topics onto the controllers
//! - Orchestrate domain types without knowing *how* the bus or bridge works
//!
//! ## Dependency rule
//! Depends on `lumen-domain` only (plus `tokio` for timers and locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod button;
pub mod ports;
pub mod router;
pub mod timer;
pub mod zone;
