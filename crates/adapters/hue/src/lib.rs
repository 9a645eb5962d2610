//! # lumen-adapter-hue
//!
//! Philips Hue adapter — CLIP v2 light and grouped-light control over HTTPS.
//!
//! ## Responsibilities
//! - Speak the bridge's CLIP v2 REST API (`/clip/v2/resource/...`)
//! - Authenticate with the `hue-application-key` header
//! - Implement the light gateway port for single lights
//! - Implement the switch gateway port for room grouped lights
//!
//! ## Dependency rule
//! Depends on `lumen-app` (ports) and `lumen-domain` (ids, state).
//! Never the reverse.

pub mod client;
pub mod config;
pub mod error;
pub mod resources;

pub use client::{HueClient, HueRoomGateway};
pub use config::HueConfig;
pub use error::HueError;
