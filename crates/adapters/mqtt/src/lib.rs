//! # lumen-adapter-mqtt
//!
//! MQTT adapter — connects lumen to a zigbee2mqtt bus via rumqttc.
//!
//! ## Responsibilities
//! - Maintain the broker connection and poll its event loop
//! - Subscribe to the topics the event router needs, on every (re)connect
//! - Publish switch commands and sensor state requests
//! - Feed inbound publishes into the event router
//!
//! ## Dependency rule
//! Depends on `lumen-app` (ports, router) and `lumen-domain` (ids, state).
//! Never the reverse.

pub mod config;
pub mod error;
pub mod gateway;
pub mod listener;

pub use config::MqttConfig;
pub use error::MqttError;
pub use gateway::MqttGateway;
pub use listener::MqttConnection;
