//! Inbound bus events and their wire payloads.
//!
//! Events are transient: they are parsed off the bus, dispatched to a
//! controller, and dropped. Nothing here is persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::id::{ButtonId, ZoneId};

/// An occupancy report attributed to a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyEvent {
    /// Zone the reporting sensor is bound to.
    pub zone: ZoneId,
    /// Whether the sensor currently detects presence.
    pub occupied: bool,
}

/// A press action attributed to a button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Button the press came from.
    pub button: ButtonId,
    /// Which press gesture the device decoded.
    pub action: ButtonAction,
}

/// Press gestures a Tuya wall button reports.
///
/// Serializes in the lowercase form the device publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    Single,
    Double,
    Hold,
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Double => write!(f, "double"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// Wire payload of an occupancy sensor report, e.g. `{"occupancy":true}`.
///
/// Sensors attach extra fields (battery, link quality); those are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OccupancyPayload {
    pub occupancy: bool,
}

impl OccupancyPayload {
    /// Parse a raw bus payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the payload is not JSON or the
    /// `occupancy` field is missing or mistyped.
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Wire payload of a button report, e.g. `{"action":"single"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ButtonPayload {
    pub action: ButtonAction,
}

impl ButtonPayload {
    /// Parse a raw bus payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the payload is not JSON or the `action`
    /// field is missing or not a known gesture.
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(payload)?)
    }
}
