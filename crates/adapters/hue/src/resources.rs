//! CLIP v2 wire types.
//!
//! Every CLIP v2 endpoint wraps its payload in a `data` array envelope. The
//! structs here keep only the fields the controllers need; the bridge sends
//! far more and serde drops the rest.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic `{"data":[...]}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Vec<T>,
}

/// A light resource, reduced to its on/off state.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LightResource {
    pub on: OnState,
}

/// The nested `{"on":{"on":bool}}` shape shared by status and commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnState {
    pub on: bool,
}

/// Command body for light and grouped-light `PUT`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OnCommand {
    pub on: OnState,
}

impl OnCommand {
    #[must_use]
    pub fn new(on: bool) -> Self {
        Self {
            on: OnState { on },
        }
    }
}

/// A room resource with its service links.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomResource {
    pub id: Uuid,
    pub metadata: RoomMetadata,
    #[serde(default)]
    pub services: Vec<ResourceLink>,
}

/// Room naming metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomMetadata {
    pub name: String,
}

/// A typed reference to another resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceLink {
    pub rid: Uuid,
    pub rtype: String,
}

impl RoomResource {
    /// The room's grouped light service, if it exposes one.
    #[must_use]
    pub fn grouped_light(&self) -> Option<Uuid> {
        self.services
            .iter()
            .find(|link| link.rtype == "grouped_light")
            .map(|link| link.rid)
    }
}
