//! Typed identifier newtypes.
//!
//! Zones and zigbee2mqtt devices are addressed by the names they carry on the
//! bus, so those identifiers wrap strings. Hue resources are addressed by the
//! UUIDs the bridge assigns, so [`LightId`] wraps one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_name_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap a bus name.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Access the name as it appears on the bus.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

define_name_id!(
    /// Logical name of an occupancy zone, e.g. `kitchen`.
    ZoneId
);

define_name_id!(
    /// zigbee2mqtt device name of an occupancy sensor.
    SensorId
);

define_name_id!(
    /// zigbee2mqtt device name of a wall button.
    ButtonId
);

define_name_id!(
    /// Name of a switched actuator: a zigbee2mqtt device, or a Hue room when
    /// the zone drives a grouped light.
    SwitchId
);

/// Unique identifier of a Hue light resource, assigned by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightId(uuid::Uuid);

impl LightId {
    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LightId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}
