//! Gateway ports — how controllers drive the actuator backends.
//!
//! Two shapes of backend exist. The bus switch is fire-and-forget: commands
//! are published and nothing comes back. The bridge light is queryable:
//! state can be read before and after a command. The controllers are written
//! against exactly that split.

use std::future::Future;
use std::sync::Arc;

use lumen_domain::error::GatewayError;
use lumen_domain::id::{LightId, SwitchId};
use lumen_domain::state::SwitchState;

/// Fire-and-forget on/off commands to a switched actuator.
///
/// No delivery guarantee: `Ok` means the command was handed to the backend,
/// not that the light changed.
pub trait SwitchGateway: Send + Sync {
    /// Command `switch` into `state`.
    fn set_switch(
        &self,
        switch: &SwitchId,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Queryable on/off control of a bridge light.
pub trait LightGateway: Send + Sync {
    /// Whether `light` is currently on, as the backend observes it.
    fn light_status(&self, light: &LightId) -> impl Future<Output = Result<bool, GatewayError>> + Send;

    /// Command `light` on or off.
    fn set_light(&self, light: &LightId, on: bool) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// Predicate consulted before an occupancy-driven turn-on.
///
/// Lets a deployment veto automatic lighting (daylight, quiet hours) without
/// touching the zone logic. Denial suppresses the command only; occupancy
/// tracking and the auto-off cycle run unchanged.
pub trait OccupancyGate: Send + Sync {
    /// Whether the zone may switch its light on right now.
    fn allow_light_on(&self) -> impl Future<Output = bool> + Send;
}

/// The default gate: always allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ungated;

impl OccupancyGate for Ungated {
    fn allow_light_on(&self) -> impl Future<Output = bool> + Send {
        async { true }
    }
}

impl<T: SwitchGateway> SwitchGateway for Arc<T> {
    fn set_switch(
        &self,
        switch: &SwitchId,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).set_switch(switch, state)
    }
}

impl<T: LightGateway> LightGateway for Arc<T> {
    fn light_status(&self, light: &LightId) -> impl Future<Output = Result<bool, GatewayError>> + Send {
        (**self).light_status(light)
    }

    fn set_light(&self, light: &LightId, on: bool) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).set_light(light, on)
    }
}

impl<T: OccupancyGate> OccupancyGate for Arc<T> {
    fn allow_light_on(&self) -> impl Future<Output = bool> + Send {
        (**self).allow_light_on()
    }
}
