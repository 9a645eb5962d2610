//! Switch commands and sensor state requests over the bus.

use std::future::Future;

use rumqttc::{AsyncClient, QoS};
use serde::Serialize;

use lumen_app::ports::SwitchGateway;
use lumen_domain::error::GatewayError;
use lumen_domain::id::{SensorId, SwitchId};
use lumen_domain::state::SwitchState;

use crate::error::MqttError;

/// Wire body of a switch command, e.g. `{"state":"ON"}`.
#[derive(Debug, Clone, Copy, Serialize)]
struct SwitchCommand {
    state: SwitchState,
}

/// Publishes switch commands and sensor state requests.
///
/// Everything goes out at QoS 0: the bus gives no delivery guarantee and the
/// controllers are written to tolerate that.
#[derive(Clone)]
pub struct MqttGateway {
    client: AsyncClient,
    base_topic: String,
}

impl MqttGateway {
    #[must_use]
    pub fn new(client: AsyncClient, base_topic: impl Into<String>) -> Self {
        Self {
            client,
            base_topic: base_topic.into(),
        }
    }

    /// Ask `sensor` to publish a fresh report on its device topic.
    ///
    /// zigbee2mqtt answers a `get` request with the current state; used after
    /// a (re)connect to resynchronize occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] when the request queue rejects the
    /// publish.
    pub async fn request_state(&self, sensor: &SensorId) -> Result<(), MqttError> {
        let topic = format!("{}/{sensor}/get", self.base_topic);
        tracing::debug!(sensor = %sensor, "requesting sensor state");
        self.client
            .publish(topic, QoS::AtMostOnce, false, b"{}".to_vec())
            .await
            .map_err(MqttError::Client)
    }

    fn command_topic(&self, switch: &SwitchId) -> String {
        format!("{}/{switch}/set", self.base_topic)
    }
}

impl SwitchGateway for MqttGateway {
    fn set_switch(
        &self,
        switch: &SwitchId,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            let payload = serde_json::to_vec(&SwitchCommand { state }).map_err(MqttError::Encode)?;
            self.client
                .publish(self.command_topic(switch), QoS::AtMostOnce, false, payload)
                .await
                .map_err(MqttError::Client)?;
            tracing::info!(switch = %switch, state = %state, "switch command published");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use rumqttc::MqttOptions;

    use super::*;

    // The event loop is returned alongside the gateway: dropping it closes
    // the request channel and every publish would fail.
    fn make_gateway() -> (MqttGateway, rumqttc::EventLoop) {
        let options = MqttOptions::new("lumen-test", "localhost", 1883);
        let (client, eventloop) = AsyncClient::new(options, 8);
        (MqttGateway::new(client, "zigbee2mqtt"), eventloop)
    }

    #[test]
    fn should_serialize_commands_in_bus_shape() {
        let body = serde_json::to_string(&SwitchCommand {
            state: SwitchState::On,
        })
        .unwrap();
        assert_eq!(body, r#"{"state":"ON"}"#);
    }

    #[tokio::test]
    async fn should_address_the_device_set_topic() {
        let (gateway, _eventloop) = make_gateway();
        assert_eq!(
            gateway.command_topic(&SwitchId::from("kitchen_switch")),
            "zigbee2mqtt/kitchen_switch/set"
        );
    }

    #[tokio::test]
    async fn should_queue_commands_without_a_live_connection() {
        let (gateway, _eventloop) = make_gateway();

        // Queued locally; delivery only happens once the event loop is polled.
        gateway
            .set_switch(&SwitchId::from("kitchen_switch"), SwitchState::Off)
            .await
            .unwrap();
        gateway
            .request_state(&SensorId::from("kitchen_sensor"))
            .await
            .unwrap();
    }
}
