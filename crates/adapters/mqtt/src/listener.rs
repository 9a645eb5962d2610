//! Broker connection and the dispatch loop.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

use lumen_app::router::{ButtonHandler, EventRouter, OccupancyHandler};
use lumen_domain::id::SensorId;

use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::gateway::MqttGateway;

/// Delay before polling again after a steady-state connection error.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Owns the rumqttc client and its event loop.
pub struct MqttConnection {
    client: AsyncClient,
    eventloop: EventLoop,
    config: MqttConfig,
}

impl MqttConnection {
    /// Build the client from configuration. No network IO happens until
    /// [`run`](Self::run) polls the event loop.
    #[must_use]
    pub fn connect(config: MqttConfig) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        let (client, eventloop) = AsyncClient::new(options, 32);
        Self {
            client,
            eventloop,
            config,
        }
    }

    /// A gateway publishing through this connection.
    #[must_use]
    pub fn gateway(&self) -> MqttGateway {
        MqttGateway::new(self.client.clone(), self.config.base_topic.clone())
    }

    /// Poll the event loop forever, feeding publishes into `router`.
    ///
    /// On every `ConnAck` the router's topics are (re)subscribed, since the
    /// broker may have dropped the session, and each sensor in `refresh` is
    /// asked for a fresh report so zone state catches up with reality.
    ///
    /// # Errors
    ///
    /// Returns the connection error if the **first** connection attempt
    /// fails. Once connected, errors are logged and polling retries with a
    /// short backoff.
    pub async fn run<Z, B>(
        mut self,
        router: &EventRouter<Z, B>,
        refresh: &[SensorId],
    ) -> Result<(), MqttError>
    where
        Z: OccupancyHandler,
        B: ButtonHandler + 'static,
    {
        let gateway = self.gateway();
        let mut connected_once = false;

        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    connected_once = true;
                    tracing::info!(
                        host = %self.config.broker_host,
                        port = self.config.broker_port,
                        "connected to MQTT broker"
                    );
                    for topic in router.topics() {
                        if let Err(err) = self.client.subscribe(topic, QoS::AtMostOnce).await {
                            tracing::error!(topic = %topic, error = %err, "subscribe failed");
                        }
                    }
                    for sensor in refresh {
                        if let Err(err) = gateway.request_state(sensor).await {
                            tracing::warn!(sensor = %sensor, error = %err, "state refresh request failed");
                        }
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    router.dispatch(&publish.topic, &publish.payload).await;
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    tracing::warn!("broker sent disconnect");
                }
                Ok(_) => {}
                Err(err) if connected_once => {
                    tracing::error!(error = %err, "MQTT connection lost, retrying");
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                }
                Err(err) => return Err(MqttError::Connection(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_build_a_client_without_touching_the_network() {
        let connection = MqttConnection::connect(MqttConfig::default());
        assert_eq!(connection.config.base_topic, "zigbee2mqtt");

        // The gateway shares the unpolled client; nothing has connected yet.
        let _gateway = connection.gateway();
    }
}
