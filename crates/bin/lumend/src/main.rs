//! # lumend — the lumen daemon
//!
//! Composition root that wires the bus, the bridge, and the controllers
//! together and runs the dispatch loop.
//!
//! ## Responsibilities
//! - Load configuration (TOML file plus environment overrides)
//! - Initialize structured logging
//! - Build the MQTT connection, the Hue client, and the controllers
//! - Run the dispatch loop until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on every other crate. It is the
//! wiring layer; no controller logic belongs here.

mod config;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;

use lumen_adapter_hue::{HueClient, HueRoomGateway};
use lumen_adapter_mqtt::{MqttConnection, MqttGateway};
use lumen_app::button::{ButtonBinding, ButtonController, ButtonSet};
use lumen_app::ports::{SwitchGateway, Ungated};
use lumen_app::router::EventRouter;
use lumen_app::zone::{ZoneController, ZoneSet};
use lumen_domain::error::GatewayError;
use lumen_domain::id::{SensorId, SwitchId};
use lumen_domain::state::SwitchState;

use crate::config::{Config, ZoneActuator};

/// The actuator backend a zone drives, chosen per binding.
enum ZoneBackend {
    /// Topic-addressed bus switch.
    Switch(MqttGateway),
    /// Hue room grouped light.
    HueRoom(HueRoomGateway),
}

impl SwitchGateway for ZoneBackend {
    fn set_switch(
        &self,
        switch: &SwitchId,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            match self {
                Self::Switch(gateway) => gateway.set_switch(switch, state).await,
                Self::HueRoom(gateway) => gateway.set_switch(switch, state).await,
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .init();

    let connection = MqttConnection::connect(config.mqtt.clone());
    let mqtt_gateway = connection.gateway();
    let hue_client = HueClient::new(&config.hue).context("building Hue client")?;

    let mut zones = ZoneSet::new();
    let mut refresh: Vec<SensorId> = Vec::new();
    for binding in &config.zones {
        let actuator = binding
            .actuator()
            .with_context(|| format!("zone {} has no actuator bound", binding.name))?;
        let (backend, switch) = match actuator {
            ZoneActuator::Switch(switch) => (ZoneBackend::Switch(mqtt_gateway.clone()), switch),
            ZoneActuator::HueRoom(room) => (
                ZoneBackend::HueRoom(HueRoomGateway::new(hue_client.clone())),
                SwitchId::from(room),
            ),
        };
        zones.insert(ZoneController::new(
            binding.name.clone(),
            switch,
            config.lighting.auto_off(),
            backend,
            Ungated,
        ));
        refresh.push(binding.sensor.clone());
    }
    let zones = Arc::new(zones);

    let mut buttons = ButtonSet::new();
    for binding in &config.buttons {
        buttons.insert(ButtonController::new(
            ButtonBinding {
                button: binding.name.clone(),
                light: binding.light,
                switch: binding.switch.clone(),
                zone: binding.zone.clone(),
            },
            config.lighting.debounce(),
            hue_client.clone(),
            mqtt_gateway.clone(),
            Arc::clone(&zones),
        ));
    }
    let buttons = Arc::new(buttons);

    let mut router = EventRouter::new(Arc::clone(&zones), Arc::clone(&buttons));
    for binding in &config.zones {
        router.route_occupancy(
            config.mqtt.device_topic(binding.sensor.as_str()),
            binding.name.clone(),
        );
    }
    for binding in &config.buttons {
        router.route_button(
            config.mqtt.device_topic(binding.name.as_str()),
            binding.name.clone(),
        );
    }

    tracing::info!(
        host = %config.mqtt.broker_host,
        port = config.mqtt.broker_port,
        zones = zones.len(),
        buttons = buttons.len(),
        "lumend starting"
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("installing SIGTERM handler")?;

    tokio::select! {
        result = connection.run(&router, &refresh) => {
            result.context("MQTT connection failed")?;
        }
        _ = &mut ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }

    Ok(())
}
