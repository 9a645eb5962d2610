//! CLIP v2 client — light status and commands, room lookup, grouped lights.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use uuid::Uuid;

use lumen_app::ports::{LightGateway, SwitchGateway};
use lumen_domain::error::GatewayError;
use lumen_domain::id::{LightId, SwitchId};
use lumen_domain::state::SwitchState;

use crate::config::HueConfig;
use crate::error::HueError;
use crate::resources::{Envelope, LightResource, OnCommand, RoomResource};

/// HTTP client for a Hue bridge.
///
/// The bridge serves a self-signed certificate on the LAN, so certificate
/// validation is disabled. The application key rides along as a default
/// header on every request and is marked sensitive so it never shows up in
/// debug output.
#[derive(Debug, Clone)]
pub struct HueClient {
    http: reqwest::Client,
    base_url: String,
}

impl HueClient {
    /// Build a client for the configured bridge.
    ///
    /// # Errors
    ///
    /// Returns [`HueError::InvalidKey`] when the application key cannot be
    /// carried in a header, or [`HueError::Build`] when the TLS backend
    /// fails to initialize.
    pub fn new(config: &HueConfig) -> Result<Self, HueError> {
        let mut key =
            HeaderValue::from_str(&config.application_key).map_err(|_| HueError::InvalidKey)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("hue-application-key", key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(HueError::Build)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Whether `light` is on, as the bridge reports it.
    ///
    /// # Errors
    ///
    /// Returns [`HueError::Empty`] when the bridge knows no such light, and
    /// the usual transport and decode errors otherwise.
    pub async fn light_is_on(&self, light: &LightId) -> Result<bool, HueError> {
        let envelope: Envelope<LightResource> = self
            .get_envelope(&format!("/clip/v2/resource/light/{light}"))
            .await?;
        envelope
            .data
            .first()
            .map(|resource| resource.on.on)
            .ok_or(HueError::Empty("light"))
    }

    /// Command `light` on or off.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error when the bridge refuses.
    pub async fn switch_light(&self, light: &LightId, on: bool) -> Result<(), HueError> {
        self.put_command(&format!("/clip/v2/resource/light/{light}"), on)
            .await
    }

    /// Look up a room by the name it carries in the Hue app.
    ///
    /// # Errors
    ///
    /// Returns [`HueError::UnknownRoom`] when no room matches.
    pub async fn room_by_name(&self, name: &str) -> Result<RoomResource, HueError> {
        let envelope: Envelope<RoomResource> =
            self.get_envelope("/clip/v2/resource/room").await?;
        envelope
            .data
            .into_iter()
            .find(|room| room.metadata.name == name)
            .ok_or_else(|| HueError::UnknownRoom(name.to_string()))
    }

    /// Command a room's grouped light on or off.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error when the bridge refuses.
    pub async fn switch_grouped_light(&self, group: Uuid, on: bool) -> Result<(), HueError> {
        self.put_command(&format!("/clip/v2/resource/grouped_light/{group}"), on)
            .await
    }

    async fn get_envelope<T>(&self, path: &str) -> Result<Envelope<T>, HueError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(HueError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HueError::Status(status));
        }
        response.json().await.map_err(HueError::Decode)
    }

    async fn put_command(&self, path: &str, on: bool) -> Result<(), HueError> {
        let response = self
            .http
            .put(format!("{}{path}", self.base_url))
            .json(&OnCommand::new(on))
            .send()
            .await
            .map_err(HueError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(HueError::Status(status));
        }
        Ok(())
    }
}

impl LightGateway for HueClient {
    fn light_status(&self, light: &LightId) -> impl Future<Output = Result<bool, GatewayError>> + Send {
        async move { Ok(self.light_is_on(light).await?) }
    }

    fn set_light(&self, light: &LightId, on: bool) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move { Ok(self.switch_light(light, on).await?) }
    }
}

/// Drives a room's grouped light through the switch port.
///
/// The switch id carries the room name; every command resolves the room on
/// the bridge and targets its grouped light service. Resolving per command
/// keeps the daemon correct across room reshuffles in the Hue app.
#[derive(Debug, Clone)]
pub struct HueRoomGateway {
    client: HueClient,
}

impl HueRoomGateway {
    #[must_use]
    pub fn new(client: HueClient) -> Self {
        Self { client }
    }
}

impl SwitchGateway for HueRoomGateway {
    fn set_switch(
        &self,
        switch: &SwitchId,
        state: SwitchState,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        async move {
            let room = self.client.room_by_name(switch.as_str()).await?;
            let group = room
                .grouped_light()
                .ok_or_else(|| HueError::NoGroupedLight(switch.as_str().to_string()))?;
            self.client
                .switch_grouped_light(group, state.is_on())
                .await?;
            tracing::info!(room = %room.id, name = %switch, state = %state, "grouped light commanded");
            Ok(())
        }
    }
}
