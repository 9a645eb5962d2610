//! Daemon configuration — TOML file plus environment overrides.
//!
//! Looks for `lumen.toml` in the working directory. Every field has a
//! default, so the file is optional; out of the box the daemon runs the
//! kitchen reference setup. Environment variables override file values.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use lumen_adapter_hue::HueConfig;
use lumen_adapter_mqtt::MqttConfig;
use lumen_domain::id::{ButtonId, LightId, SensorId, SwitchId, ZoneId};

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML.
    #[error("failed to parse configuration file")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but does not make sense.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Top-level daemon configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection settings.
    pub mqtt: MqttConfig,
    /// Hue bridge settings.
    pub hue: HueConfig,
    /// Controller timing settings.
    pub lighting: LightingConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Occupancy zone bindings.
    pub zones: Vec<ZoneBinding>,
    /// Wall button bindings.
    pub buttons: Vec<ButtonBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig::default(),
            hue: HueConfig::default(),
            lighting: LightingConfig::default(),
            logging: LoggingConfig::default(),
            zones: vec![ZoneBinding::default()],
            buttons: Vec::new(),
        }
    }
}

/// Timing knobs for the controllers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Seconds an unoccupied zone stays lit before the auto-off fires.
    pub auto_off_secs: u64,
    /// Minimum seconds between two accepted presses of the same button.
    pub debounce_secs: u64,
}

impl LightingConfig {
    /// Auto-off delay as a duration.
    #[must_use]
    pub fn auto_off(&self) -> Duration {
        Duration::from_secs(self.auto_off_secs)
    }

    /// Debounce window as a duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            auto_off_secs: 300,
            debounce_secs: 2,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive in `RUST_LOG` syntax.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lumend=info,lumen_app=info,lumen_adapter_mqtt=info,lumen_adapter_hue=info"
                .to_string(),
        }
    }
}

/// Binds an occupancy sensor to the actuator its zone drives.
///
/// Exactly one of `switch` and `hue_room` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneBinding {
    /// Logical zone name.
    pub name: ZoneId,
    /// zigbee2mqtt device name of the occupancy sensor.
    pub sensor: SensorId,
    /// zigbee2mqtt device name of the switch to drive.
    #[serde(default)]
    pub switch: Option<SwitchId>,
    /// Hue room whose grouped light to drive instead of a bus switch.
    #[serde(default)]
    pub hue_room: Option<String>,
}

/// The actuator side of a well-formed zone binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneActuator {
    /// Topic-addressed bus switch.
    Switch(SwitchId),
    /// Hue room grouped light, addressed by room name.
    HueRoom(String),
}

impl ZoneBinding {
    /// The actuator this zone drives, `None` when the binding names both or
    /// neither backend.
    #[must_use]
    pub fn actuator(&self) -> Option<ZoneActuator> {
        match (&self.switch, &self.hue_room) {
            (Some(switch), None) => Some(ZoneActuator::Switch(switch.clone())),
            (None, Some(room)) => Some(ZoneActuator::HueRoom(room.clone())),
            _ => None,
        }
    }
}

impl Default for ZoneBinding {
    fn default() -> Self {
        Self {
            name: ZoneId::from("kitchen"),
            sensor: SensorId::from("kitchen_sensor"),
            switch: Some(SwitchId::from("kitchen_switch")),
            hue_room: None,
        }
    }
}

/// Binds a wall button to the lights it controls.
#[derive(Debug, Clone, Deserialize)]
pub struct ButtonBinding {
    /// zigbee2mqtt device name of the button.
    pub name: ButtonId,
    /// Hue light resource toggled by a single press.
    pub light: LightId,
    /// zigbee2mqtt switch toggled by a double press.
    pub switch: SwitchId,
    /// Zone whose auto-off a double press to off cancels.
    #[serde(default)]
    pub zone: Option<ZoneId>,
}

impl Config {
    /// Load configuration from `lumen.toml` (if present), then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or if the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("lumen.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file, falling back to
    /// defaults when the file does not exist.
    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Environment variables take precedence over file values. Values that
    /// do not parse are skipped.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("MQTT_BROKER_URL")
            && let Ok((host, port)) = parse_broker_url(&value)
        {
            self.mqtt.broker_host = host;
            self.mqtt.broker_port = port;
        }
        if let Ok(value) = std::env::var("HUE_URL") {
            self.hue.base_url = value;
        }
        if let Ok(value) = std::env::var("HUE_USER") {
            self.hue.application_key = value;
        }
        if let Ok(value) = std::env::var("LUMEN_AUTO_OFF_SECS")
            && let Ok(secs) = value.parse()
        {
            self.lighting.auto_off_secs = secs;
        }
        if let Ok(value) = std::env::var("LUMEN_DEBOUNCE_SECS")
            && let Ok(secs) = value.parse()
        {
            self.lighting.debounce_secs = secs;
        }
        if let Ok(value) = std::env::var("LUMEN_LOG") {
            self.logging.filter = value;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "mqtt.broker_port must be non-zero".to_string(),
            ));
        }
        if self.lighting.auto_off_secs == 0 {
            return Err(ConfigError::Validation(
                "lighting.auto_off_secs must be non-zero".to_string(),
            ));
        }
        for zone in &self.zones {
            if zone.actuator().is_none() {
                return Err(ConfigError::Validation(format!(
                    "zone {} must bind exactly one of switch and hue_room",
                    zone.name
                )));
            }
        }
        for button in &self.buttons {
            if let Some(zone) = &button.zone
                && !self.zones.iter().any(|binding| &binding.name == zone)
            {
                return Err(ConfigError::Validation(format!(
                    "button {} references unknown zone {zone}",
                    button.name
                )));
            }
        }
        Ok(())
    }
}

/// Parse `mqtt://host:port` (scheme and port optional) into host and port.
fn parse_broker_url(url: &str) -> Result<(String, u16), ConfigError> {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url)
        .trim_end_matches('/');
    if stripped.is_empty() {
        return Err(ConfigError::Validation(format!("empty broker URL {url:?}")));
    }
    match stripped.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid broker port in {url:?}")))?;
            Ok((host.to_string(), port))
        }
        None => Ok((stripped.to_string(), 1883)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_the_kitchen_reference_setup() {
        let config = Config::default();
        assert_eq!(config.zones.len(), 1);
        assert_eq!(config.zones[0].name, ZoneId::from("kitchen"));
        assert_eq!(config.zones[0].sensor, SensorId::from("kitchen_sensor"));
        assert_eq!(
            config.zones[0].actuator(),
            Some(ZoneActuator::Switch(SwitchId::from("kitchen_switch")))
        );
        assert!(config.buttons.is_empty());
        assert_eq!(config.lighting.auto_off_secs, 300);
        assert_eq!(config.lighting.debounce_secs, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_a_full_configuration() {
        let config: Config = toml::from_str(
            r#"
            [mqtt]
            broker_host = "10.0.0.2"

            [hue]
            application_key = "abc123"

            [lighting]
            auto_off_secs = 120
            debounce_secs = 1

            [logging]
            filter = "debug"

            [[zones]]
            name = "kitchen"
            sensor = "kitchen_sensor"
            switch = "kitchen_switch"

            [[zones]]
            name = "office"
            sensor = "office_sensor"
            hue_room = "Office"

            [[buttons]]
            name = "bedroom_button"
            light = "f2a8a4da-8b1c-4a42-8f5d-1c64b1b7e0a1"
            switch = "bedroom_switch"
            zone = "kitchen"
            "#,
        )
        .unwrap();

        assert_eq!(config.mqtt.broker_host, "10.0.0.2");
        assert_eq!(config.lighting.auto_off_secs, 120);
        assert_eq!(config.zones.len(), 2);
        assert_eq!(
            config.zones[1].actuator(),
            Some(ZoneActuator::HueRoom("Office".to_string()))
        );
        assert_eq!(config.buttons.len(), 1);
        assert_eq!(config.buttons[0].zone, Some(ZoneId::from("kitchen")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_a_zone_binding_both_backends() {
        let config: Config = toml::from_str(
            r#"
            [[zones]]
            name = "kitchen"
            sensor = "kitchen_sensor"
            switch = "kitchen_switch"
            hue_room = "Kitchen"
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_a_zone_binding_no_backend() {
        let config: Config = toml::from_str(
            r#"
            [[zones]]
            name = "kitchen"
            sensor = "kitchen_sensor"
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_a_button_referencing_an_unknown_zone() {
        let config: Config = toml::from_str(
            r#"
            [[buttons]]
            name = "bedroom_button"
            light = "f2a8a4da-8b1c-4a42-8f5d-1c64b1b7e0a1"
            switch = "bedroom_switch"
            zone = "attic"
            "#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_a_zero_auto_off() {
        let config: Config = toml::from_str("[lighting]\nauto_off_secs = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_parse_broker_urls_with_and_without_scheme() {
        assert_eq!(
            parse_broker_url("mqtt://broker.local:8883").unwrap(),
            ("broker.local".to_string(), 8883)
        );
        assert_eq!(
            parse_broker_url("tcp://10.0.0.2:1884/").unwrap(),
            ("10.0.0.2".to_string(), 1884)
        );
        assert_eq!(
            parse_broker_url("broker.local").unwrap(),
            ("broker.local".to_string(), 1883)
        );
    }

    #[test]
    fn should_reject_broker_urls_with_bad_ports() {
        assert!(parse_broker_url("mqtt://broker.local:mqtt").unwrap_err().to_string().contains("port"));
        assert!(parse_broker_url("mqtt://").is_err());
    }

    #[test]
    fn should_fall_back_to_defaults_when_the_file_is_missing() {
        let config = Config::from_file("does-not-exist.toml").unwrap();
        assert_eq!(config.zones.len(), 1);
    }

    #[test]
    fn should_report_parse_errors_for_broken_toml() {
        let dir = std::env::temp_dir().join("lumend-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "this is not toml [").unwrap();

        let result = Config::from_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_file(&path).ok();
    }
}
