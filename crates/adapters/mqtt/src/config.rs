//! MQTT connection configuration.

use serde::Deserialize;

/// Configuration for the MQTT connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic prefix the zigbee2mqtt bridge publishes under.
    pub base_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
}

impl MqttConfig {
    /// Topic a device publishes its reports on.
    #[must_use]
    pub fn device_topic(&self, device: &str) -> String {
        format!("{}/{device}", self.base_topic)
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "lumen".to_string(),
            base_topic: "zigbee2mqtt".to_string(),
            keep_alive_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_sensible_defaults() {
        let config = MqttConfig::default();
        assert_eq!(config.broker_host, "localhost");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.client_id, "lumen");
        assert_eq!(config.base_topic, "zigbee2mqtt");
        assert_eq!(config.keep_alive_secs, 30);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let config: MqttConfig = toml::from_str(
            r#"
            broker_host = "broker.local"
            broker_port = 8883
            client_id = "lumen-test"
            base_topic = "z2m"
            keep_alive_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.broker_host, "broker.local");
        assert_eq!(config.broker_port, 8883);
        assert_eq!(config.client_id, "lumen-test");
        assert_eq!(config.base_topic, "z2m");
        assert_eq!(config.keep_alive_secs, 60);
    }

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        let config: MqttConfig = toml::from_str(r#"broker_host = "10.0.0.2""#).unwrap();
        assert_eq!(config.broker_host, "10.0.0.2");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.base_topic, "zigbee2mqtt");
    }

    #[test]
    fn should_format_device_topics_under_the_base_topic() {
        let config = MqttConfig::default();
        assert_eq!(config.device_topic("kitchen_sensor"), "zigbee2mqtt/kitchen_sensor");
    }
}
