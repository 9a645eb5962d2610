//! Hue bridge configuration.

use serde::Deserialize;

/// Configuration for the Hue bridge connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HueConfig {
    /// Base URL of the bridge, e.g. `https://192.168.1.111`.
    pub base_url: String,
    /// Application key sent as the `hue-application-key` header.
    pub application_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HueConfig {
    fn default() -> Self {
        Self {
            base_url: "https://192.168.1.111".to_string(),
            application_key: String::new(),
            timeout_secs: 10,
        }
    }
}
