//! MQTT adapter error types.

use lumen_domain::error::GatewayError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The client rejected a request: queue closed or full.
    #[error("MQTT client error")]
    Client(#[from] rumqttc::ClientError),

    /// The connection to the broker failed.
    #[error("MQTT connection error")]
    Connection(#[from] rumqttc::ConnectionError),

    /// An outbound payload could not be encoded.
    #[error("failed to encode MQTT payload")]
    Encode(#[source] serde_json::Error),
}

impl MqttError {
    /// Convert into the domain-level gateway error.
    #[must_use]
    pub fn into_gateway(self) -> GatewayError {
        match self {
            Self::Encode(err) => GatewayError::Malformed(format!("payload encode failed: {err}")),
            other => GatewayError::unreachable(other),
        }
    }
}

impl From<MqttError> for GatewayError {
    fn from(err: MqttError) -> Self {
        err.into_gateway()
    }
}
