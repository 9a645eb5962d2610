//! Hue adapter error types.

use lumen_domain::error::GatewayError;

/// Errors specific to the Hue adapter.
#[derive(Debug, thiserror::Error)]
pub enum HueError {
    /// The HTTP client could not be constructed.
    #[error("failed to build Hue HTTP client")]
    Build(#[source] reqwest::Error),

    /// The configured application key is not a valid header value.
    #[error("application key is not a valid header value")]
    InvalidKey,

    /// The request could not be sent or timed out.
    #[error("Hue bridge request failed")]
    Request(#[source] reqwest::Error),

    /// The bridge answered with a non-success status.
    #[error("Hue bridge returned status {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be decoded.
    #[error("failed to decode Hue response")]
    Decode(#[source] reqwest::Error),

    /// The response decoded but its `data` array was empty.
    #[error("Hue response carried no {0} resource")]
    Empty(&'static str),

    /// No room on the bridge carries the configured name.
    #[error("no room named {0:?} on the bridge")]
    UnknownRoom(String),

    /// The room exists but exposes no grouped light service.
    #[error("room {0:?} has no grouped light service")]
    NoGroupedLight(String),
}

impl HueError {
    /// Convert into the domain-level gateway error. Transport failures map
    /// to unreachable; everything else means the bridge answered in a shape
    /// the controllers cannot use.
    #[must_use]
    pub fn into_gateway(self) -> GatewayError {
        match self {
            err @ (Self::Build(_) | Self::InvalidKey | Self::Request(_) | Self::Status(_)) => {
                GatewayError::unreachable(err)
            }
            err => GatewayError::Malformed(err.to_string()),
        }
    }
}

impl From<HueError> for GatewayError {
    fn from(err: HueError) -> Self {
        err.into_gateway()
    }
}
