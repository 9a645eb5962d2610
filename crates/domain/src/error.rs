//! Common error types used across the workspace.
//!
//! Two failure families cover everything the controllers care about:
//! payloads that cannot be parsed, and backends that cannot be driven. Both
//! are handled where they occur (log and drop); neither is ever retried.

/// A bus payload that could not be decoded.
#[derive(Debug, thiserror::Error)]
#[error("malformed bus payload")]
pub struct ParseError(#[from] serde_json::Error);

/// A backend (bus or bridge) that could not be driven.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend could not be reached at all: connection refused, timeout,
    /// request queue closed.
    #[error("backend unreachable")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend answered, but not in a shape we can use.
    #[error("backend answered malformed: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Wrap a transport-level failure.
    #[must_use]
    pub fn unreachable(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unreachable(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_json_errors_into_parse_error() {
        let json_err = serde_json::from_str::<bool>("not json").unwrap_err();
        let err = ParseError::from(json_err);
        assert_eq!(err.to_string(), "malformed bus payload");
    }

    #[test]
    fn should_keep_the_transport_failure_as_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = GatewayError::unreachable(io_err);
        assert_eq!(err.to_string(), "backend unreachable");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn should_describe_malformed_answers() {
        let err = GatewayError::Malformed("no data in envelope".to_string());
        assert_eq!(err.to_string(), "backend answered malformed: no data in envelope");
    }
}
