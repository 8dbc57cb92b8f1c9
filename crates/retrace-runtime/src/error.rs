#![forbid(unsafe_code)]

//! Runtime error types.

use std::time::Duration;

use retrace_core::HistoryError;

/// Failures reported by a [`HistoryClient`](crate::HistoryClient).
///
/// History-level problems (unknown command kinds, cursor at a bound) are not
/// errors for remote clients: the host logs them and carries on. A local
/// client surfaces [`HistoryError`] directly since it has it to hand.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The host end of the transport is gone.
    #[error("history host disconnected")]
    Disconnected,
    /// A synchronous request got no reply in time.
    #[error("no reply from history host within {0:?}")]
    Timeout(Duration),
    /// A frame could not be encoded or decoded.
    #[error("malformed history frame: {0}")]
    Codec(#[from] serde_json::Error),
    /// The host answered a request with the wrong reply kind.
    #[error("unexpected reply to {request}: {reply}")]
    UnexpectedReply {
        request: &'static str,
        reply: String,
    },
    /// The operation cannot be performed through this client.
    #[error("{0} is not supported by this client")]
    Unsupported(&'static str),
    /// The local history rejected the call.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// The host thread could not be started.
    #[error("failed to spawn history host: {0}")]
    Spawn(#[from] std::io::Error),
    /// The session configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures loading a [`RetraceConfig`](crate::RetraceConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("config TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Parsed values are out of range.
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Failures installing the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The filter directive did not parse.
    #[error("invalid log filter {filter:?}: {message}")]
    Filter { filter: String, message: String },
    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_display() {
        assert_eq!(
            ClientError::Disconnected.to_string(),
            "history host disconnected"
        );
        assert!(
            ClientError::Timeout(Duration::from_millis(250))
                .to_string()
                .contains("250ms")
        );
        assert_eq!(
            ClientError::Unsupported("register").to_string(),
            "register is not supported by this client"
        );
    }

    #[test]
    fn history_error_is_transparent() {
        let err: ClientError = HistoryError::Unregistered("move".into()).into();
        assert_eq!(
            err.to_string(),
            HistoryError::Unregistered("move".into()).to_string()
        );
    }

    #[test]
    fn config_error_converts_into_client_error() {
        let err: ClientError = ConfigError::Invalid(vec!["x must be > 0".into()]).into();
        assert!(matches!(err, ClientError::Config(_)));
        assert_eq!(err.to_string(), "invalid config: x must be > 0");
    }

    #[test]
    fn invalid_config_joins_messages() {
        let err = ConfigError::Invalid(vec!["a must be > 0".into(), "b too big".into()]);
        assert_eq!(err.to_string(), "invalid config: a must be > 0; b too big");
    }
}
