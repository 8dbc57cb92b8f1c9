#![forbid(unsafe_code)]

//! Runtime configuration for a history session.
//!
//! Captures history limits, transport choice and log output as a single
//! [`RetraceConfig`] that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # retrace.toml
//! [history]
//! max_depth = 500
//!
//! [transport]
//! mode = "threaded"
//! reply_timeout_ms = 250
//!
//! [logging]
//! filter = "retrace=debug"
//! json = true
//! ```
//!
//! ```rust,ignore
//! let config = RetraceConfig::from_toml_file("retrace.toml")?;
//! let config = RetraceConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every section is optional. `RetraceConfig::default()` keeps unlimited
//! history in-process and logs at `info`.

use std::path::Path;
use std::time::Duration;

use retrace_core::HistoryConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::remote::DEFAULT_REPLY_TIMEOUT;

// ---------------------------------------------------------------------------
// Top-level RetraceConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for a [`HistorySession`](crate::HistorySession).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetraceConfig {
    /// Undo history limits.
    pub history: HistoryConfig,

    /// Where the history lives and how clients reach it.
    pub transport: TransportConfig,

    /// Log output.
    pub logging: LoggingConfig,
}

impl RetraceConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.history.max_depth == Some(0) {
            errors.push("history.max_depth must be > 0 when set".into());
        }
        if self.transport.reply_timeout_ms == 0 {
            errors.push("transport.reply_timeout_ms must be > 0".into());
        }
        if self.logging.filter.trim().is_empty() {
            errors.push("logging.filter must not be empty".into());
        }

        errors
    }

    /// [`validate`](Self::validate), as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Where the [`UndoList`](retrace_core::UndoList) lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// The caller owns the list and calls it directly.
    #[default]
    InProcess,
    /// The list lives on a host thread reached through a channel.
    Threaded,
}

/// Transport parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub mode: TransportMode,

    /// How long a synchronous request (`dirty`) waits for the host.
    pub reply_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            mode: TransportMode::default(),
            reply_timeout_ms: DEFAULT_REPLY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl TransportConfig {
    #[must_use]
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

/// Log output parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
        }
    }
}
