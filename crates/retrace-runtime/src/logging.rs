#![forbid(unsafe_code)]

//! Global tracing subscriber setup.
//!
//! History code logs through `tracing` under the `retrace.history`,
//! `retrace.command` and `retrace.host` targets. Hosts that already install
//! their own subscriber can skip this module entirely.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::LoggingError;

/// Parse an `EnvFilter` directive string.
pub fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|err| LoggingError::Filter {
        filter: directive.to_owned(),
        message: err.to_string(),
    })
}

/// Filter for `config`, preferring `RUST_LOG` when it is set and valid.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(&config.filter),
    }
}

/// Install a global `fmt` subscriber configured by `config`.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| LoggingError::AlreadyInstalled(err.to_string()))?;

    tracing::debug!(target: "retrace.host", json = config.json, "tracing installed");
    Ok(())
}
