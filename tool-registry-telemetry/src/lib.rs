//! Observability utilities for tool registry hosts.
//!
//! Registration and dispatch emit `tracing` events; this crate installs the
//! subscriber that prints them.

#![warn(missing_docs, clippy::pedantic)]

use thiserror::Error;
use tool_registry_config::TelemetryConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directives could not be parsed.
    #[error("invalid log filter `{filter}`: {source}")]
    InvalidFilter {
        /// Directives as configured.
        filter: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Builds the filter: `RUST_LOG` when set, otherwise the configured directives.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if the configured directives are
/// invalid and `RUST_LOG` is unset.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|source| TelemetryError::InvalidFilter {
        filter: config.filter.clone(),
        source,
    })
}

/// Installs a global fmt subscriber configured from `config`.
///
/// Events go to stderr; stdout belongs to the host's own output.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the filter is invalid or a subscriber is
/// already installed.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config)?)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInitialised(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directives_are_reported() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = TelemetryConfig {
            filter: "tool_registry=notalevel".into(),
            ..TelemetryConfig::default()
        };
        let err = env_filter(&config).expect_err("bad level should fail");
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }

    #[test]
    fn second_init_fails() {
        let config = TelemetryConfig::default();
        let _ = init(&config);
        let err = init(&config).expect_err("global subscriber is already set");
        assert!(matches!(err, TelemetryError::AlreadyInitialised(_)));
    }
}
