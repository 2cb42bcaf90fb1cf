//! Strongly typed configuration schemas.

use serde::{Deserialize, Serialize};
use tool_registry::DuplicatePolicy;

use crate::loader::ConfigResult;

/// Top-level configuration document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Registry behaviour.
    pub registry: RegistryConfig,
    /// Logging output.
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::Parse`] if the text is not valid TOML
    /// or does not match the schema.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Registry settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Whether a repeated tool name replaces or fails.
    pub duplicate_policy: DuplicatePolicy,
}

/// Tracing subscriber settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Include the event target in each line.
    pub with_target: bool,
    /// Emit ANSI colour codes.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            with_target: false,
            ansi: true,
        }
    }
}
