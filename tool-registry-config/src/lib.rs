//! Configuration management for tool registry hosts.
//!
//! Settings are read from TOML. Every section is optional and falls back to
//! its defaults; unknown keys are rejected so typos surface at startup.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigResult, DEFAULT_CONFIG_FILE, load, load_or_default};
pub use schema::{AppConfig, RegistryConfig, TelemetryConfig};
