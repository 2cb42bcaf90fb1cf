//! Configuration loader implementations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::schema::AppConfig;

/// File looked up in the working directory by [`load_or_default`].
pub const DEFAULT_CONFIG_FILE: &str = "toolbox.toml";

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file `{}`: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The document is not valid TOML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read and
/// [`ConfigError::Parse`] if it cannot be parsed.
pub fn load(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = AppConfig::from_toml_str(&text)?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Loads `path` if given, else [`DEFAULT_CONFIG_FILE`] if it exists, else defaults.
///
/// # Errors
///
/// Returns an error if an explicitly given file is missing, or if any file
/// that exists cannot be parsed.
pub fn load_or_default(path: Option<&Path>) -> ConfigResult<AppConfig> {
    if let Some(path) = path {
        return load(path);
    }

    let local = Path::new(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return load(local);
    }

    debug!("no configuration file found, using defaults");
    Ok(AppConfig::default())
}
