//! Configuration file loading and parsing.
//!
//! Configuration comes from two sources, merged in order:
//!
//! 1. An optional JSON config file:
//!    - Path specified via `--config` CLI flag, or
//!    - Default location: `~/.openweather-mcp/config.json`
//! 2. Environment variables (`OPENWEATHER_KEY`, `OPENWEATHER_URL`,
//!    `OPENWEATHER_UNITS`, `OPENWEATHER_LANG`), which take precedence.
//!
//! A missing default config file is not an error; the server can run on
//! environment variables alone. An explicitly given `--config` path that
//! does not exist is an error.

mod settings;

pub use settings::{
    Config, LoggingConfig, ProviderConfig, ENV_API_KEY, ENV_BASE_URL, ENV_LANG, ENV_UNITS,
};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory (`~/.openweather-mcp/`).
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".openweather-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration, merges the environment, and validates.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file cannot be found or read
/// - The JSON is malformed
/// - Validation fails (notably: no API key from either source)
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

fn load_config_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => read_config_file(p)?,
        None => match default_config_path() {
            Some(p) if p.exists() => read_config_file(&p)?,
            // Environment-only operation
            _ => Config::default(),
        },
    };

    config.apply_env_from(env);
    config.validate()?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}
