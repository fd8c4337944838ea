//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Environment variables are merged on top after parsing, so a bare
//! environment-only deployment works without any file on disk.

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the OpenWeather API key.
pub const ENV_API_KEY: &str = "OPENWEATHER_KEY";
/// Environment variable overriding the provider base URL.
pub const ENV_BASE_URL: &str = "OPENWEATHER_URL";
/// Environment variable overriding the unit system.
pub const ENV_UNITS: &str = "OPENWEATHER_UNITS";
/// Environment variable overriding the response language.
pub const ENV_LANG: &str = "OPENWEATHER_LANG";

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Weather provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            _schema: None,
            _comment: None,
            provider: ProviderConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Merges environment variables over the file-based settings.
    ///
    /// The environment wins wherever both are present; empty variables are
    /// treated as unset. The lookup is injected so tests stay independent
    /// of the ambient process environment.
    pub fn apply_env_from(&mut self, env: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.provider.api_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.provider.base_url = url;
        }
        if let Some(units) = non_empty(ENV_UNITS) {
            self.provider.units = units;
        }
        if let Some(lang) = non_empty(ENV_LANG) {
            self.provider.lang = lang;
        }
    }

    /// Validates the configuration.
    ///
    /// The API key is required here rather than at first use: a missing key
    /// is a deployment mistake better reported at startup than as a tool
    /// failure an hour later.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .provider
            .api_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "missing OpenWeather API key: set {ENV_API_KEY} or provider.api_key"
                ),
            });
        }

        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "provider.base_url must be an http(s) URL, got '{}'",
                    self.provider.base_url
                ),
            });
        }

        let valid_units = ["standard", "metric", "imperial"];
        if !valid_units.contains(&self.provider.units.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "invalid units '{}'. Must be one of: standard, metric, imperial",
                    self.provider.units
                ),
            });
        }

        Ok(())
    }
}

/// Weather provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// OpenWeather API key. Usually supplied via the environment instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the provider REST API, with trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unit system: "standard", "metric" or "imperial".
    #[serde(default = "default_units")]
    pub units: String,

    /// Response language code passed to the provider.
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            units: default_units(),
            lang: default_lang(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_lang() -> String {
    "pt_br".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
