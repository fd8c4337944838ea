//! Upstream HTTP client for the weather provider.
//!
//! Tool handlers talk to the provider through the [`WeatherApi`] trait so
//! tests can substitute a recording stub. The real [`WeatherClient`] wraps
//! a shared `reqwest` connection pool, safe for use from concurrent tool
//! calls.
//!
//! # Pass-through contract
//!
//! Any response body that decodes as JSON is returned verbatim, including
//! provider error bodies on non-2xx statuses ("city not found" and friends).
//! The server does not interpret upstream semantic errors; only
//! transport-level failures become [`UpstreamError`]s.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::ProviderConfig;

/// Errors from the upstream weather provider.
///
/// Messages deliberately omit the request URL: it carries the API key as a
/// query parameter.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    BuildClient(#[source] reqwest::Error),

    /// The request never produced a response (DNS, connect, timeout...).
    #[error("weather provider request failed")]
    Request(#[source] reqwest::Error),

    /// The provider answered, but the body was not JSON.
    #[error("weather provider returned a non-JSON response (status {status})")]
    InvalidBody {
        /// HTTP status of the unparseable response.
        status: StatusCode,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// Read access to the weather provider.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Fetches one provider endpoint (`"weather"`, `"forecast"`) for a city
    /// and returns the raw JSON body.
    async fn fetch(&self, endpoint: &str, city: &str) -> Result<Value, UpstreamError>;
}

/// HTTP client for the OpenWeather REST API.
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    units: String,
    lang: String,
}

impl WeatherClient {
    /// Creates a client from provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(provider: &ProviderConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("openweather-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(provider.timeout_secs))
            .build()
            .map_err(UpstreamError::BuildClient)?;

        let mut base_url = provider.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            api_key: provider.api_key.clone().unwrap_or_default(),
            units: provider.units.clone(),
            lang: provider.lang.clone(),
        })
    }
}

#[async_trait]
impl WeatherApi for WeatherClient {
    async fn fetch(&self, endpoint: &str, city: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}{endpoint}", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", &self.api_key),
                ("units", &self.units),
                ("lang", &self.lang),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.without_url()))?;

        let status = response.status();
        tracing::debug!(endpoint, %status, "upstream response received");

        // Provider error bodies pass through to the caller untouched.
        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::InvalidBody {
                status,
                source: e.without_url(),
            })
    }
}
