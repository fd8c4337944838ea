//! The weather tools exposed by this deployment.
//!
//! Both tools take a single required `city` argument and pass the
//! provider's JSON response through verbatim. Units and language are fixed
//! by server configuration, not by the caller.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::mcp::protocol::ToolDescriptor;
use crate::tools::{schema, Tool};
use crate::upstream::WeatherApi;

/// Arguments shared by both weather tools.
#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
}

/// Current weather conditions for a city (`weather` endpoint).
pub struct CurrentTemperatureTool {
    api: Arc<dyn WeatherApi>,
}

impl CurrentTemperatureTool {
    /// Creates the tool over the given upstream client.
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for CurrentTemperatureTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_current_temperature".to_string(),
            description: "Get current weather temperature and conditions for a specific city"
                .to_string(),
            input_schema: schema::object(
                json!({
                    "city": schema::string("Name of the city to look up"),
                }),
                &["city"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<Value> {
        let args: CityArgs = serde_json::from_value(arguments)?;
        Ok(self.api.fetch("weather", &args.city).await?)
    }
}

/// 5-day forecast in 3-hour intervals for a city (`forecast` endpoint).
pub struct WeatherForecastTool {
    api: Arc<dyn WeatherApi>,
}

impl WeatherForecastTool {
    /// Creates the tool over the given upstream client.
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for WeatherForecastTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_weather_forecast".to_string(),
            description: "Get 5-day weather forecast with 3-hour intervals for a specific city"
                .to_string(),
            input_schema: schema::object(
                json!({
                    "city": schema::string("Name of the city to look up"),
                }),
                &["city"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<Value> {
        let args: CityArgs = serde_json::from_value(arguments)?;
        Ok(self.api.fetch("forecast", &args.city).await?)
    }
}
