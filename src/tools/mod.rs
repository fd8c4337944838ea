//! Tool definitions and the registry they live in.
//!
//! A tool couples a [`ToolDescriptor`] (name, description, input schema)
//! with an async handler. Registration happens exactly once at startup via
//! [`build_registry`]; the registry is immutable afterwards and shared
//! behind an `Arc` across concurrent tool calls.

pub mod registry;
pub mod schema;
pub mod weather;

pub use registry::ToolRegistry;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::RegistryError;
use crate::mcp::protocol::ToolDescriptor;
use crate::upstream::WeatherApi;

/// A named, schema-described unit of functionality exposed to clients.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the descriptor advertised during discovery.
    fn descriptor(&self) -> ToolDescriptor;

    /// Executes the tool with already-validated arguments.
    ///
    /// The returned value becomes the tool result content verbatim. An
    /// `Err` marks the invocation as failed; it never escapes the
    /// dispatcher.
    async fn execute(&self, arguments: Value) -> Result<Value>;
}

/// Builds the registry for this deployment: the two weather tools.
///
/// # Errors
///
/// Returns an error on duplicate tool names, which is a programming
/// mistake the process should not survive.
pub fn build_registry(api: Arc<dyn WeatherApi>) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(weather::CurrentTemperatureTool::new(Arc::clone(
        &api,
    ))))?;
    registry.register(Arc::new(weather::WeatherForecastTool::new(api)))?;
    Ok(registry)
}
