//! Tool call dispatch.
//!
//! The dispatcher turns a decoded `tools/call` request into a
//! [`ToolCallResult`], fail-closed at every step: unknown tool names,
//! schema violations, handler errors, and handler panics all become
//! `isError` results. A tool call can never take the session down with it.

use std::sync::Arc;

use serde_json::Value;

use crate::mcp::protocol::{ToolCallParams, ToolCallResult};
use crate::tools::{schema, ToolRegistry};

/// Validates and executes tool calls against the registry.
///
/// Cheap to clone; every in-flight call carries its own handle.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over a started registry.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry backing this dispatcher.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handles one tool call from lookup through result wrapping.
    ///
    /// Each call is independent; no call observes another call's state.
    pub async fn handle_call(&self, params: ToolCallParams) -> ToolCallResult {
        let Some(tool) = self.registry.lookup(&params.name) else {
            return ToolCallResult::error(format!("tool not found: {}", params.name));
        };

        let descriptor = tool.descriptor();
        if let Err(violation) = schema::validate_arguments(&descriptor.input_schema, &params.arguments)
        {
            tracing::debug!(tool = %params.name, %violation, "rejecting tool call arguments");
            return ToolCallResult::error(format!(
                "invalid arguments for {}: {violation}",
                params.name
            ));
        }

        Self::invoke(tool, params.name, params.arguments).await
    }

    /// Runs the handler in its own task so a panic is contained there.
    ///
    /// The guard ties the handler's lifetime to this future: when the
    /// session closes and cancels the call, the handler (and any upstream
    /// request it is awaiting) is aborted rather than left running.
    async fn invoke(
        tool: Arc<dyn crate::tools::Tool>,
        name: String,
        arguments: Value,
    ) -> ToolCallResult {
        let handle = tokio::spawn(async move { tool.execute(arguments).await });
        let _guard = AbortOnDrop(handle.abort_handle());

        match handle.await {
            Ok(Ok(payload)) => ToolCallResult::success(payload),
            Ok(Err(e)) => {
                tracing::warn!(tool = %name, error = %e, "tool execution failed");
                ToolCallResult::error(format!("tool execution failed: {e}"))
            }
            Err(e) => {
                tracing::error!(tool = %name, error = %e, "tool handler aborted");
                ToolCallResult::error(format!("tool {name} failed unexpectedly"))
            }
        }
    }
}

/// Aborts the wrapped task when dropped before completion.
struct AbortOnDrop(tokio::task::AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        // No-op on a task that already finished.
        self.0.abort();
    }
}
