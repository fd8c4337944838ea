//! Process-wide tool table.
//!
//! Maps tool names to handlers while preserving registration order, which
//! is the order clients see in discovery responses.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::RegistryError;
use crate::mcp::protocol::ToolDescriptor;
use crate::tools::Tool;

/// Registry of available tools. Built at startup, read-only thereafter.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Registers a tool under its descriptor name.
    ///
    /// # Errors
    ///
    /// Returns an error if a tool with the same name is already registered.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.descriptor().name;
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Returns all tool descriptors in registration order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema;

    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: self.0.to_string(),
                description: "a test tool".to_string(),
                input_schema: schema::object(json!({}), &[]),
            }
        }

        async fn execute(&self, _arguments: Value) -> Result<Value> {
            Ok(json!({"tool": self.0}))
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("alpha"))).unwrap();

        assert!(registry.lookup("alpha").is_some());
        assert!(registry.lookup("beta").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("alpha"))).unwrap();
        let err = registry.register(Arc::new(NamedTool("alpha"))).unwrap_err();
        assert!(err.to_string().contains("alpha"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn descriptors_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("zulu"))).unwrap();
        registry.register(Arc::new(NamedTool("alpha"))).unwrap();
        registry.register(Arc::new(NamedTool("mike"))).unwrap();

        let names: Vec<String> = registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.descriptors().is_empty());
    }
}
