// ABOUTME: Dispatch table from tool name to handler, built once at startup
// ABOUTME: Serves lookups for tools/call and descriptors for tools/list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::implementations::{EchoTool, LongRunningTool};
use super::traits::ToolHandler;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Central registry for tools
///
/// Built at startup and then only read, so it needs no interior locking.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `echo` and `long_running` tools
    #[must_use]
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(LongRunningTool));
        info!(count = registry.len(), "Registered built-in tools");
        registry
    }

    /// Register a tool
    ///
    /// # Returns
    ///
    /// `true` if the tool was registered, `false` if a tool with the same name exists
    pub fn register(&mut self, tool: Arc<dyn ToolHandler>) -> bool {
        let name = tool.name().to_owned();
        if self.tools.contains_key(&name) {
            warn!(tool = %name, "Tool already registered, skipping");
            return false;
        }
        self.tools.insert(name, tool);
        true
    }

    /// Builder-style registration
    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn ToolHandler>) -> Self {
        self.register(tool);
        self
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    /// Get the number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool descriptors sorted by name
    #[must_use]
    pub fn list(&self) -> Vec<Value> {
        let mut tools: Vec<&Arc<dyn ToolHandler>> = self.tools.values().collect();
        tools.sort_by_key(|tool| tool.name());
        tools.into_iter().map(|tool| tool.descriptor()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tools_listed_in_order() {
        let registry = ToolRegistry::with_builtin_tools();

        let names: Vec<String> = registry
            .list()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap().to_owned())
            .collect();

        assert_eq!(names, vec!["echo", "long_running"]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();

        assert!(registry.register(Arc::new(EchoTool)));
        assert!(!registry.register(Arc::new(EchoTool)));
        assert_eq!(registry.len(), 1);
    }
}
