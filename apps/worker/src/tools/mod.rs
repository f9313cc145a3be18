//! Discovery tools run by the executor, one per pipeline step.

mod dns;
mod subfinder;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use dns::DnsResolveTool;
pub use subfinder::SubfinderTool;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool not implemented: {0}")]
    NotImplemented(String),
    #[error("{tool} failed: {message}")]
    Execution { tool: String, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input handed to a tool.
#[derive(Debug, Clone, Default)]
pub struct ToolInput {
    /// Seed targets plus every host found by earlier tools of the run.
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub summary: Value,
    pub result: Vec<Value>,
    /// Hostnames or addresses worth keeping as assets.
    pub hosts: Vec<String>,
}

#[async_trait]
pub trait DiscoveryTool: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, input: &ToolInput) -> Result<ToolOutput, ToolError>;
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn DiscoveryTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in tools. External binaries are looked up in
    /// `bin_path` when given, otherwise on `PATH`.
    pub fn with_defaults(bin_path: Option<&Path>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SubfinderTool::new(bin_path)));
        registry.register(Arc::new(DnsResolveTool::new("basic_dns")));
        registry.register(Arc::new(DnsResolveTool::new("ip_resolve")));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn DiscoveryTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn DiscoveryTool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotImplemented(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_light_domain_pipeline() {
        let registry = ToolRegistry::with_defaults(None);
        assert!(registry.get("subfinder").is_ok());
        assert!(registry.get("basic_dns").is_ok());
        assert!(registry.get("ip_resolve").is_ok());
    }

    #[test]
    fn unknown_tool_is_not_implemented() {
        let registry = ToolRegistry::with_defaults(None);
        let err = registry.get("amass_active").err().unwrap();
        assert_eq!(err.to_string(), "tool not implemented: amass_active");
    }
}
