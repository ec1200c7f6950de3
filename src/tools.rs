//! Tools the model may call during a turn

mod cat;

pub use cat::{CatApiClient, CatApiConfig, CatTool};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::llm::ToolDefinition;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    /// Payload folded into the follow-up completion
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Trait for tools the model can invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool. `None` means the model sent no argument block.
    async fn run(&self, arguments: Option<Value>) -> ToolOutput;
}

/// Collection of tools advertised to the model
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Registry with the cat lookup tool only
    pub fn standard(cats: CatApiClient) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(CatTool::new(cats))];
        Self::new(tools)
    }

    /// Get all tool definitions for LLM
    pub fn describe(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name. Unknown names produce an error output.
    pub async fn invoke(&self, name: &str, arguments: Option<Value>) -> ToolOutput {
        if let Some(tool) = self.tools.iter().find(|t| t.name() == name) {
            tool.run(arguments).await
        } else {
            tracing::warn!(tool = %name, "Model requested unknown tool");
            ToolOutput::error(format!("Unknown tool: {name}"))
        }
    }
}
