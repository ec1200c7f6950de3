//! Common types for completion requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Completion request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Model override; the service's configured model when `None`
    pub model: Option<String>,
    pub input: Vec<InputItem>,
    /// Continuation token from an earlier response
    pub previous_response_id: Option<String>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: ToolChoice,
}

/// Input item sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputItem {
    Message { role: MessageRole, content: String },
    FunctionCallOutput { call_id: String, output: String },
}

impl InputItem {
    pub fn user(content: impl Into<String>) -> Self {
        InputItem::Message {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn function_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        InputItem::FunctionCallOutput {
            call_id: call_id.into(),
            output: output.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
}

/// Whether the model may call the advertised tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    #[default]
    Auto,
    #[allow(dead_code)] // Wire vocabulary; every call currently uses auto
    None,
}

/// Tool definition
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A model-issued request to invoke a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    /// `None` when the model sent no argument block
    pub arguments: Option<Value>,
}

/// What the model produced
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutput {
    Text(String),
    ToolCall(ToolCall),
}

/// Completion response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Fresh continuation token for this exchange
    pub id: String,
    pub output: ResponseOutput,
    pub usage: Usage,
}

impl LlmResponse {
    #[allow(dead_code)] // Used in tests
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            output: ResponseOutput::Text(text.into()),
            usage: Usage::default(),
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn tool_call(
        id: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: Option<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            output: ResponseOutput::ToolCall(ToolCall {
                call_id: call_id.into(),
                name: name.into(),
                arguments,
            }),
            usage: Usage::default(),
        }
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self.output, ResponseOutput::ToolCall(_))
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
