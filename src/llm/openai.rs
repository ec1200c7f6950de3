//! `OpenAI` Responses API provider
//!
//! Uses `v1/responses`, which keeps conversation state server-side and hands
//! back a response id that later calls pass as `previous_response_id`.

use super::types::{
    InputItem, LlmRequest, LlmResponse, ResponseOutput, ToolCall, ToolChoice, Usage,
};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the Responses API
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// `OpenAI` Responses API service implementation
pub struct OpenAIService {
    client: Client,
    api_key: String,
    endpoint: String,
    model_id: String,
}

impl OpenAIService {
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            endpoint: format!("{}/responses", config.base_url.trim_end_matches('/')),
            model_id: config.model,
        })
    }

    fn translate_request<'a>(&'a self, request: &'a LlmRequest) -> ResponsesApiRequest<'a> {
        let tools: Vec<ResponsesApiTool> = request
            .tools
            .iter()
            .map(|t| ResponsesApiTool {
                r#type: "function",
                name: &t.name,
                description: &t.description,
                parameters: &t.input_schema,
            })
            .collect();

        // tool_choice without tools is rejected by the API
        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some(request.tool_choice)
        };

        ResponsesApiRequest {
            model: request.model.as_deref().unwrap_or(&self.model_id),
            input: &request.input,
            previous_response_id: request.previous_response_id.as_deref(),
            tools,
            tool_choice,
        }
    }

    /// Turn the positional `output` array into a tagged response.
    ///
    /// A `function_call` item anywhere in the output wins over text.
    fn normalize_response(resp: ResponsesApiResponse) -> Result<LlmResponse, LlmError> {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for output in resp.output {
            match output.r#type.as_str() {
                "message" => {
                    for item in output.content.unwrap_or_default() {
                        if item.r#type == "output_text" {
                            if let Some(t) = item.text {
                                text.push_str(&t);
                            }
                        }
                    }
                }
                "function_call" => {
                    if let (Some(name), Some(call_id)) = (output.name, output.call_id) {
                        tool_calls.push(ToolCall {
                            call_id,
                            name,
                            arguments: parse_arguments(output.arguments.as_deref()),
                        });
                    }
                }
                "reasoning" => {
                    // Internal model thinking
                }
                other => {
                    tracing::debug!(output_type = %other, "Ignoring unknown output type");
                }
            }
        }

        if tool_calls.len() > 1 {
            tracing::warn!(
                count = tool_calls.len(),
                "Model requested several tool calls; only the first is honored"
            );
        }

        let output = if let Some(call) = tool_calls.into_iter().next() {
            ResponseOutput::ToolCall(call)
        } else if !text.is_empty() {
            ResponseOutput::Text(text)
        } else {
            return Err(LlmError::invalid_response(format!(
                "Response {} contained neither text nor a function call (status: {})",
                resp.id,
                resp.status.as_deref().unwrap_or("unknown")
            )));
        };

        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.input_tokens),
            output_tokens: u64::from(u.output_tokens),
        });

        Ok(LlmResponse {
            id: resp.id,
            output,
            usage,
        })
    }
}

/// Function-call arguments arrive as a JSON string; an absent or blank block
/// means the model supplied none.
fn parse_arguments(raw: Option<&str>) -> Option<serde_json::Value> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, arguments = %raw, "Failed to parse function call arguments");
            None
        }
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = self.translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |err| err.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        let parsed: ResponsesApiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(parsed)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Responses API types

#[derive(Debug, Serialize)]
struct ResponsesApiRequest<'a> {
    model: &'a str,
    input: &'a [InputItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ResponsesApiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct ResponsesApiTool<'a> {
    r#type: &'static str,
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiResponse {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Vec<ResponsesApiOutput>,
    #[serde(default)]
    usage: Option<ResponsesApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiOutput {
    r#type: String,
    /// For message outputs
    #[serde(default)]
    content: Option<Vec<ResponsesApiContent>>,
    /// For `function_call` outputs
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
    #[serde(default)]
    call_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiContent {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
