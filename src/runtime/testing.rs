//! Mock implementations for testing
//!
//! These mocks enable turn and router tests without real I/O.

use super::traits::*;
use crate::db::{Author, DbError, Message};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, ToolDefinition};
use crate::tools::ToolOutput;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock completion provider that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tool Executor
// ============================================================================

/// Mock tool executor returning a fixed output and recording every call
pub struct MockToolExecutor {
    output: Mutex<ToolOutput>,
    executions: Mutex<Vec<(String, Option<Value>)>>,
}

impl MockToolExecutor {
    pub fn new() -> Self {
        Self {
            output: Mutex::new(ToolOutput::success("[]")),
            executions: Mutex::new(Vec::new()),
        }
    }

    pub fn set_output(&self, output: ToolOutput) {
        *self.output.lock().unwrap() = output;
    }

    /// Tool name and arguments of each execution, in order
    pub fn recorded_executions(&self) -> Vec<(String, Option<Value>)> {
        self.executions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutor for MockToolExecutor {
    async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolOutput {
        self.executions
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        self.output.lock().unwrap().clone()
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: "get_random_cat".to_string(),
            description: "Get random cat images".to_string(),
            input_schema: json!({"type": "object", "properties": {}, "required": []}),
        }]
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// Store whose every operation fails
pub struct FailingStore;

fn store_error() -> DbError {
    DbError::Sqlite(rusqlite::Error::InvalidQuery)
}

#[async_trait]
impl TranscriptStore for FailingStore {
    async fn append_message(
        &self,
        _room_id: &str,
        _send_from: Author,
        _message: &str,
        _response_id: Option<&str>,
    ) -> Result<Message, DbError> {
        Err(store_error())
    }

    async fn latest_response_id(&self, _room_id: &str) -> Result<Option<String>, DbError> {
        Err(store_error())
    }
}
