//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::db::{Author, Database, DbError, Message};
use crate::llm::ToolDefinition;
use crate::tools::{ToolOutput, ToolRegistry};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Append-only storage for room transcripts
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append a message to a room
    async fn append_message(
        &self,
        room_id: &str,
        send_from: Author,
        message: &str,
        response_id: Option<&str>,
    ) -> Result<Message, DbError>;

    /// Continuation token of the room's most recent assistant message
    async fn latest_response_id(&self, room_id: &str) -> Result<Option<String>, DbError>;
}

/// Executor for tools
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool by name
    async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolOutput;

    /// Get tool definitions for LLM
    fn definitions(&self) -> Vec<ToolDefinition>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TranscriptStore + ?Sized> TranscriptStore for Arc<T> {
    async fn append_message(
        &self,
        room_id: &str,
        send_from: Author,
        message: &str,
        response_id: Option<&str>,
    ) -> Result<Message, DbError> {
        (**self)
            .append_message(room_id, send_from, message, response_id)
            .await
    }

    async fn latest_response_id(&self, room_id: &str) -> Result<Option<String>, DbError> {
        (**self).latest_response_id(room_id).await
    }
}

#[async_trait]
impl<T: ToolExecutor + ?Sized> ToolExecutor for Arc<T> {
    async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolOutput {
        (**self).execute(name, arguments).await
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        (**self).definitions()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl TranscriptStore for Database {
    async fn append_message(
        &self,
        room_id: &str,
        send_from: Author,
        message: &str,
        response_id: Option<&str>,
    ) -> Result<Message, DbError> {
        Database::append_message(self, room_id, send_from, message, response_id)
    }

    async fn latest_response_id(&self, room_id: &str) -> Result<Option<String>, DbError> {
        Database::latest_response_id(self, room_id)
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolOutput {
        self.invoke(name, arguments).await
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.describe()
    }
}
