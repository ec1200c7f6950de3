//! Events that drive turn state transitions

use crate::llm::LlmResponse;
use crate::tools::ToolOutput;

#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// A user message arrived for the room
    UserMessage {
        text: String,
        /// Continuation token of the room's last assistant message
        previous_response_id: Option<String>,
    },

    /// The provider answered a completion request
    CompletionReceived { response: LlmResponse },

    /// A tool invocation finished
    ToolFinished { call_id: String, output: ToolOutput },
}

impl TurnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::UserMessage { .. } => "user_message",
            TurnEvent::CompletionReceived { .. } => "completion_received",
            TurnEvent::ToolFinished { .. } => "tool_finished",
        }
    }
}
