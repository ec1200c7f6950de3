//! Effects produced by state transitions

use crate::llm::{InputItem, ToolCall};

/// Which of the (at most two) completion calls of a turn this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPhase {
    Initial,
    /// Carries the tool output back to the model
    Followup,
}

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append the user's message to the transcript
    PersistUserMessage { text: String },

    /// Call the completion provider
    RequestCompletion {
        phase: CompletionPhase,
        input: Vec<InputItem>,
        previous_response_id: Option<String>,
    },

    /// Invoke a tool through the registry
    ExecuteTool { call: ToolCall },

    /// Append the assistant's answer with its continuation token
    PersistAssistantMessage { text: String, response_id: String },
}

impl Effect {
    pub fn request_completion(
        phase: CompletionPhase,
        input: Vec<InputItem>,
        previous_response_id: Option<String>,
    ) -> Self {
        Effect::RequestCompletion {
            phase,
            input,
            previous_response_id,
        }
    }

    pub fn persist_assistant_message(
        text: impl Into<String>,
        response_id: impl Into<String>,
    ) -> Self {
        Effect::PersistAssistantMessage {
            text: text.into(),
            response_id: response_id.into(),
        }
    }
}
