//! Pure state transition function

use super::{CompletionPhase, Effect, TurnEvent, TurnState};
use crate::llm::{InputItem, ResponseOutput};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// Only one tool round-trip is allowed per turn
    #[error("Model requested tool {name} (call {call_id}) after the result for {answered}")]
    UnexpectedToolCall {
        call_id: String,
        name: String,
        /// Call whose result the follow-up request carried
        answered: String,
    },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &TurnState,
    event: TurnEvent,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // The user message is persisted before any network call
        (
            TurnState::Start,
            TurnEvent::UserMessage {
                text,
                previous_response_id,
            },
        ) => Ok(TransitionResult::new(TurnState::AwaitingFirstCompletion {
            user_text: text.clone(),
        })
        .with_effect(Effect::PersistUserMessage { text: text.clone() })
        .with_effect(Effect::request_completion(
            CompletionPhase::Initial,
            vec![InputItem::user(text)],
            previous_response_id,
        ))),

        (
            TurnState::AwaitingFirstCompletion { user_text },
            TurnEvent::CompletionReceived { response },
        ) => match response.output {
            ResponseOutput::Text(message) => Ok(finish(message, response.id)),
            ResponseOutput::ToolCall(call) => Ok(TransitionResult::new(
                TurnState::AwaitingToolResult {
                    user_text: user_text.clone(),
                    call_id: call.call_id.clone(),
                    response_id: response.id,
                },
            )
            .with_effect(Effect::ExecuteTool { call })),
        },

        (
            TurnState::AwaitingToolResult {
                user_text,
                call_id,
                response_id,
            },
            TurnEvent::ToolFinished {
                call_id: finished_id,
                output,
            },
        ) => {
            if finished_id != *call_id {
                return Err(TransitionError::InvalidTransition(format!(
                    "tool result for {finished_id} while awaiting {call_id}"
                )));
            }

            let input = vec![
                InputItem::user(user_text.clone()),
                InputItem::function_output(call_id.clone(), output.output),
            ];
            Ok(TransitionResult::new(TurnState::AwaitingFollowupCompletion {
                call_id: call_id.clone(),
            })
            .with_effect(Effect::request_completion(
                CompletionPhase::Followup,
                input,
                Some(response_id.clone()),
            )))
        }

        (
            TurnState::AwaitingFollowupCompletion { call_id: answered },
            TurnEvent::CompletionReceived { response },
        ) => match response.output {
            ResponseOutput::Text(message) => Ok(finish(message, response.id)),
            ResponseOutput::ToolCall(call) => Err(TransitionError::UnexpectedToolCall {
                call_id: call.call_id,
                name: call.name,
                answered: answered.clone(),
            }),
        },

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} cannot handle {}",
            state.name(),
            event.name()
        ))),
    }
}

fn finish(message: String, response_id: String) -> TransitionResult {
    TransitionResult::new(TurnState::Done {
        message: message.clone(),
        response_id: response_id.clone(),
    })
    .with_effect(Effect::persist_assistant_message(message, response_id))
}
