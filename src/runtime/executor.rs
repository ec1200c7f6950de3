//! Turn executor

use super::traits::{ToolExecutor, TranscriptStore};
use crate::db::{Author, DbError};
use crate::llm::{LlmError, LlmRequest, LlmService, ToolChoice};
use crate::state_machine::{
    transition, CompletionPhase, Effect, TransitionError, TurnEvent, TurnState,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;
use thiserror::Error;

/// Final answer of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReply {
    pub message: String,
    pub response_id: String,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Store(#[from] DbError),
    #[error("Completion provider failed: {0}")]
    Provider(#[from] LlmError),
    #[error(transparent)]
    Protocol(#[from] TransitionError),
    #[error("Turn stopped in state {0}")]
    Incomplete(&'static str),
}

/// Runs one user turn to completion against any store, provider and tool
/// implementations
pub struct TurnRunner<S, L, T> {
    store: S,
    llm: L,
    tools: T,
    /// Model for the call that carries the tool output back; the provider's
    /// default when `None`
    followup_model: Option<String>,
}

impl<S, L, T> TurnRunner<S, L, T>
where
    S: TranscriptStore,
    L: LlmService,
    T: ToolExecutor,
{
    pub fn new(store: S, llm: L, tools: T) -> Self {
        Self {
            store,
            llm,
            tools,
            followup_model: None,
        }
    }

    pub fn with_followup_model(mut self, model: Option<String>) -> Self {
        self.followup_model = model;
        self
    }

    #[allow(dead_code)] // Used in tests
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute a user turn.
    ///
    /// Effects run strictly in order. On any error the turn stops; messages
    /// already appended stay in the transcript.
    pub async fn run_turn(
        &self,
        room_id: &str,
        text: &str,
        previous_response_id: Option<String>,
    ) -> Result<TurnReply, TurnError> {
        let start = Instant::now();
        tracing::info!(
            room_id = %room_id,
            continuation = previous_response_id.is_some(),
            "Turn started"
        );

        let mut state = TurnState::Start;
        let mut pending = VecDeque::from([TurnEvent::UserMessage {
            text: text.to_string(),
            previous_response_id,
        }]);

        while let Some(event) = pending.pop_front() {
            let result = transition(&state, event).map_err(|e| {
                tracing::error!(
                    room_id = %room_id,
                    state = state.name(),
                    error = %e,
                    "Turn protocol violation"
                );
                e
            })?;
            tracing::debug!(
                room_id = %room_id,
                from = state.name(),
                to = result.new_state.name(),
                "Turn transition"
            );
            state = result.new_state;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(room_id, effect).await? {
                    pending.push_back(next);
                }
            }
        }

        match state {
            TurnState::Done {
                message,
                response_id,
            } => {
                tracing::info!(
                    room_id = %room_id,
                    response_id = %response_id,
                    duration_ms = %start.elapsed().as_millis(),
                    "Turn completed"
                );
                Ok(TurnReply {
                    message,
                    response_id,
                })
            }
            other => Err(TurnError::Incomplete(other.name())),
        }
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(
        &self,
        room_id: &str,
        effect: Effect,
    ) -> Result<Option<TurnEvent>, TurnError> {
        match effect {
            Effect::PersistUserMessage { text } => {
                self.store
                    .append_message(room_id, Author::User, &text, None)
                    .await?;
                Ok(None)
            }

            Effect::RequestCompletion {
                phase,
                input,
                previous_response_id,
            } => {
                let model = match phase {
                    CompletionPhase::Initial => None,
                    CompletionPhase::Followup => self.followup_model.clone(),
                };
                let request = LlmRequest {
                    model,
                    input,
                    previous_response_id,
                    tools: self.tools.definitions(),
                    tool_choice: ToolChoice::Auto,
                };

                let response = self.llm.complete(&request).await.map_err(|e| {
                    tracing::warn!(
                        room_id = %room_id,
                        phase = ?phase,
                        error = %e,
                        "Completion failed"
                    );
                    e
                })?;
                Ok(Some(TurnEvent::CompletionReceived { response }))
            }

            Effect::ExecuteTool { call } => {
                let start = Instant::now();
                let output = self.tools.execute(&call.name, call.arguments).await;
                tracing::info!(
                    room_id = %room_id,
                    call_id = %call.call_id,
                    tool = %call.name,
                    success = output.success,
                    duration_ms = %start.elapsed().as_millis(),
                    "Tool executed"
                );
                Ok(Some(TurnEvent::ToolFinished {
                    call_id: call.call_id,
                    output,
                }))
            }

            Effect::PersistAssistantMessage { text, response_id } => {
                self.store
                    .append_message(room_id, Author::System, &text, Some(&response_id))
                    .await?;
                Ok(None)
            }
        }
    }
}
