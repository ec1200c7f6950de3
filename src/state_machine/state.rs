//! Turn states

/// Where a single user turn currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TurnState {
    /// Nothing has happened yet
    #[default]
    Start,

    /// User message persisted, first completion in flight
    AwaitingFirstCompletion { user_text: String },

    /// The model asked for a tool; waiting for its output
    AwaitingToolResult {
        user_text: String,
        call_id: String,
        /// Id of the response that requested the tool
        response_id: String,
    },

    /// Tool output sent back, follow-up completion in flight
    AwaitingFollowupCompletion { call_id: String },

    /// Final answer produced and persisted
    Done {
        message: String,
        response_id: String,
    },
}

impl TurnState {
    pub fn name(&self) -> &'static str {
        match self {
            TurnState::Start => "start",
            TurnState::AwaitingFirstCompletion { .. } => "awaiting_first_completion",
            TurnState::AwaitingToolResult { .. } => "awaiting_tool_result",
            TurnState::AwaitingFollowupCompletion { .. } => "awaiting_followup_completion",
            TurnState::Done { .. } => "done",
        }
    }
}
