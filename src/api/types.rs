//! API request and response types

use crate::runtime::TurnReply;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Checked by the handler so a missing field is a 400, not a rejection
    #[serde(default)]
    pub user_input: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: TurnReply,
    /// The room the turn ran in, minted when the request carried none
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomsResponse {
    pub rooms: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
