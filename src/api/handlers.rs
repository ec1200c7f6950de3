//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, RoomsResponse, VersionResponse};
use super::AppState;
use crate::db::{DbError, Message};
use crate::runtime::TurnError;
use crate::session::{latest_continuation_token, resolve_room};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(send_chat))
        .route("/api/rooms", get(list_rooms))
        .route("/api/history/:room_id", get(get_history))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let user_input = req
        .user_input
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("user_input is required".to_string()))?;

    let room_id = resolve_room(req.room_id.as_deref());
    let previous = latest_continuation_token(&state.db, &room_id).await?;

    let reply = tokio::time::timeout(
        state.turn_timeout,
        state.runner.run_turn(&room_id, &user_input, previous),
    )
    .await
    .map_err(|_| {
        tracing::warn!(
            room_id = %room_id,
            timeout_secs = state.turn_timeout.as_secs(),
            "Turn timed out"
        );
        AppError::Timeout(format!(
            "Turn did not finish within {}s",
            state.turn_timeout.as_secs()
        ))
    })??;

    Ok(Json(ChatResponse { reply, room_id }))
}

// ============================================================
// Transcript
// ============================================================

async fn list_rooms(State(state): State<AppState>) -> Result<Json<RoomsResponse>, AppError> {
    let rooms = state.db.list_rooms()?;
    Ok(Json(RoomsResponse { rooms }))
}

async fn get_history(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(state.db.get_messages(&room_id)?))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
    /// The completion provider failed
    BadGateway(String),
    Timeout(String),
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        tracing::error!(error = %e, "Store failure");
        AppError::Internal(e.to_string())
    }
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        match e {
            TurnError::Provider(err) => AppError::BadGateway(err.to_string()),
            TurnError::Store(err) => AppError::from(err),
            other @ (TurnError::Protocol(_) | TurnError::Incomplete(_)) => {
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
