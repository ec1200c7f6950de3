//! Room resolution and continuation lookup

use crate::db::DbError;
use crate::runtime::TranscriptStore;
use uuid::Uuid;

/// Use the supplied room id, or mint a fresh one when it is absent or empty.
///
/// No existence check: rooms are created implicitly by their first message.
pub fn resolve_room(room_id: Option<&str>) -> String {
    match room_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Continuation token the next provider call for this room should carry.
///
/// `None` for rooms with no assistant message yet.
pub async fn latest_continuation_token<S: TranscriptStore + ?Sized>(
    store: &S,
    room_id: &str,
) -> Result<Option<String>, DbError> {
    store.latest_response_id(room_id).await
}
