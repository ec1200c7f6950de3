//! Database schema and types

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    room_id TEXT NOT NULL,
    send_from TEXT NOT NULL,
    message TEXT NOT NULL,
    response_id TEXT,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_room ON messages(room_id, timestamp, id);
";

/// Who authored a transcript entry.
///
/// Stored as `User` / `System`, which is what the web client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    User,
    /// The assistant. Only these messages carry a continuation token.
    System,
}

impl Author {
    pub fn as_str(self) -> &'static str {
        match self {
            Author::User => "User",
            Author::System => "System",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "User" | "user" => Author::User,
            _ => Author::System,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_field_names)] // `message` is the column and JSON key clients read
pub struct Message {
    pub id: i64,
    pub room_id: String,
    pub send_from: Author,
    pub message: String,
    pub response_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Fixed-width RFC 3339 so that lexical order in `SQLite` matches time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_round_trips_through_storage_names() {
        assert_eq!(Author::parse(Author::User.as_str()), Author::User);
        assert_eq!(Author::parse(Author::System.as_str()), Author::System);
        assert_eq!(Author::parse("assistant"), Author::System);
    }

    #[test]
    fn test_timestamps_are_fixed_width() {
        let a = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2024-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let (fa, fb) = (format_timestamp(&a), format_timestamp(&b));
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb);
        assert_eq!(parse_timestamp(&fb), b);
    }

    #[test]
    fn test_message_serializes_with_wire_field_names() {
        let msg = Message {
            id: 7,
            room_id: "room-1".to_string(),
            send_from: Author::System,
            message: "Hello!".to_string(),
            response_id: Some("t1".to_string()),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["room_id"], "room-1");
        assert_eq!(value["send_from"], "System");
        assert_eq!(value["message"], "Hello!");
        assert_eq!(value["response_id"], "t1");
        assert!(value["timestamp"].is_string());
    }
}
