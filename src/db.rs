//! Transcript store
//!
//! Append-only persistence of room messages in `SQLite`.

mod schema;

pub use schema::*;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Append a message to a room.
    ///
    /// Each append is a single INSERT, so it is atomic on its own.
    pub fn append_message(
        &self,
        room_id: &str,
        send_from: Author,
        message: &str,
        response_id: Option<&str>,
    ) -> DbResult<Message> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO messages (room_id, send_from, message, response_id, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                room_id,
                send_from.as_str(),
                message,
                response_id,
                format_timestamp(&now),
            ],
        )?;

        Ok(Message {
            id: conn.last_insert_rowid(),
            room_id: room_id.to_string(),
            send_from,
            message: message.to_string(),
            response_id: response_id.map(String::from),
            timestamp: now,
        })
    }

    /// Distinct room ids, most recently active first
    pub fn list_rooms(&self) -> DbResult<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT room_id FROM messages
             GROUP BY room_id
             ORDER BY MAX(timestamp) DESC, MAX(id) DESC",
        )?;

        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Continuation token of the most recent assistant message in a room
    pub fn latest_response_id(&self, room_id: &str) -> DbResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT response_id FROM messages
             WHERE room_id = ?1 AND send_from = ?2 AND response_id IS NOT NULL
             ORDER BY timestamp DESC, id DESC
             LIMIT 1",
            params![room_id, Author::System.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(DbError::from)
    }

    /// Get all messages for a room in chronological order
    pub fn get_messages(&self, room_id: &str) -> DbResult<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, room_id, send_from, message, response_id, timestamp
             FROM messages WHERE room_id = ?1 ORDER BY timestamp ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![room_id], parse_message_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

/// Parse a message row from the database
fn parse_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        room_id: row.get(1)?,
        send_from: Author::parse(&row.get::<_, String>(2)?),
        message: row.get(3)?,
        response_id: row.get(4)?,
        timestamp: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_append_and_get_messages() {
        let db = Database::open_in_memory().unwrap();

        let m1 = db.append_message("room-1", Author::User, "hi", None).unwrap();
        let m2 = db
            .append_message("room-1", Author::System, "Hello!", Some("t1"))
            .unwrap();

        assert!(m2.id > m1.id);

        let messages = db.get_messages("room-1").unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].send_from, Author::User);
        assert_eq!(messages[0].message, "hi");
        assert_eq!(messages[0].response_id, None);
        assert_eq!(messages[1].send_from, Author::System);
        assert_eq!(messages[1].response_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_get_messages_unknown_room_is_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_messages("nope").unwrap().is_empty());
    }

    #[test]
    fn test_rooms_are_isolated() {
        let db = Database::open_in_memory().unwrap();
        db.append_message("a", Author::User, "one", None).unwrap();
        db.append_message("b", Author::User, "two", None).unwrap();

        let a = db.get_messages("a").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].message, "one");
    }

    #[test]
    fn test_latest_response_id() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.latest_response_id("room-1").unwrap(), None);

        db.append_message("room-1", Author::User, "hi", None).unwrap();
        assert_eq!(db.latest_response_id("room-1").unwrap(), None);

        db.append_message("room-1", Author::System, "Hello!", Some("t1"))
            .unwrap();
        db.append_message("room-1", Author::User, "again", None).unwrap();
        assert_eq!(db.latest_response_id("room-1").unwrap().as_deref(), Some("t1"));

        db.append_message("room-1", Author::System, "Hi again", Some("t2"))
            .unwrap();
        assert_eq!(db.latest_response_id("room-1").unwrap().as_deref(), Some("t2"));

        // Other rooms are unaffected
        assert_eq!(db.latest_response_id("room-2").unwrap(), None);
    }

    #[test]
    fn test_list_rooms_most_recent_first() {
        let db = Database::open_in_memory().unwrap();
        db.append_message("old", Author::User, "1", None).unwrap();
        db.append_message("new", Author::User, "2", None).unwrap();
        db.append_message("old", Author::System, "3", Some("t")).unwrap();
        db.append_message("newest", Author::User, "4", None).unwrap();

        assert_eq!(db.list_rooms().unwrap(), vec!["newest", "old", "new"]);
    }

    #[test]
    fn test_reopen_preserves_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_history.db");

        {
            let db = Database::open(&path).unwrap();
            db.append_message("room-1", Author::User, "hi", None).unwrap();
            db.append_message("room-1", Author::System, "Hello!", Some("t1"))
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_messages("room-1").unwrap().len(), 2);
        assert_eq!(db.latest_response_id("room-1").unwrap().as_deref(), Some("t1"));

        // Ids keep increasing across reopen
        let next = db.append_message("room-1", Author::User, "more", None).unwrap();
        assert_eq!(next.id, 3);
    }

    fn arb_append() -> impl Strategy<Value = (usize, bool, String)> {
        (0..3usize, any::<bool>(), "[a-z ]{0,12}")
    }

    proptest! {
        #[test]
        fn prop_transcript_is_append_only(appends in prop::collection::vec(arb_append(), 1..30)) {
            let db = Database::open_in_memory().unwrap();
            let rooms = ["r0", "r1", "r2"];
            let mut snapshots: Vec<Vec<Message>> = vec![Vec::new(); rooms.len()];

            for (i, (room, assistant, body)) in appends.into_iter().enumerate() {
                let (author, token) = if assistant {
                    (Author::System, Some(format!("t{i}")))
                } else {
                    (Author::User, None)
                };
                db.append_message(rooms[room], author, &body, token.as_deref()).unwrap();

                for (idx, name) in rooms.iter().enumerate() {
                    let current = db.get_messages(name).unwrap();

                    // Strictly increasing ids
                    for pair in current.windows(2) {
                        prop_assert!(pair[0].id < pair[1].id);
                        prop_assert!(pair[0].timestamp <= pair[1].timestamp);
                    }

                    // Earlier entries are untouched
                    prop_assert!(current.len() >= snapshots[idx].len());
                    prop_assert_eq!(&current[..snapshots[idx].len()], &snapshots[idx][..]);
                    snapshots[idx] = current;
                }
            }
        }
    }
}
