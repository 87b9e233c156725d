//! Message repository.
//!
//! Lookups are scoped to a room so a message id from one room never resolves
//! through another room's URL.

use agora_core::{MessageId, RoomId};
use chrono::Utc;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::database::Database;
use crate::error::StoreError;

/// A message as returned over the HTTP API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRow {
    /// Message id.
    #[serde(rename = "ID")]
    pub id: MessageId,
    /// Owning room.
    #[serde(rename = "RoomID")]
    pub room_id: RoomId,
    /// Message text.
    #[serde(rename = "Message")]
    pub message: String,
    /// Current reaction count, never negative.
    #[serde(rename = "ReactionCount")]
    pub reaction_count: i64,
    /// Whether the message was marked answered.
    #[serde(rename = "Answered")]
    pub answered: bool,
}

const SELECT_COLUMNS: &str = "SELECT id, room_id, message, reaction_count, answered FROM messages";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: MessageId::from_raw(row.get::<_, String>(0)?),
        room_id: RoomId::from_raw(row.get::<_, String>(1)?),
        message: row.get(2)?,
        reaction_count: row.get(3)?,
        answered: row.get(4)?,
    })
}

/// Message persistence.
#[derive(Clone, Debug)]
pub struct MessageRepo {
    db: Database,
}

impl MessageRepo {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a message into a room and return its fresh id.
    #[instrument(skip(self, text), fields(room_id = %room_id))]
    pub fn create(&self, room_id: &RoomId, text: &str) -> Result<MessageId, StoreError> {
        let id = MessageId::new();
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO messages (id, room_id, message, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id.as_str(), room_id.as_str(), text, now],
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    /// Fetch a message that belongs to `room_id`.
    #[instrument(skip(self), fields(room_id = %room_id, message_id = %id))]
    pub fn get(&self, room_id: &RoomId, id: &MessageId) -> Result<MessageRow, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1 AND room_id = ?2"),
                [id.as_str(), room_id.as_str()],
                map_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("message {id}")))
        })
    }

    /// Messages of one room in creation order.
    #[instrument(skip(self), fields(room_id = %room_id))]
    pub fn list_for_room(&self, room_id: &RoomId) -> Result<Vec<MessageRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE room_id = ?1 ORDER BY created_at, rowid"
            ))?;
            let rows = stmt
                .query_map([room_id.as_str()], map_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Add one reaction and return the new count.
    #[instrument(skip(self), fields(message_id = %id))]
    pub fn react(&self, id: &MessageId) -> Result<i64, StoreError> {
        self.update_count(
            id,
            "UPDATE messages SET reaction_count = reaction_count + 1 \
             WHERE id = ?1 RETURNING reaction_count",
        )
    }

    /// Remove one reaction and return the new count. Stops at zero.
    #[instrument(skip(self), fields(message_id = %id))]
    pub fn remove_reaction(&self, id: &MessageId) -> Result<i64, StoreError> {
        self.update_count(
            id,
            "UPDATE messages SET reaction_count = MAX(reaction_count - 1, 0) \
             WHERE id = ?1 RETURNING reaction_count",
        )
    }

    /// Mark a message answered. Idempotent.
    #[instrument(skip(self), fields(message_id = %id))]
    pub fn mark_answered(&self, id: &MessageId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let changed =
                conn.execute("UPDATE messages SET answered = 1 WHERE id = ?1", [id.as_str()])?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("message {id}")));
            }
            Ok(())
        })
    }

    fn update_count(&self, id: &MessageId, sql: &str) -> Result<i64, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(sql, [id.as_str()], |row| row.get(0))
                .optional()?
                .ok_or_else(|| StoreError::NotFound(format!("message {id}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::RoomRepo;

    fn setup() -> (RoomRepo, MessageRepo) {
        let db = Database::in_memory().unwrap();
        (RoomRepo::new(db.clone()), MessageRepo::new(db))
    }

    #[test]
    fn create_and_get() {
        let (rooms, messages) = setup();
        let room = rooms.create("t").unwrap();
        let id = messages.create(&room, "what is a lifetime?").unwrap();

        let row = messages.get(&room, &id).unwrap();
        assert_eq!(row.message, "what is a lifetime?");
        assert_eq!(row.room_id, room);
        assert_eq!(row.reaction_count, 0);
        assert!(!row.answered);
    }

    #[test]
    fn get_is_scoped_to_room() {
        let (rooms, messages) = setup();
        let a = rooms.create("a").unwrap();
        let b = rooms.create("b").unwrap();
        let id = messages.create(&a, "hi").unwrap();

        let err = messages.get(&b, &id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn create_in_unknown_room_fails() {
        let (_, messages) = setup();
        let err = messages.create(&RoomId::new(), "orphan").unwrap_err();
        assert!(matches!(err, StoreError::Database(_)), "got: {err}");
    }

    #[test]
    fn list_for_room_filters_and_orders() {
        let (rooms, messages) = setup();
        let a = rooms.create("a").unwrap();
        let b = rooms.create("b").unwrap();
        let m1 = messages.create(&a, "first").unwrap();
        let _ = messages.create(&b, "other room").unwrap();
        let m2 = messages.create(&a, "second").unwrap();

        let ids: Vec<_> = messages
            .list_for_room(&a)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![m1, m2]);
    }

    #[test]
    fn react_and_remove() {
        let (rooms, messages) = setup();
        let room = rooms.create("t").unwrap();
        let id = messages.create(&room, "q").unwrap();

        assert_eq!(messages.react(&id).unwrap(), 1);
        assert_eq!(messages.react(&id).unwrap(), 2);
        assert_eq!(messages.remove_reaction(&id).unwrap(), 1);
        assert_eq!(messages.get(&room, &id).unwrap().reaction_count, 1);
    }

    #[test]
    fn remove_reaction_stops_at_zero() {
        let (rooms, messages) = setup();
        let room = rooms.create("t").unwrap();
        let id = messages.create(&room, "q").unwrap();

        assert_eq!(messages.remove_reaction(&id).unwrap(), 0);
        assert_eq!(messages.remove_reaction(&id).unwrap(), 0);
    }

    #[test]
    fn react_missing_is_not_found() {
        let (_, messages) = setup();
        assert!(messages.react(&MessageId::new()).unwrap_err().is_not_found());
        assert!(
            messages
                .remove_reaction(&MessageId::new())
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn mark_answered_is_idempotent() {
        let (rooms, messages) = setup();
        let room = rooms.create("t").unwrap();
        let id = messages.create(&room, "q").unwrap();

        messages.mark_answered(&id).unwrap();
        messages.mark_answered(&id).unwrap();
        assert!(messages.get(&room, &id).unwrap().answered);
        assert!(
            messages
                .mark_answered(&MessageId::new())
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn row_json_uses_api_field_names() {
        let row = MessageRow {
            id: MessageId::from_raw("m1"),
            room_id: RoomId::from_raw("r1"),
            message: "hi".into(),
            reaction_count: 2,
            answered: true,
        };
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({
                "ID": "m1",
                "RoomID": "r1",
                "Message": "hi",
                "ReactionCount": 2,
                "Answered": true
            })
        );
    }
}
