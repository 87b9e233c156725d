//! Room repository.

use agora_core::RoomId;
use chrono::Utc;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::database::Database;
use crate::error::StoreError;

/// A room as returned over the HTTP API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRow {
    /// Room id.
    #[serde(rename = "ID")]
    pub id: RoomId,
    /// Topic of the room.
    #[serde(rename = "Theme")]
    pub theme: String,
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoomRow> {
    Ok(RoomRow {
        id: RoomId::from_raw(row.get::<_, String>(0)?),
        theme: row.get(1)?,
    })
}

/// Room persistence.
#[derive(Clone, Debug)]
pub struct RoomRepo {
    db: Database,
}

impl RoomRepo {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a room and return its fresh id.
    #[instrument(skip(self))]
    pub fn create(&self, theme: &str) -> Result<RoomId, StoreError> {
        let id = RoomId::new();
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO rooms (id, theme, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![id.as_str(), theme, now],
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    /// Fetch a room by id.
    #[instrument(skip(self), fields(room_id = %id))]
    pub fn get(&self, id: &RoomId) -> Result<RoomRow, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, theme FROM rooms WHERE id = ?1",
                [id.as_str()],
                map_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("room {id}")))
        })
    }

    /// Whether a room exists.
    #[instrument(skip(self), fields(room_id = %id))]
    pub fn exists(&self, id: &RoomId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM rooms WHERE id = ?1", [id.as_str()], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// All rooms, oldest first.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<RoomRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, theme FROM rooms ORDER BY created_at, rowid")?;
            let rows = stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RoomRepo {
        RoomRepo::new(Database::in_memory().unwrap())
    }

    #[test]
    fn create_and_get() {
        let repo = repo();
        let id = repo.create("rust meetup").unwrap();
        let room = repo.get(&id).unwrap();
        assert_eq!(room.id, id);
        assert_eq!(room.theme, "rust meetup");
    }

    #[test]
    fn get_missing_is_not_found() {
        let err = repo().get(&RoomId::new()).unwrap_err();
        assert!(err.is_not_found(), "got: {err}");
    }

    #[test]
    fn exists_reflects_inserts() {
        let repo = repo();
        let id = repo.create("q&a").unwrap();
        assert!(repo.exists(&id).unwrap());
        assert!(!repo.exists(&RoomId::new()).unwrap());
    }

    #[test]
    fn list_in_creation_order() {
        let repo = repo();
        let a = repo.create("a").unwrap();
        let b = repo.create("b").unwrap();
        let rooms = repo.list().unwrap();
        assert_eq!(
            rooms.iter().map(|r| r.id.clone()).collect::<Vec<_>>(),
            vec![a, b]
        );
    }

    #[test]
    fn list_empty() {
        assert!(repo().list().unwrap().is_empty());
    }

    #[test]
    fn row_json_uses_api_field_names() {
        let row = RoomRow {
            id: RoomId::from_raw("r1"),
            theme: "go".into(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"ID": "r1", "Theme": "go"}));
    }
}
