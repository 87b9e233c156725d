//! Room registry: which viewers are watching which room.

use std::collections::HashMap;
use std::sync::Arc;

use agora_core::{ConnectionId, RoomId};
use parking_lot::Mutex;
use tracing::debug;

use super::connection::ViewerConnection;

type RoomSet = HashMap<ConnectionId, Arc<ViewerConnection>>;

/// Room id → live viewer set.
///
/// Every operation takes the single lock briefly and never awaits while
/// holding it. Empty rooms are dropped so the map only holds watched rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, RoomSet>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the set of its bound room.
    pub fn register(&self, connection: Arc<ViewerConnection>) {
        let room_id = connection.room_id.clone();
        let conn_id = connection.id.clone();
        let watchers = {
            let mut rooms = self.rooms.lock();
            let set = rooms.entry(room_id.clone()).or_default();
            let _ = set.insert(conn_id.clone(), connection);
            set.len()
        };
        debug!(%room_id, %conn_id, watchers, "viewer registered");
    }

    /// Remove a connection. No-op if it is not registered.
    pub fn deregister(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        let removed = {
            let mut rooms = self.rooms.lock();
            let Some(set) = rooms.get_mut(room_id) else {
                return;
            };
            let removed = set.remove(connection_id).is_some();
            if set.is_empty() {
                let _ = rooms.remove(room_id);
            }
            removed
        };
        if removed {
            debug!(%room_id, conn_id = %connection_id, "viewer deregistered");
        }
    }

    /// Copy of a room's current viewers. Empty if nobody is watching.
    pub fn snapshot(&self, room_id: &RoomId) -> Vec<Arc<ViewerConnection>> {
        self.rooms
            .lock()
            .get(room_id)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total registered viewers across all rooms.
    pub fn connection_count(&self) -> usize {
        self.rooms.lock().values().map(HashMap::len).sum()
    }

    /// Rooms with at least one viewer.
    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }

    /// Viewers of one room.
    pub fn room_connection_count(&self, room_id: &RoomId) -> usize {
        self.rooms.lock().get(room_id).map_or(0, HashMap::len)
    }

    /// Whether a specific connection is registered under a room.
    pub fn contains(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .lock()
            .get(room_id)
            .is_some_and(|set| set.contains_key(connection_id))
    }
}
