//! REST handlers and the WebSocket subscribe endpoint.

pub mod errors;
pub mod messages;
pub mod rooms;
pub mod subscribe;

use agora_core::RoomId;
use agora_store::MessageRow;
use serde::Serialize;

pub use errors::ApiError;

use crate::server::AppState;

/// `{"id": ...}` returned by create endpoints.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    /// Id of the created row.
    pub id: String,
}

/// `{"count": ...}` returned by reaction endpoints.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    /// Reaction count after the change.
    pub count: i64,
}

/// Parse a room path segment and make sure the room exists.
pub(crate) fn load_room(state: &AppState, raw: &str) -> Result<RoomId, ApiError> {
    let room_id = errors::parse_room_id(raw)?;
    if !state.rooms.exists(&room_id)? {
        return Err(ApiError::RoomNotFound);
    }
    Ok(room_id)
}

/// Parse a message path segment and load it from `room_id`.
pub(crate) fn load_message(
    state: &AppState,
    room_id: &RoomId,
    raw: &str,
) -> Result<MessageRow, ApiError> {
    let message_id = errors::parse_message_id(raw)?;
    state.messages.get(room_id, &message_id).map_err(|e| {
        if e.is_not_found() {
            ApiError::MessageNotFound
        } else {
            ApiError::Internal(e)
        }
    })
}
