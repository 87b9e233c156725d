//! HTTP error responses.
//!
//! Bodies are short plain-text strings that browser clients display as is.

use agora_core::{MessageId, RoomId};
use agora_store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Path segment is not a UUID.
    #[error("invalid room id")]
    InvalidRoomId,
    /// No room with that id.
    #[error("room not found")]
    RoomNotFound,
    /// Path segment is not a UUID.
    #[error("invalid message id")]
    InvalidMessageId,
    /// No message with that id in the room.
    #[error("message not found")]
    MessageNotFound,
    /// Request body did not decode.
    #[error("invalid json")]
    InvalidJson,
    /// The WebSocket handshake was rejected.
    #[error("failed to upgrade to websocket connection")]
    UpgradeFailed,
    /// Viewer limit reached.
    #[error("too many viewers")]
    TooManyViewers,
    /// Store failure; details are logged, not returned.
    #[error("something went wrong")]
    Internal(#[from] StoreError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRoomId
            | Self::RoomNotFound
            | Self::InvalidMessageId
            | Self::MessageNotFound
            | Self::InvalidJson
            | Self::UpgradeFailed => StatusCode::BAD_REQUEST,
            Self::TooManyViewers => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            error!(error = %e, "store operation failed");
        }
        (self.status(), self.to_string()).into_response()
    }
}

/// Parse a room id from a path segment.
pub fn parse_room_id(raw: &str) -> Result<RoomId, ApiError> {
    RoomId::parse(raw).map_err(|_| ApiError::InvalidRoomId)
}

/// Parse a message id from a path segment.
pub fn parse_message_id(raw: &str) -> Result<MessageId, ApiError> {
    MessageId::parse(raw).map_err(|_| ApiError::InvalidMessageId)
}

/// Decode a JSON body regardless of `Content-Type`.
pub fn decode_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)
}
