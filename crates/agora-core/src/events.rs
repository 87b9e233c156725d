//! Room events pushed to live viewers.
//!
//! A [`RoomEvent`] pairs a routing key (the room) with a kind-tagged payload.
//! Only the payload goes on the wire:
//!
//! ```text
//! {"kind":"message_created","value":{"id":"…","message":"…"}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, RoomId};

/// The closed set of event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A message was posted to the room.
    MessageCreated,
    /// A message gained a reaction.
    MessageReactionIncreased,
    /// A message lost a reaction.
    MessageReactionDecreased,
    /// A message was marked as answered.
    MessageAnswered,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::MessageCreated,
        Self::MessageReactionIncreased,
        Self::MessageReactionDecreased,
        Self::MessageAnswered,
    ];

    /// Wire name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessageCreated => "message_created",
            Self::MessageReactionIncreased => "message_reaction_increased",
            Self::MessageReactionDecreased => "message_reaction_decreased",
            Self::MessageAnswered => "message_answered",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload, serialized adjacently tagged as `kind` + `value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventPayload {
    /// A new message and its text.
    MessageCreated {
        /// Message id.
        id: MessageId,
        /// Message text.
        message: String,
    },
    /// Reaction count after an increment.
    MessageReactionIncreased {
        /// Message id.
        id: MessageId,
        /// New reaction count.
        count: i64,
    },
    /// Reaction count after a decrement.
    MessageReactionDecreased {
        /// Message id.
        id: MessageId,
        /// New reaction count.
        count: i64,
    },
    /// The message is now answered.
    MessageAnswered {
        /// Message id.
        id: MessageId,
    },
}

impl EventPayload {
    /// The kind tag of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MessageCreated { .. } => EventKind::MessageCreated,
            Self::MessageReactionIncreased { .. } => EventKind::MessageReactionIncreased,
            Self::MessageReactionDecreased { .. } => EventKind::MessageReactionDecreased,
            Self::MessageAnswered { .. } => EventKind::MessageAnswered,
        }
    }

    /// The message the payload refers to.
    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::MessageCreated { id, .. }
            | Self::MessageReactionIncreased { id, .. }
            | Self::MessageReactionDecreased { id, .. }
            | Self::MessageAnswered { id } => id,
        }
    }
}

/// An immutable state-change notification for one room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomEvent {
    room_id: RoomId,
    payload: EventPayload,
}

impl RoomEvent {
    /// Build an event from its parts.
    pub fn new(room_id: RoomId, payload: EventPayload) -> Self {
        Self { room_id, payload }
    }

    /// `message_created`
    pub fn message_created(room_id: RoomId, id: MessageId, message: impl Into<String>) -> Self {
        Self::new(
            room_id,
            EventPayload::MessageCreated {
                id,
                message: message.into(),
            },
        )
    }

    /// `message_reaction_increased`
    pub fn reaction_increased(room_id: RoomId, id: MessageId, count: i64) -> Self {
        Self::new(room_id, EventPayload::MessageReactionIncreased { id, count })
    }

    /// `message_reaction_decreased`
    pub fn reaction_decreased(room_id: RoomId, id: MessageId, count: i64) -> Self {
        Self::new(room_id, EventPayload::MessageReactionDecreased { id, count })
    }

    /// `message_answered`
    pub fn message_answered(room_id: RoomId, id: MessageId) -> Self {
        Self::new(room_id, EventPayload::MessageAnswered { id })
    }

    /// Routing key. Never serialized.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Wire payload.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Kind of the payload.
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Serialize the wire form (payload only).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.payload)
    }
}
