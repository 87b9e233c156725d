//! String-backed id newtypes.
//!
//! Room and message ids are bare UUIDv7 strings because they travel in URL
//! paths. Connection ids never leave the process and carry a `conn_` prefix
//! so they stand out in logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing string without validation.
            pub fn from_raw(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Borrow the underlying string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh UUIDv7 id.
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Parse a UUID, normalizing it to the lowercase hyphenated form.
            pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(raw).map(|u| Self(u.to_string()))
            }
        }
    };
}

string_id!(
    /// Identifies a room. Opaque to the fan-out core.
    RoomId
);
string_id!(
    /// Identifies a message within a room.
    MessageId
);
string_id!(
    /// Identifies one live viewer connection.
    ConnectionId
);

uuid_id!(RoomId);
uuid_id!(MessageId);

impl ConnectionId {
    /// Generate a fresh connection id.
    pub fn new() -> Self {
        Self(format!("conn_{}", Uuid::now_v7()))
    }
}
