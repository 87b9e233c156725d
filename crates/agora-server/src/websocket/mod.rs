//! Viewer connections, room registry, and event fan-out.

pub mod broadcast;
pub mod connection;
pub mod event_bridge;
pub mod registry;
pub mod session;

pub use broadcast::{Broadcaster, PublishReport};
pub use connection::{ViewerConnection, ViewerState};
pub use event_bridge::EventBridge;
pub use registry::RoomRegistry;
pub use session::{SessionConfig, run_lifecycle, run_viewer_session};
