//! Hands persisted mutations to the broadcaster off the request path.

use std::sync::Arc;

use agora_core::RoomEvent;
use tokio::task::JoinHandle;

use super::broadcast::{Broadcaster, PublishReport};

/// Fire-and-forget publisher used by HTTP handlers.
#[derive(Debug, Clone)]
pub struct EventBridge {
    broadcaster: Arc<Broadcaster>,
}

impl EventBridge {
    /// Create a bridge over a broadcaster.
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Publish `event` on a detached task.
    ///
    /// Handlers drop the handle: the response does not wait for fan-out and
    /// no result flows back. Tests may await it.
    pub fn emit(&self, event: RoomEvent) -> JoinHandle<PublishReport> {
        let broadcaster = Arc::clone(&self.broadcaster);
        tokio::spawn(async move { broadcaster.publish(&event) })
    }
}

#[cfg(test)]
mod tests {
    use agora_core::{MessageId, RoomId};

    use super::*;
    use crate::websocket::registry::RoomRegistry;
    use crate::websocket::registry::tests::viewer;

    #[tokio::test]
    async fn emit_publishes_in_background() {
        let registry = Arc::new(RoomRegistry::new());
        let bridge = EventBridge::new(Arc::new(Broadcaster::new(Arc::clone(&registry))));
        let room = RoomId::from_raw("r1");
        let (v, mut rx) = viewer(&room, 4);
        registry.register(v);

        let handle = bridge.emit(RoomEvent::message_answered(room, MessageId::from_raw("m1")));
        let report = handle.await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(
            rx.recv().await.unwrap().as_str(),
            r#"{"kind":"message_answered","value":{"id":"m1"}}"#
        );
    }

    #[tokio::test]
    async fn emit_to_empty_room_completes() {
        let registry = Arc::new(RoomRegistry::new());
        let bridge = EventBridge::new(Arc::new(Broadcaster::new(registry)));
        let report = bridge
            .emit(RoomEvent::message_answered(RoomId::new(), MessageId::new()))
            .await
            .unwrap();
        assert_eq!(report, PublishReport::default());
    }
}
