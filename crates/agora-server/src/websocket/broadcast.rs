//! Event fan-out to the viewers of one room.

use std::sync::Arc;

use agora_core::RoomEvent;
use metrics::counter;
use tracing::{debug, warn};

use super::registry::RoomRegistry;
use crate::metrics::{EVENTS_PUBLISHED_TOTAL, WS_BROADCAST_DROPS_TOTAL};

/// Outcome of a single publish.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Viewers in the room when the publish started.
    pub recipients: usize,
    /// Frames enqueued.
    pub delivered: usize,
    /// Viewers whose queue rejected the frame; each one was cancelled.
    pub failed: usize,
}

/// Delivers room events to registered viewers.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<RoomRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over a registry.
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this broadcaster reads.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Send an event to every viewer of its room.
    ///
    /// Never waits on a socket: frames go onto each viewer's bounded queue.
    /// A viewer whose queue is full or closed is cancelled and left for its
    /// own lifecycle loop to deregister. Failures are logged, never returned.
    pub fn publish(&self, event: &RoomEvent) -> PublishReport {
        let room_id = event.room_id();
        let kind = event.kind();
        let viewers = self.registry.snapshot(room_id);
        if viewers.is_empty() {
            debug!(%room_id, %kind, "no viewers, dropping event");
            return PublishReport::default();
        }

        let json = match event.to_json() {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(%room_id, %kind, error = %e, "failed to serialize event");
                return PublishReport {
                    recipients: viewers.len(),
                    ..PublishReport::default()
                };
            }
        };

        let mut report = PublishReport {
            recipients: viewers.len(),
            ..PublishReport::default()
        };
        for viewer in &viewers {
            if viewer.send(Arc::clone(&json)) {
                report.delivered += 1;
            } else {
                report.failed += 1;
                counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                warn!(
                    %room_id,
                    conn_id = %viewer.id,
                    %kind,
                    "failed to enqueue event, disconnecting viewer"
                );
                viewer.cancel();
            }
        }

        counter!(EVENTS_PUBLISHED_TOTAL, "kind" => kind.as_str()).increment(1);
        debug!(
            %room_id,
            %kind,
            recipients = report.recipients,
            delivered = report.delivered,
            "broadcast event to room"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use agora_core::{MessageId, RoomId};

    use super::*;
    use crate::websocket::registry::tests::viewer;

    fn setup() -> (Arc<RoomRegistry>, Broadcaster) {
        let registry = Arc::new(RoomRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        (registry, broadcaster)
    }

    #[test]
    fn publish_to_missing_room_is_noop() {
        let (_, broadcaster) = setup();
        let event = RoomEvent::message_answered(RoomId::from_raw("ghost"), MessageId::new());
        assert_eq!(broadcaster.publish(&event), PublishReport::default());
    }

    #[tokio::test]
    async fn scenario_single_viewer_gets_exact_json() {
        let (registry, broadcaster) = setup();
        let room = RoomId::from_raw("r1");
        let (v, mut rx) = viewer(&room, 4);
        registry.register(v);

        let event = RoomEvent::message_created(room, MessageId::from_raw("m1"), "hi");
        let report = broadcaster.publish(&event);
        assert_eq!(report.delivered, 1);
        assert_eq!(
            rx.recv().await.unwrap().as_str(),
            r#"{"kind":"message_created","value":{"id":"m1","message":"hi"}}"#
        );
    }

    #[tokio::test]
    async fn failing_viewer_does_not_block_others() {
        let (registry, broadcaster) = setup();
        let room = RoomId::from_raw("r1");
        let mut receivers = Vec::new();
        let mut viewers = Vec::new();
        for _ in 0..5 {
            let (v, rx) = viewer(&room, 4);
            registry.register(v.clone());
            viewers.push(v);
            receivers.push(rx);
        }
        // Closed queue for the third viewer.
        let broken = viewers[2].clone();
        drop(receivers.remove(2));

        let event = RoomEvent::reaction_increased(room.clone(), MessageId::from_raw("m1"), 1);
        let report = broadcaster.publish(&event);

        assert_eq!(report.recipients, 5);
        assert_eq!(report.delivered, 4);
        assert_eq!(report.failed, 1);
        assert!(broken.is_cancelled());
        for (i, v) in viewers.iter().enumerate() {
            if i != 2 {
                assert!(!v.is_cancelled());
            }
        }
        for rx in &mut receivers {
            assert!(rx.recv().await.unwrap().contains("message_reaction_increased"));
        }
        // Removal is left to the viewer's lifecycle loop.
        assert!(registry.contains(&room, &broken.id));
    }

    #[test]
    fn full_queue_cancels_viewer() {
        let (registry, broadcaster) = setup();
        let room = RoomId::from_raw("r1");
        let (slow, _rx) = viewer(&room, 1);
        registry.register(slow.clone());

        let first = RoomEvent::message_answered(room.clone(), MessageId::from_raw("a"));
        let second = RoomEvent::message_answered(room, MessageId::from_raw("b"));
        assert_eq!(broadcaster.publish(&first).delivered, 1);
        assert_eq!(broadcaster.publish(&second).failed, 1);
        assert!(slow.is_cancelled());
        assert_eq!(slow.drop_count(), 1);
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let (registry, broadcaster) = setup();
        let r1 = RoomId::from_raw("r1");
        let r2 = RoomId::from_raw("r2");
        let (a, mut ra) = viewer(&r1, 4);
        let (b, mut rb) = viewer(&r2, 4);
        registry.register(a);
        registry.register(b);

        let event = RoomEvent::message_created(r1, MessageId::from_raw("m1"), "only r1");
        let _ = broadcaster.publish(&event);

        assert!(ra.recv().await.unwrap().contains("only r1"));
        assert!(rb.try_recv().is_err());
    }

    #[test]
    fn deregistered_viewer_is_not_reached() {
        let (registry, broadcaster) = setup();
        let room = RoomId::from_raw("r1");
        let (v, mut rx) = viewer(&room, 4);
        registry.register(v.clone());
        registry.deregister(&room, &v.id);

        let report = broadcaster.publish(&RoomEvent::message_answered(room, MessageId::new()));
        assert_eq!(report.recipients, 0);
        assert!(rx.try_recv().is_err());
    }
}
