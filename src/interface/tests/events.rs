use crate::interface::{EventBus, EventFilter, ProtocolEvent};
use crate::testing::entity_id;

#[tokio::test]
async fn test_discovery_filter_skips_other_events() {
    let bus = EventBus::new(16);
    let mut filter = EventFilter::discovery_events(&bus);

    bus.emit(ProtocolEvent::LocalEntityOnline {
        entity_id: entity_id(1),
    });
    bus.emit(ProtocolEvent::RemoteEntityOffline {
        entity_id: entity_id(2),
    });

    match filter.recv().await {
        Some(ProtocolEvent::RemoteEntityOffline { entity_id: id }) => {
            assert_eq!(id, entity_id(2));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_emit_without_subscribers() {
    let bus = EventBus::default();
    assert_eq!(bus.subscriber_count(), 0);
    bus.emit(ProtocolEvent::TransportError {
        message: "nobody listens".to_string(),
    });
}

#[tokio::test]
async fn test_filter_stream_ends_with_the_bus() {
    use futures::StreamExt;

    let bus = EventBus::new(8);
    let stream = EventFilter::error_events(&bus).into_stream();
    bus.emit(ProtocolEvent::LocalEntityOnline {
        entity_id: entity_id(1),
    });
    bus.emit(ProtocolEvent::TransportError {
        message: "link down".to_string(),
    });
    drop(bus);

    let events: Vec<_> = stream.collect().await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProtocolEvent::TransportError { .. }));
}
