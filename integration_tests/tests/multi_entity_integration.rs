mod common;

use std::time::Duration;

use avdecc::testing::entity_id;
use avdecc::{AemCommandStatus, ProtocolEvent, VirtualNetwork};
use common::{controller_station, init_logging, responder_station, wait_all_online};
use tokio::sync::oneshot;

#[tokio::test]
async fn test_controller_names_every_responder() {
    init_logging();
    let network = VirtualNetwork::new();
    let (interface, controller) = controller_station(&network).await;
    let mut events = interface.subscribe();

    let mut stations = Vec::new();
    for (n, name) in [(2, "Stage Left"), (3, "Stage Right"), (4, "Monitor")] {
        stations.push(responder_station(&network, n, name).await);
    }
    wait_all_online(&mut events, &[entity_id(2), entity_id(3), entity_id(4)]).await;
    assert_eq!(interface.remote_entities().await.unwrap().len(), 3);

    let mut names = Vec::new();
    for n in 2..=4 {
        let (tx, rx) = oneshot::channel();
        controller.get_entity_name(entity_id(n), move |status, name| {
            let _ = tx.send((status, name));
        });
        let (status, name) = rx.await.unwrap();
        assert_eq!(status, AemCommandStatus::SUCCESS);
        names.push(name.unwrap().to_string_lossy());
    }
    assert_eq!(names, vec!["Stage Left", "Stage Right", "Monitor"]);

    for (station, responder) in stations {
        responder.shutdown().await;
        station.shutdown().await;
    }
}

#[tokio::test]
async fn test_responder_shutdown_is_seen_as_departure() {
    let network = VirtualNetwork::new();
    let (interface, _controller) = controller_station(&network).await;
    let mut events = interface.subscribe();
    let (station, responder) = responder_station(&network, 2, "Booth").await;
    wait_all_online(&mut events, &[entity_id(2)]).await;

    assert_eq!(responder.shutdown().await, 0);

    let offline = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(ProtocolEvent::RemoteEntityOffline { entity_id }) = events.recv().await {
                return entity_id;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(offline, entity_id(2));
    station.shutdown().await;
}
