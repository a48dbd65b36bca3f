use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::controller::AemCommandStatus;
use crate::interface::{InterfaceError, ProtocolEvent, ProtocolInterface, VirtualNetwork};
use crate::entity::CommonInformation;
use crate::responder::AemHandler;
use crate::testing::{common_information, entity_id, interfaces, mac_address, sample_entity_tree};
use crate::types::ProtocolConfig;

async fn wait_online(
    events: &mut tokio::sync::broadcast::Receiver<ProtocolEvent>,
    id: crate::types::UniqueIdentifier,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(ProtocolEvent::RemoteEntityOnline { entity }) = events.recv().await {
                if entity.entity_id() == id {
                    return;
                }
            }
        }
    })
    .await
    .expect("entity came online");
}

#[tokio::test]
async fn test_controller_reads_responder_entity_descriptor() {
    let network = VirtualNetwork::new();
    let controller_side = ProtocolInterface::new(
        Arc::new(network.create_transport(mac_address(1))),
        ProtocolConfig::default(),
    )
    .unwrap();
    let responder_side = ProtocolInterface::new(
        Arc::new(network.create_transport(mac_address(2))),
        ProtocolConfig::default(),
    )
    .unwrap();
    let mut events = controller_side.subscribe();

    let controller = controller_side
        .create_controller_entity(
            CommonInformation::controller(entity_id(0xC0)),
            interfaces(mac_address(1)),
            None,
            None,
        )
        .await
        .unwrap();
    let responder = responder_side
        .create_responder_entity(
            common_information(entity_id(2)),
            interfaces(mac_address(2)),
            AemHandler::new(Some(sample_entity_tree())).unwrap(),
        )
        .await
        .unwrap();
    responder.enable_advertising().await.unwrap();
    wait_online(&mut events, entity_id(2)).await;

    let (tx, rx) = oneshot::channel();
    controller.read_entity_descriptor(entity_id(2), move |status, descriptor| {
        let _ = tx.send((status, descriptor));
    });
    let (status, descriptor) = rx.await.unwrap();
    assert_eq!(status, AemCommandStatus::SUCCESS);
    let descriptor = descriptor.unwrap();
    assert_eq!(descriptor.entity_id, entity_id(2));
    assert_eq!(descriptor.entity_name.to_string_lossy(), "Test Entity");

    assert_eq!(responder.shutdown().await, 0);
    controller_side.shutdown().await;
    responder_side.shutdown().await;
}

#[tokio::test]
async fn test_command_to_unknown_entity_fails_fast() {
    let network = VirtualNetwork::new();
    let interface = ProtocolInterface::new(
        Arc::new(network.create_transport(mac_address(1))),
        ProtocolConfig::default(),
    )
    .unwrap();
    let controller = interface
        .create_controller_entity(
            CommonInformation::controller(entity_id(0xC0)),
            interfaces(mac_address(1)),
            None,
            None,
        )
        .await
        .unwrap();

    let (tx, rx) = oneshot::channel();
    controller.read_entity_descriptor(entity_id(9), move |status, _| {
        let _ = tx.send(status);
    });
    assert_eq!(
        rx.await.unwrap(),
        AemCommandStatus::from(InterfaceError::UnknownRemoteEntity)
    );
}

#[tokio::test]
async fn test_duplicate_local_entity_rejected() {
    let network = VirtualNetwork::new();
    let interface = ProtocolInterface::new(
        Arc::new(network.create_transport(mac_address(1))),
        ProtocolConfig::default(),
    )
    .unwrap();
    let _first = interface
        .create_responder_entity(
            common_information(entity_id(3)),
            interfaces(mac_address(1)),
            AemHandler::new(None).unwrap(),
        )
        .await
        .unwrap();
    let second = interface
        .create_responder_entity(
            common_information(entity_id(3)),
            interfaces(mac_address(1)),
            AemHandler::new(None).unwrap(),
        )
        .await;
    assert!(second.is_err());
}
