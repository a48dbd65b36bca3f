mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use avdecc::protocol::defines::{AemCommandType, DescriptorType};
use avdecc::protocol::{AemAecpdu, Aecpdu};
use avdecc::testing::{entity_id, mac_address, test_entity};
use avdecc::{AemCommandStatus, InterfaceError, VirtualNetwork};
use common::{RawPeer, controller, init_logging, wait_online};
use tokio::sync::oneshot;

const CONTROLLER_ID: u32 = 0xC0;
const PEER_ID: u32 = 2;

fn get_configuration() -> Aecpdu {
    AemAecpdu::command(
        entity_id(PEER_ID),
        entity_id(CONTROLLER_ID),
        AemCommandType::GET_CONFIGURATION,
        &[],
    )
    .unwrap()
    .into()
}

#[tokio::test]
async fn test_mismatched_response_type_is_a_protocol_violation() {
    init_logging();
    let network = VirtualNetwork::new();
    let (interface, controller) =
        controller(&network, mac_address(1), entity_id(CONTROLLER_ID)).await;
    let mut events = interface.subscribe();
    let peer = RawPeer::new(&network, test_entity(entity_id(PEER_ID), mac_address(2)));
    peer.announce();
    wait_online(&mut events, entity_id(PEER_ID)).await;

    let (tx, rx) = oneshot::channel();
    controller.acquire_entity(
        entity_id(PEER_ID),
        false,
        DescriptorType::ENTITY,
        0,
        move |status, owner| {
            let _ = tx.send((status, owner));
        },
    );

    let (command, source) = peer.next_aem_command().await;
    assert_eq!(command.command_type, AemCommandType::ACQUIRE_ENTITY);
    let mut response = Aecpdu::Aem(command).response_copy().unwrap();
    if let Aecpdu::Aem(aem) = &mut response {
        aem.command_type = AemCommandType::ENTITY_AVAILABLE;
    }
    peer.reply(source, response);

    let (status, owner) = rx.await.unwrap();
    assert_eq!(status, AemCommandStatus::BASE_PROTOCOL_VIOLATION);
    assert_eq!(owner, None);
}

#[tokio::test]
async fn test_sequence_ids_are_not_reused() {
    let network = VirtualNetwork::new();
    let (interface, controller) =
        controller(&network, mac_address(1), entity_id(CONTROLLER_ID)).await;
    let mut events = interface.subscribe();
    let peer = RawPeer::new(&network, test_entity(entity_id(PEER_ID), mac_address(2)));
    peer.announce();
    wait_online(&mut events, entity_id(PEER_ID)).await;

    let mut seen = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = oneshot::channel();
        controller.send_aecp_command(get_configuration(), None, move |result| {
            let _ = tx.send(result);
        });
        let (command, source) = peer.next_aem_command().await;
        seen.push(command.common.sequence_id);
        let response = Aecpdu::Aem(command).response_copy().unwrap();
        peer.reply(source, response);
        assert!(rx.await.unwrap().is_ok());
    }

    assert_ne!(seen[0], seen[1]);
    assert_ne!(seen[1], seen[2]);
    assert_ne!(seen[0], seen[2]);
}

#[tokio::test(start_paused = true)]
async fn test_silent_target_is_retried_then_times_out() {
    let network = VirtualNetwork::new();
    let (interface, controller) =
        controller(&network, mac_address(1), entity_id(CONTROLLER_ID)).await;
    let mut events = interface.subscribe();
    let peer = RawPeer::new(&network, test_entity(entity_id(PEER_ID), mac_address(2)));
    peer.announce();
    wait_online(&mut events, entity_id(PEER_ID)).await;

    let (tx, rx) = oneshot::channel();
    controller.send_aecp_command(get_configuration(), None, move |result| {
        let _ = tx.send(result);
    });

    let (first, _) = peer.next_aem_command().await;
    let (retry, _) = peer.next_aem_command().await;
    assert_eq!(first.common.sequence_id, retry.common.sequence_id);

    let result = tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.unwrap_err(), InterfaceError::Timeout);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_aborts_every_pending_command() {
    const PENDING: usize = 15;

    let network = VirtualNetwork::new();
    let (interface, controller) =
        controller(&network, mac_address(1), entity_id(CONTROLLER_ID)).await;
    let mut events = interface.subscribe();
    let peer = RawPeer::new(&network, test_entity(entity_id(PEER_ID), mac_address(2)));
    peer.announce();
    wait_online(&mut events, entity_id(PEER_ID)).await;

    let aborted = Arc::new(AtomicUsize::new(0));
    for _ in 0..PENDING {
        let aborted = Arc::clone(&aborted);
        controller.send_aecp_command(get_configuration(), None, move |result| {
            if matches!(result, Err(InterfaceError::Aborted)) {
                aborted.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    assert_eq!(controller.shutdown().await, PENDING);
    assert_eq!(aborted.load(Ordering::SeqCst), PENDING);
    interface.shutdown().await;
}

#[tokio::test]
async fn test_interface_shutdown_completes_queued_commands() {
    const COMMANDS: usize = 8;

    for _ in 0..20 {
        let network = VirtualNetwork::new();
        let (interface, controller) =
            controller(&network, mac_address(1), entity_id(CONTROLLER_ID)).await;

        let completed = Arc::new(AtomicUsize::new(0));
        for _ in 0..COMMANDS {
            let completed = Arc::clone(&completed);
            controller.acquire_entity(
                entity_id(PEER_ID),
                false,
                DescriptorType::ENTITY,
                0,
                move |_, _| {
                    completed.fetch_add(1, Ordering::SeqCst);
                },
            );
        }
        interface.shutdown().await;

        assert_eq!(completed.load(Ordering::SeqCst), COMMANDS);
        drop(controller);
    }
}
