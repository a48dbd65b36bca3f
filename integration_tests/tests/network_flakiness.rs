mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use avdecc::protocol::defines::AVTP_SUBTYPE_AECP;
use avdecc::testing::{entity_id, mac_address};
use avdecc::{AemCommandStatus, VirtualNetwork};
use common::{controller_station, responder_station, wait_all_online};
use tokio::sync::oneshot;

fn is_aecp(frame: &[u8]) -> bool {
    frame.len() > 14 && frame[14] & 0x7F == AVTP_SUBTYPE_AECP
}

#[tokio::test]
async fn test_lost_command_is_recovered_by_retry() {
    let network = VirtualNetwork::new();
    let (interface, controller) = controller_station(&network).await;
    let mut events = interface.subscribe();
    let (station, _responder) = responder_station(&network, 2, "Remote").await;
    wait_all_online(&mut events, &[entity_id(2)]).await;

    // drop only the first command sent by the controller
    let dropped = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&dropped);
    network.set_filter(move |source, _, frame| {
        if source == mac_address(1) && is_aecp(frame) {
            return counter.fetch_add(1, Ordering::SeqCst) > 0;
        }
        true
    });

    let (tx, rx) = oneshot::channel();
    controller.get_configuration(entity_id(2), move |status, configuration| {
        let _ = tx.send((status, configuration));
    });
    assert_eq!(rx.await.unwrap(), (AemCommandStatus::SUCCESS, Some(0)));
    assert_eq!(dropped.load(Ordering::SeqCst), 2);

    station.shutdown().await;
}

#[tokio::test]
async fn test_dead_link_times_out() {
    let network = VirtualNetwork::new();
    let (interface, controller) = controller_station(&network).await;
    let mut events = interface.subscribe();
    let (station, _responder) = responder_station(&network, 2, "Remote").await;
    wait_all_online(&mut events, &[entity_id(2)]).await;

    network.set_filter(|_, _, frame| !is_aecp(frame));

    let (tx, rx) = oneshot::channel();
    controller.get_configuration(entity_id(2), move |status, configuration| {
        let _ = tx.send((status, configuration));
    });
    assert_eq!(rx.await.unwrap(), (AemCommandStatus::TIMED_OUT, None));

    station.shutdown().await;
}
