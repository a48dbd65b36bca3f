use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tokio_test::assert_ok;

use crate::interface::{InterfaceError, Transport, VirtualNetwork};
use crate::protocol::defines::ADP_MULTICAST_MAC;
use crate::testing::mac_address;
use crate::types::MacAddress;

fn frame(destination: MacAddress, source: MacAddress, marker: u8) -> Bytes {
    let mut buf = BytesMut::with_capacity(15);
    buf.put_slice(&destination.0);
    buf.put_slice(&source.0);
    buf.put_u16(0x22F0);
    buf.put_u8(marker);
    buf.freeze()
}

async fn try_recv(transport: &impl Transport) -> Option<Bytes> {
    tokio::time::timeout(Duration::from_millis(50), transport.recv())
        .await
        .ok()
        .and_then(Result::ok)
}

#[tokio::test]
async fn test_unicast_reaches_only_destination() {
    let network = VirtualNetwork::new();
    let a = network.create_transport(mac_address(1));
    let b = network.create_transport(mac_address(2));
    let c = network.create_transport(mac_address(3));

    assert_ok!(a.send(frame(mac_address(2), mac_address(1), 7)));

    assert_eq!(try_recv(&b).await.unwrap()[14], 7);
    assert!(try_recv(&c).await.is_none());
    assert!(try_recv(&a).await.is_none());
}

#[tokio::test]
async fn test_multicast_reaches_everyone_but_sender() {
    let network = VirtualNetwork::new();
    let a = network.create_transport(mac_address(1));
    let b = network.create_transport(mac_address(2));
    let c = network.create_transport(mac_address(3));

    assert_ok!(a.send(frame(ADP_MULTICAST_MAC, mac_address(1), 1)));

    assert!(try_recv(&b).await.is_some());
    assert!(try_recv(&c).await.is_some());
    assert!(try_recv(&a).await.is_none());
}

#[tokio::test]
async fn test_filter_and_loss() {
    let network = VirtualNetwork::new();
    let a = network.create_transport(mac_address(1));
    let b = network.create_transport(mac_address(2));

    network.set_filter(|_, _, frame| frame[14] != 0xFF);
    a.send(frame(mac_address(2), mac_address(1), 0xFF)).unwrap();
    assert!(try_recv(&b).await.is_none());
    a.send(frame(mac_address(2), mac_address(1), 1)).unwrap();
    assert!(try_recv(&b).await.is_some());

    network.clear_filter();
    network.set_loss_rate(1.0);
    a.send(frame(mac_address(2), mac_address(1), 0xFF)).unwrap();
    assert!(try_recv(&b).await.is_none());
}

#[tokio::test]
async fn test_runt_frame_rejected() {
    let network = VirtualNetwork::new();
    let a = network.create_transport(mac_address(1));
    assert!(matches!(
        a.send(Bytes::from_static(&[0u8; 10])),
        Err(InterfaceError::TransportError(_))
    ));
}

#[test]
fn test_dropped_transport_detaches() {
    let network = VirtualNetwork::new();
    let a = network.create_transport(mac_address(1));
    let b = network.create_transport(mac_address(2));
    assert_eq!(network.port_count(), 2);
    drop(b);
    assert_eq!(network.port_count(), 1);
    drop(a);
    assert_eq!(network.port_count(), 0);
}
