use std::time::Duration;

use bytes::Bytes;

use crate::interface::{Transport, UdpTransport};
use crate::testing::mac_address;

#[tokio::test]
async fn test_udp_tunnel_between_two_sockets() {
    let a = UdpTransport::bind("127.0.0.1:0".parse().unwrap(), mac_address(1))
        .await
        .unwrap();
    let b = UdpTransport::bind("127.0.0.1:0".parse().unwrap(), mac_address(2))
        .await
        .unwrap();
    let a = a.with_peer(b.local_addr().unwrap());

    let frame = Bytes::from_static(&[0xAB; 60]);
    a.send(frame.clone()).unwrap();

    let received = tokio::time::timeout(Duration::from_secs(1), b.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, frame);
    assert_eq!(a.peers().len(), 1);
}

#[tokio::test]
async fn test_send_without_peers_is_a_no_op() {
    let a = UdpTransport::bind("127.0.0.1:0".parse().unwrap(), mac_address(1))
        .await
        .unwrap();
    assert!(a.send(Bytes::from_static(&[0; 60])).is_ok());
    assert_eq!(a.mac_address(), mac_address(1));
}
