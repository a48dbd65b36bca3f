//! Ethernet-over-UDP tunnel transport
//!
//! Each datagram carries one complete Ethernet frame, header included. Every
//! frame is sent to all configured peers; the receiving executor applies
//! destination address filtering as it would on a real link.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::UdpSocket;

use super::{InterfaceError, Transport};
use crate::error::Result;
use crate::protocol::defines::ETHERNET_MAX_FRAME_LENGTH;
use crate::types::MacAddress;

/// Transport tunnelling frames through a UDP socket
pub struct UdpTransport {
    socket: UdpSocket,
    mac_address: MacAddress,
    peers: Vec<SocketAddr>,
}

impl UdpTransport {
    /// Bind to `local` and use `mac_address` as our link address
    ///
    /// # Errors
    ///
    /// Returns [`AvdeccError::NetworkError`](crate::AvdeccError::NetworkError)
    /// if the socket cannot be bound.
    pub async fn bind(local: SocketAddr, mac_address: MacAddress) -> Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        tracing::debug!(
            "UDP transport {} bound to {}",
            mac_address,
            socket.local_addr()?
        );
        Ok(Self {
            socket,
            mac_address,
            peers: Vec::new(),
        })
    }

    /// Add a peer that receives every outgoing frame
    pub fn add_peer(&mut self, peer: SocketAddr) {
        if !self.peers.contains(&peer) {
            self.peers.push(peer);
        }
    }

    /// Builder form of [`add_peer`](Self::add_peer)
    #[must_use]
    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.add_peer(peer);
        self
    }

    /// Configured peers
    #[must_use]
    pub fn peers(&self) -> &[SocketAddr] {
        &self.peers
    }

    /// Address the socket is bound to
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    fn is_transient(e: &std::io::Error) -> bool {
        // ICMP port unreachable from a peer that is not listening yet
        e.raw_os_error() == Some(10054) || e.kind() == std::io::ErrorKind::ConnectionReset
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn mac_address(&self) -> MacAddress {
        self.mac_address
    }

    fn send(&self, frame: Bytes) -> std::result::Result<(), InterfaceError> {
        for peer in &self.peers {
            match self.socket.try_send_to(&frame, *peer) {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    tracing::warn!("UDP transport send buffer full, dropping frame to {}", peer);
                }
                Err(e) => return Err(InterfaceError::TransportError(e.to_string())),
            }
        }
        Ok(())
    }

    async fn recv(&self) -> std::result::Result<Bytes, InterfaceError> {
        let mut buf = vec![0u8; ETHERNET_MAX_FRAME_LENGTH];
        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, from)) => {
                    tracing::trace!("UDP transport received {} bytes from {}", len, from);
                    buf.truncate(len);
                    return Ok(Bytes::from(buf));
                }
                Err(e) if Self::is_transient(&e) => {
                    tracing::debug!("UDP transport: transient socket error: {}", e);
                }
                Err(e) => return Err(InterfaceError::TransportError(e.to_string())),
            }
        }
    }
}
