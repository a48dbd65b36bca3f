//! Frame transport abstraction

use async_trait::async_trait;
use bytes::Bytes;

use super::InterfaceError;
use crate::types::MacAddress;

/// Moves raw Ethernet frames between a [`ProtocolInterface`](super::ProtocolInterface)
/// and the link.
///
/// `send` must not block: it is called from the executor while it processes
/// a frame or a timer. `recv` must be cancel safe, it is polled from a
/// `tokio::select!` loop.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Address used as the source of every frame sent through this transport
    fn mac_address(&self) -> MacAddress;

    /// Queue one complete Ethernet frame for sending
    ///
    /// # Errors
    ///
    /// Returns [`InterfaceError::TransportError`] if the frame cannot be sent.
    fn send(&self, frame: Bytes) -> Result<(), InterfaceError>;

    /// Wait for the next Ethernet frame
    ///
    /// # Errors
    ///
    /// Returns [`InterfaceError::TransportError`] once the link is gone.
    async fn recv(&self) -> Result<Bytes, InterfaceError>;
}
