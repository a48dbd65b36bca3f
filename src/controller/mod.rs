//! Controller role: typed commands and notifications

pub mod delegate;
pub mod entity;
pub mod status;

#[cfg(test)]
mod tests;

pub use delegate::ControllerDelegate;
pub use entity::ControllerEntity;
pub use status::{AaCommandStatus, AemCommandStatus, ControlStatus, MvuCommandStatus};

use crate::entity::StreamIdentification;
use crate::protocol::Acmpdu;
use crate::protocol::defines::ConnectionFlags;
use crate::types::{MacAddress, UniqueIdentifier};

/// Connection fields carried by an ACMP response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConnectionState {
    /// Talker stream
    pub talker_stream: StreamIdentification,
    /// Listener stream
    pub listener_stream: StreamIdentification,
    /// Connections on the talker stream
    pub connection_count: u16,
    /// Connection flags
    pub flags: ConnectionFlags,
    /// Stream ID assigned by the talker
    pub stream_id: UniqueIdentifier,
    /// Stream destination address
    pub stream_dest_address: MacAddress,
    /// Stream VLAN ID
    pub stream_vlan_id: u16,
}

impl StreamConnectionState {
    pub(crate) fn from_acmpdu(pdu: &Acmpdu) -> Self {
        Self {
            talker_stream: StreamIdentification::new(pdu.talker_entity_id, pdu.talker_unique_id),
            listener_stream: StreamIdentification::new(
                pdu.listener_entity_id,
                pdu.listener_unique_id,
            ),
            connection_count: pdu.connection_count,
            flags: pdu.flags,
            stream_id: pdu.stream_id,
            stream_dest_address: pdu.stream_dest_address,
            stream_vlan_id: pdu.stream_vlan_id,
        }
    }
}
