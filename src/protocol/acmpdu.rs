//! ACMP: AVDECC Connection Management Protocol data unit

use super::avtpdu::AvtpControlHeader;
use super::defines::{
    ACMPDU_CONTROL_DATA_LENGTH, AVTP_SUBTYPE_ACMP, AcmpMessageType, AcmpStatus, ConnectionFlags,
};
use super::error::PduError;
use super::serialization::{Deserializer, Serializer};
use crate::types::{MacAddress, PayloadPolicy, UniqueIdentifier};

/// ACMP data unit (AVTP header plus 44 bytes of control data)
///
/// Always sent to the ADP/ACMP multicast address; the AVTP stream ID field
/// carries the stream ID of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acmpdu {
    /// Command or response kind
    pub message_type: AcmpMessageType,
    /// Response status
    pub status: AcmpStatus,
    /// Stream ID
    pub stream_id: UniqueIdentifier,
    /// Controller issuing the command
    pub controller_entity_id: UniqueIdentifier,
    /// Talker entity
    pub talker_entity_id: UniqueIdentifier,
    /// Listener entity
    pub listener_entity_id: UniqueIdentifier,
    /// Talker stream index
    pub talker_unique_id: u16,
    /// Listener stream index
    pub listener_unique_id: u16,
    /// Stream destination MAC address
    pub stream_dest_address: MacAddress,
    /// Connections on the talker stream
    pub connection_count: u16,
    /// Correlates responses with commands
    pub sequence_id: u16,
    /// Connection flags
    pub flags: ConnectionFlags,
    /// Stream VLAN ID
    pub stream_vlan_id: u16,
}

impl Default for Acmpdu {
    fn default() -> Self {
        Self {
            message_type: AcmpMessageType::CONNECT_TX_COMMAND,
            status: AcmpStatus::SUCCESS,
            stream_id: UniqueIdentifier::NULL,
            controller_entity_id: UniqueIdentifier::NULL,
            talker_entity_id: UniqueIdentifier::NULL,
            listener_entity_id: UniqueIdentifier::NULL,
            talker_unique_id: 0,
            listener_unique_id: 0,
            stream_dest_address: MacAddress::NULL,
            connection_count: 0,
            sequence_id: 0,
            flags: ConnectionFlags::NONE,
            stream_vlan_id: 0,
        }
    }
}

impl Acmpdu {
    /// Bytes written after the AVTP header
    pub const CONTROL_DATA_LENGTH: usize = ACMPDU_CONTROL_DATA_LENGTH;

    /// Command between a talker stream and a listener stream
    #[must_use]
    pub fn command(
        message_type: AcmpMessageType,
        controller: UniqueIdentifier,
        talker: (UniqueIdentifier, u16),
        listener: (UniqueIdentifier, u16),
    ) -> Self {
        Self {
            message_type,
            controller_entity_id: controller,
            talker_entity_id: talker.0,
            talker_unique_id: talker.1,
            listener_entity_id: listener.0,
            listener_unique_id: listener.1,
            ..Self::default()
        }
    }

    /// Whether this is a command
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.message_type.is_command()
    }

    /// Derive the response to this command.
    ///
    /// Returns `None` when `self` is not a command.
    #[must_use]
    pub fn response_copy(&self) -> Option<Self> {
        if !self.is_command() {
            return None;
        }
        Some(Self {
            message_type: self.message_type.response_type(),
            ..self.clone()
        })
    }

    /// Append the PDU (AVTP header included).
    ///
    /// # Errors
    ///
    /// Fails if the serializer has fewer than 56 bytes left.
    pub fn serialize<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), PduError> {
        let header = AvtpControlHeader {
            control_data: self.message_type.value() & 0x0F,
            status: self.status.value() & 0x1F,
            control_data_length: 44,
            stream_id: self.stream_id.value(),
            ..AvtpControlHeader::new(AVTP_SUBTYPE_ACMP)
        };
        ser.pack(&header)?
            .pack(&self.controller_entity_id)?
            .pack(&self.talker_entity_id)?
            .pack(&self.listener_entity_id)?
            .write_u16(self.talker_unique_id)?
            .write_u16(self.listener_unique_id)?
            .pack(&self.stream_dest_address)?
            .write_u16(self.connection_count)?
            .write_u16(self.sequence_id)?
            .write_u16(self.flags.bits())?
            .write_u16(self.stream_vlan_id)?
            .write_u16(0)?;
        Ok(())
    }

    /// Decode the control data following an already parsed AVTP header.
    ///
    /// # Errors
    ///
    /// Unknown message types and short or inconsistent lengths are rejected.
    pub fn deserialize(
        header: &AvtpControlHeader,
        des: &mut Deserializer<'_>,
        policy: PayloadPolicy,
    ) -> Result<Self, PduError> {
        let message_type = AcmpMessageType(header.control_data);
        if message_type.name().is_none() {
            return Err(PduError::UnknownMessageType {
                subtype: AVTP_SUBTYPE_ACMP,
                message_type: header.control_data,
            });
        }

        if des.remaining() < ACMPDU_CONTROL_DATA_LENGTH {
            return Err(PduError::IncorrectPayloadSize {
                expected: ACMPDU_CONTROL_DATA_LENGTH,
                actual: des.remaining(),
            });
        }
        header.checked_control_data_length(ACMPDU_CONTROL_DATA_LENGTH, des.remaining(), policy)?;

        let controller_entity_id = des.unpack()?;
        let talker_entity_id = des.unpack()?;
        let listener_entity_id = des.unpack()?;
        let talker_unique_id = des.read_u16()?;
        let listener_unique_id = des.read_u16()?;
        let stream_dest_address = des.unpack()?;
        let connection_count = des.read_u16()?;
        let sequence_id = des.read_u16()?;
        let flags = ConnectionFlags::from_bits(des.read_u16()?);
        let stream_vlan_id = des.read_u16()?;
        des.skip(2)?;

        Ok(Self {
            message_type,
            status: AcmpStatus(header.status),
            stream_id: UniqueIdentifier::new(header.stream_id),
            controller_entity_id,
            talker_entity_id,
            listener_entity_id,
            talker_unique_id,
            listener_unique_id,
            stream_dest_address,
            connection_count,
            sequence_id,
            flags,
            stream_vlan_id,
        })
    }
}
