//! AEM (AVDECC Entity Model) AECPDU

use bytes::Bytes;

use super::aecpdu::AecpCommonHeader;
use super::defines::{
    AEM_HEADER_LENGTH, AEM_MAXIMUM_SEND_PAYLOAD_LENGTH, AecpMessageType, AemAecpStatus,
    AemCommandType,
};
use super::error::PduError;
use super::serialization::Serializer;
use crate::types::UniqueIdentifier;

/// AEM command or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AemAecpdu {
    /// Common AECP fields
    pub common: AecpCommonHeader,
    /// Set on unsolicited notifications
    pub unsolicited: bool,
    /// Command type (15 bits)
    pub command_type: AemCommandType,
    payload: Bytes,
}

impl AemAecpdu {
    /// Unsolicited flag plus command type
    pub const HEADER_LENGTH: usize = AEM_HEADER_LENGTH;

    /// Largest payload this build sends
    pub const MAXIMUM_PAYLOAD_LENGTH: usize = AEM_MAXIMUM_SEND_PAYLOAD_LENGTH;

    /// Empty command or response
    #[must_use]
    pub fn new(is_response: bool) -> Self {
        let message_type = if is_response {
            AecpMessageType::AEM_RESPONSE
        } else {
            AecpMessageType::AEM_COMMAND
        };
        Self {
            common: AecpCommonHeader::new(message_type),
            unsolicited: false,
            command_type: AemCommandType::INVALID,
            payload: Bytes::new(),
        }
    }

    /// Command addressed to `target`.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if `payload` exceeds the AEM maximum.
    pub fn command(
        target: UniqueIdentifier,
        controller: UniqueIdentifier,
        command_type: AemCommandType,
        payload: &[u8],
    ) -> Result<Self, PduError> {
        let mut pdu = Self::new(false);
        pdu.common.target_entity_id = target;
        pdu.common.controller_entity_id = controller;
        pdu.command_type = command_type;
        pdu.set_payload(payload)?;
        Ok(pdu)
    }

    /// Status of a response
    #[must_use]
    pub fn status(&self) -> AemAecpStatus {
        AemAecpStatus(self.common.status)
    }

    /// Set the response status
    pub fn set_status(&mut self, status: AemAecpStatus) {
        self.common.status = status.value();
    }

    /// Whether this is a response
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.common.message_type == AecpMessageType::AEM_RESPONSE
    }

    /// Command-specific data
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replace the command-specific data.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if `payload` exceeds the AEM maximum; the PDU is
    /// left unchanged.
    pub fn set_payload(&mut self, payload: &[u8]) -> Result<(), PduError> {
        if payload.len() > Self::MAXIMUM_PAYLOAD_LENGTH {
            return Err(PduError::PayloadTooLarge {
                length: payload.len(),
                maximum: Self::MAXIMUM_PAYLOAD_LENGTH,
            });
        }
        self.payload = Bytes::copy_from_slice(payload);
        Ok(())
    }

    pub(crate) fn serialize<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), PduError> {
        self.common
            .serialize(ser, Self::HEADER_LENGTH + self.payload.len())?;
        let word = (u16::from(self.unsolicited) << 15) | (self.command_type.value() & 0x7FFF);
        ser.write_u16(word)?.write_bytes(&self.payload)?;
        Ok(())
    }

    /// `data` holds everything after the common header, already bounded by
    /// the validated control data length.
    pub(crate) fn deserialize(common: AecpCommonHeader, data: &[u8]) -> Result<Self, PduError> {
        if data.len() < Self::HEADER_LENGTH {
            return Err(PduError::IncorrectPayloadSize {
                expected: Self::HEADER_LENGTH,
                actual: data.len(),
            });
        }
        let word = u16::from_be_bytes([data[0], data[1]]);
        Ok(Self {
            common,
            unsolicited: word & 0x8000 != 0,
            command_type: AemCommandType(word & 0x7FFF),
            payload: Bytes::copy_from_slice(&data[Self::HEADER_LENGTH..]),
        })
    }
}
