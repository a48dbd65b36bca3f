//! Milan vendor-unique (MVU) AECPDU

use std::time::Duration;

use bytes::Bytes;

use super::aecpdu::{AecpCommonHeader, Aecpdu};
use super::defines::{
    AECPDU_COMMON_HEADER_LENGTH, AecpMessageType, MVU_COMMAND_TIMEOUT, MVU_HEADER_LENGTH,
    MVU_MAXIMUM_SEND_PAYLOAD_LENGTH, MvuAecpStatus, MvuCommandType, VU_PROTOCOL_ID_LENGTH,
};
use super::error::PduError;
use super::serialization::Serializer;
use super::vu_aecpdu::{VuDelegate, VuProtocolIdentifier};
use crate::types::UniqueIdentifier;

/// MVU command or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MvuAecpdu {
    /// Common AECP fields
    pub common: AecpCommonHeader,
    /// Set on unsolicited notifications
    pub unsolicited: bool,
    /// Command type (15 bits)
    pub command_type: MvuCommandType,
    payload: Bytes,
}

impl MvuAecpdu {
    /// Reserved/unsolicited bit plus command type
    pub const HEADER_LENGTH: usize = MVU_HEADER_LENGTH;

    /// Smallest valid control data length
    pub const MINIMUM_CONTROL_DATA_LENGTH: usize =
        AECPDU_COMMON_HEADER_LENGTH + VU_PROTOCOL_ID_LENGTH + MVU_HEADER_LENGTH;

    /// Largest payload this build sends
    pub const MAXIMUM_PAYLOAD_LENGTH: usize = MVU_MAXIMUM_SEND_PAYLOAD_LENGTH;

    /// Empty command or response
    #[must_use]
    pub fn new(is_response: bool) -> Self {
        let message_type = if is_response {
            AecpMessageType::VENDOR_UNIQUE_RESPONSE
        } else {
            AecpMessageType::VENDOR_UNIQUE_COMMAND
        };
        Self {
            common: AecpCommonHeader::new(message_type),
            unsolicited: false,
            command_type: MvuCommandType::INVALID,
            payload: Bytes::new(),
        }
    }

    /// Command addressed to `target`.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if `payload` exceeds the MVU maximum.
    pub fn command(
        target: UniqueIdentifier,
        controller: UniqueIdentifier,
        command_type: MvuCommandType,
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
    pub fn status(&self) -> MvuAecpStatus {
        MvuAecpStatus(self.common.status)
    }

    /// Set the response status
    pub fn set_status(&mut self, status: MvuAecpStatus) {
        self.common.status = status.value();
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
    /// `PayloadTooLarge` if `payload` exceeds the MVU maximum.
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
        self.common.serialize(
            ser,
            VU_PROTOCOL_ID_LENGTH + Self::HEADER_LENGTH + self.payload.len(),
        )?;
        let word = (u16::from(self.unsolicited) << 15) | (self.command_type.value() & 0x7FFF);
        ser.write_bytes(&VuProtocolIdentifier::MILAN.to_bytes())?
            .write_u16(word)?
            .write_bytes(&self.payload)?;
        Ok(())
    }

    /// `data` holds everything after the protocol identifier.
    pub(crate) fn deserialize(common: AecpCommonHeader, data: &[u8]) -> Result<Self, PduError> {
        if data.len() < Self::HEADER_LENGTH {
            return Err(PduError::ControlDataLengthTooSmall {
                declared: AECPDU_COMMON_HEADER_LENGTH + VU_PROTOCOL_ID_LENGTH + data.len(),
                minimum: Self::MINIMUM_CONTROL_DATA_LENGTH,
            });
        }
        let word = u16::from_be_bytes([data[0], data[1]]);
        Ok(Self {
            common,
            unsolicited: word & 0x8000 != 0,
            command_type: MvuCommandType(word & 0x7FFF),
            payload: Bytes::copy_from_slice(&data[Self::HEADER_LENGTH..]),
        })
    }
}

/// Registry delegate for the Milan protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct MvuDelegate;

impl VuDelegate for MvuDelegate {
    fn protocol_id(&self) -> VuProtocolIdentifier {
        VuProtocolIdentifier::MILAN
    }

    fn deserialize(&self, common: AecpCommonHeader, data: &[u8]) -> Result<Aecpdu, PduError> {
        MvuAecpdu::deserialize(common, data).map(Aecpdu::Mvu)
    }

    fn command_timeout(&self) -> Duration {
        MVU_COMMAND_TIMEOUT
    }

    fn is_expected_response(&self, command: &Aecpdu, response: &Aecpdu) -> bool {
        match (command, response) {
            (Aecpdu::Mvu(command), Aecpdu::Mvu(response)) => {
                command.command_type == response.command_type
            }
            _ => false,
        }
    }
}
