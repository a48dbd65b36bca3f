//! AECP: AVDECC Enumeration and Control Protocol.
//!
//! Every AECPDU starts with the AVTP control header (target entity ID in
//! the stream ID field) followed by the controller entity ID and a 16-bit
//! sequence ID. The rest depends on the message type; [`Aecpdu`] carries
//! the decoded variant.

use super::aa_aecpdu::AaAecpdu;
use super::aem_aecpdu::AemAecpdu;
use super::avtpdu::{AvtpControlHeader, control_data_length};
use super::defines::{
    AECP_MAXIMUM_RECEIVE_LENGTH, AECPDU_COMMON_HEADER_LENGTH, AVTP_SUBTYPE_AECP, AecpMessageType,
    VU_PROTOCOL_ID_LENGTH,
};
use super::error::PduError;
use super::mvu_aecpdu::MvuAecpdu;
use super::serialization::{Deserializer, Serializer};
use super::vu_aecpdu::{VuAecpdu, VuProtocolIdentifier, VuRegistry};
use crate::types::{PayloadPolicy, UniqueIdentifier};

/// Fields shared by every AECPDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AecpCommonHeader {
    /// Command or response kind
    pub message_type: AecpMessageType,
    /// Raw 5-bit status; each sub-protocol interprets it with its own vocabulary
    pub status: u8,
    /// Entity the command is addressed to
    pub target_entity_id: UniqueIdentifier,
    /// Entity that sent the command
    pub controller_entity_id: UniqueIdentifier,
    /// Correlates responses with commands
    pub sequence_id: u16,
}

impl AecpCommonHeader {
    /// Header with null addressing for the given message type
    #[must_use]
    pub fn new(message_type: AecpMessageType) -> Self {
        Self {
            message_type,
            status: 0,
            target_entity_id: UniqueIdentifier::NULL,
            controller_entity_id: UniqueIdentifier::NULL,
            sequence_id: 0,
        }
    }

    /// Write the AVTP header and common fields; `specific_length` is the
    /// number of bytes the sub-protocol will append.
    pub(crate) fn serialize<const N: usize>(
        &self,
        ser: &mut Serializer<N>,
        specific_length: usize,
    ) -> Result<(), PduError> {
        let header = AvtpControlHeader {
            control_data: self.message_type.value() & 0x0F,
            status: self.status & 0x1F,
            control_data_length: control_data_length(
                AECPDU_COMMON_HEADER_LENGTH + specific_length,
            )?,
            stream_id: self.target_entity_id.value(),
            ..AvtpControlHeader::new(AVTP_SUBTYPE_AECP)
        };
        ser.pack(&header)?
            .pack(&self.controller_entity_id)?
            .write_u16(self.sequence_id)?;
        Ok(())
    }

    /// Read the common fields and return them with the sub-protocol bytes.
    ///
    /// `minimum_specific` is the smallest sub-protocol header the message
    /// type allows.
    pub(crate) fn deserialize<'a>(
        header: &AvtpControlHeader,
        des: &mut Deserializer<'a>,
        minimum_specific: usize,
        policy: PayloadPolicy,
    ) -> Result<(Self, &'a [u8]), PduError> {
        if des.remaining() < AECPDU_COMMON_HEADER_LENGTH {
            return Err(PduError::IncorrectPayloadSize {
                expected: AECPDU_COMMON_HEADER_LENGTH,
                actual: des.remaining(),
            });
        }

        let mut length = header.checked_control_data_length(
            AECPDU_COMMON_HEADER_LENGTH + minimum_specific,
            des.remaining(),
            policy,
        )?;
        if length > AECP_MAXIMUM_RECEIVE_LENGTH {
            if !policy.is_tolerant() {
                return Err(PduError::PayloadTooLarge {
                    length,
                    maximum: AECP_MAXIMUM_RECEIVE_LENGTH,
                });
            }
            tracing::warn!(
                length,
                maximum = AECP_MAXIMUM_RECEIVE_LENGTH,
                "AECPDU exceeds maximum length, clamping"
            );
            length = AECP_MAXIMUM_RECEIVE_LENGTH;
        }

        let common = Self {
            message_type: AecpMessageType(header.control_data),
            status: header.status,
            target_entity_id: UniqueIdentifier::new(header.stream_id),
            controller_entity_id: des.unpack()?,
            sequence_id: des.read_u16()?,
        };
        let specific = des.read_bytes(length - AECPDU_COMMON_HEADER_LENGTH)?;
        Ok((common, specific))
    }
}

/// A decoded AECPDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aecpdu {
    /// AEM command or response
    Aem(AemAecpdu),
    /// Address Access command or response
    Aa(AaAecpdu),
    /// Milan vendor-unique command or response
    Mvu(MvuAecpdu),
    /// Vendor-unique PDU of a user-registered protocol, carried opaque
    Vu(VuAecpdu),
}

impl Aecpdu {
    /// Common header
    #[must_use]
    pub fn common(&self) -> &AecpCommonHeader {
        match self {
            Self::Aem(pdu) => &pdu.common,
            Self::Aa(pdu) => &pdu.common,
            Self::Mvu(pdu) => &pdu.common,
            Self::Vu(pdu) => &pdu.common,
        }
    }

    /// Mutable common header
    pub fn common_mut(&mut self) -> &mut AecpCommonHeader {
        match self {
            Self::Aem(pdu) => &mut pdu.common,
            Self::Aa(pdu) => &mut pdu.common,
            Self::Mvu(pdu) => &mut pdu.common,
            Self::Vu(pdu) => &mut pdu.common,
        }
    }

    /// Message type
    #[must_use]
    pub fn message_type(&self) -> AecpMessageType {
        self.common().message_type
    }

    /// Target entity
    #[must_use]
    pub fn target_entity_id(&self) -> UniqueIdentifier {
        self.common().target_entity_id
    }

    /// Controller entity
    #[must_use]
    pub fn controller_entity_id(&self) -> UniqueIdentifier {
        self.common().controller_entity_id
    }

    /// Sequence ID
    #[must_use]
    pub fn sequence_id(&self) -> u16 {
        self.common().sequence_id
    }

    /// Raw status
    #[must_use]
    pub fn status(&self) -> u8 {
        self.common().status
    }

    /// Whether this PDU is a command
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.message_type().is_command()
    }

    /// Whether this is an unsolicited response
    #[must_use]
    pub fn is_unsolicited(&self) -> bool {
        match self {
            Self::Aem(pdu) => pdu.unsolicited,
            Self::Mvu(pdu) => pdu.unsolicited,
            Self::Aa(_) | Self::Vu(_) => false,
        }
    }

    /// Protocol identifier of vendor-unique PDUs
    #[must_use]
    pub fn vendor_protocol_id(&self) -> Option<VuProtocolIdentifier> {
        match self {
            Self::Mvu(_) => Some(VuProtocolIdentifier::MILAN),
            Self::Vu(pdu) => Some(pdu.protocol_id),
            Self::Aem(_) | Self::Aa(_) => None,
        }
    }

    /// Derive the response to this command: same addressing and payload,
    /// message type flipped to its response kind.
    ///
    /// Returns `None` when `self` is not a command.
    #[must_use]
    pub fn response_copy(&self) -> Option<Self> {
        if !self.is_command() {
            return None;
        }
        let mut copy = self.clone();
        let common = copy.common_mut();
        common.message_type = common.message_type.response_type();
        match &mut copy {
            Self::Aem(pdu) => pdu.unsolicited = false,
            Self::Mvu(pdu) => pdu.unsolicited = false,
            Self::Aa(_) | Self::Vu(_) => {}
        }
        Some(copy)
    }

    /// Append the PDU (AVTP header included).
    ///
    /// # Errors
    ///
    /// Fails when the serializer is too small for the PDU.
    pub fn serialize<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), PduError> {
        match self {
            Self::Aem(pdu) => pdu.serialize(ser),
            Self::Aa(pdu) => pdu.serialize(ser),
            Self::Mvu(pdu) => pdu.serialize(ser),
            Self::Vu(pdu) => pdu.serialize(ser),
        }
    }

    /// Decode the bytes following an already parsed AVTP header.
    ///
    /// Vendor-unique PDUs are handed to the delegate registered for their
    /// protocol identifier; unknown identifiers are rejected.
    ///
    /// # Errors
    ///
    /// Any length, message type or vendor protocol error.
    pub fn deserialize(
        header: &AvtpControlHeader,
        des: &mut Deserializer<'_>,
        registry: &VuRegistry,
        policy: PayloadPolicy,
    ) -> Result<Self, PduError> {
        let message_type = AecpMessageType(header.control_data);
        match message_type {
            AecpMessageType::AEM_COMMAND | AecpMessageType::AEM_RESPONSE => {
                let (common, data) = AecpCommonHeader::deserialize(
                    header,
                    des,
                    AemAecpdu::HEADER_LENGTH,
                    policy,
                )?;
                AemAecpdu::deserialize(common, data).map(Self::Aem)
            }
            AecpMessageType::ADDRESS_ACCESS_COMMAND | AecpMessageType::ADDRESS_ACCESS_RESPONSE => {
                let (common, data) =
                    AecpCommonHeader::deserialize(header, des, AaAecpdu::HEADER_LENGTH, policy)?;
                AaAecpdu::deserialize(common, data).map(Self::Aa)
            }
            AecpMessageType::VENDOR_UNIQUE_COMMAND | AecpMessageType::VENDOR_UNIQUE_RESPONSE => {
                let (common, data) =
                    AecpCommonHeader::deserialize(header, des, VU_PROTOCOL_ID_LENGTH, policy)?;
                let mut vu = Deserializer::new(data);
                let protocol_id = VuProtocolIdentifier::from_bytes(vu.read_array()?);
                let delegate = registry
                    .get(protocol_id)
                    .ok_or(PduError::UnknownVendorProtocol(protocol_id.value()))?;
                tracing::trace!(%protocol_id, "dispatching vendor-unique AECPDU");
                delegate.deserialize(common, vu.remaining_data())
            }
            _ => Err(PduError::UnknownMessageType {
                subtype: AVTP_SUBTYPE_AECP,
                message_type: header.control_data,
            }),
        }
    }
}

impl From<AemAecpdu> for Aecpdu {
    fn from(pdu: AemAecpdu) -> Self {
        Self::Aem(pdu)
    }
}

impl From<AaAecpdu> for Aecpdu {
    fn from(pdu: AaAecpdu) -> Self {
        Self::Aa(pdu)
    }
}

impl From<MvuAecpdu> for Aecpdu {
    fn from(pdu: MvuAecpdu) -> Self {
        Self::Mvu(pdu)
    }
}

impl From<VuAecpdu> for Aecpdu {
    fn from(pdu: VuAecpdu) -> Self {
        Self::Vu(pdu)
    }
}
