//! ADP: AVDECC Discovery Protocol data unit

use super::avtpdu::AvtpControlHeader;
use super::defines::{
    ADP_DEFAULT_VALID_TIME, ADPDU_CONTROL_DATA_LENGTH, AVTP_SUBTYPE_ADP, AdpMessageType,
    ControllerCapabilities, EntityCapabilities, ListenerCapabilities, TalkerCapabilities,
};
use super::error::PduError;
use super::serialization::{Deserializer, Serializer};
use crate::types::{PayloadPolicy, UniqueIdentifier};

/// ADP data unit (AVTP header plus 56 bytes of control data)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adpdu {
    /// Available, departing or discover
    pub message_type: AdpMessageType,
    /// Validity period in 2-second units (5 bits)
    pub valid_time: u8,
    /// Advertised entity, or the discover target
    pub entity_id: UniqueIdentifier,
    /// Entity model ID
    pub entity_model_id: UniqueIdentifier,
    /// Entity capabilities
    pub entity_capabilities: EntityCapabilities,
    /// Number of talker stream sources
    pub talker_stream_sources: u16,
    /// Talker capabilities
    pub talker_capabilities: TalkerCapabilities,
    /// Number of listener stream sinks
    pub listener_stream_sinks: u16,
    /// Listener capabilities
    pub listener_capabilities: ListenerCapabilities,
    /// Controller capabilities
    pub controller_capabilities: ControllerCapabilities,
    /// Incremented on every advertisement
    pub available_index: u32,
    /// gPTP grandmaster ID
    pub gptp_grandmaster_id: UniqueIdentifier,
    /// gPTP domain number
    pub gptp_domain_number: u8,
    /// CONTROL descriptor index used for identification
    pub identify_control_index: u16,
    /// AVB_INTERFACE descriptor index this advertisement is sent from
    pub interface_index: u16,
    /// Association ID
    pub association_id: UniqueIdentifier,
}

impl Default for Adpdu {
    fn default() -> Self {
        Self {
            message_type: AdpMessageType::ENTITY_AVAILABLE,
            valid_time: ADP_DEFAULT_VALID_TIME,
            entity_id: UniqueIdentifier::NULL,
            entity_model_id: UniqueIdentifier::NULL,
            entity_capabilities: EntityCapabilities::NONE,
            talker_stream_sources: 0,
            talker_capabilities: TalkerCapabilities::NONE,
            listener_stream_sinks: 0,
            listener_capabilities: ListenerCapabilities::NONE,
            controller_capabilities: ControllerCapabilities::NONE,
            available_index: 0,
            gptp_grandmaster_id: UniqueIdentifier::NULL,
            gptp_domain_number: 0,
            identify_control_index: 0,
            interface_index: 0,
            association_id: UniqueIdentifier::NULL,
        }
    }
}

impl Adpdu {
    /// Bytes written after the AVTP header
    pub const CONTROL_DATA_LENGTH: usize = ADPDU_CONTROL_DATA_LENGTH;

    /// ENTITY_DISCOVER targeting one entity, or every entity when `target` is null
    #[must_use]
    pub fn discover(target: UniqueIdentifier) -> Self {
        Self {
            message_type: AdpMessageType::ENTITY_DISCOVER,
            valid_time: 0,
            entity_id: target,
            ..Self::default()
        }
    }

    /// Validity period in seconds
    #[must_use]
    pub fn valid_time_seconds(&self) -> u32 {
        u32::from(self.valid_time) * 2
    }

    /// Append the PDU (AVTP header included).
    ///
    /// # Errors
    ///
    /// Fails if the serializer has fewer than 68 bytes left.
    pub fn serialize<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), PduError> {
        let header = AvtpControlHeader {
            control_data: self.message_type.value() & 0x0F,
            status: self.valid_time & 0x1F,
            // 56 always fits the 11-bit field
            control_data_length: 56,
            stream_id: self.entity_id.value(),
            ..AvtpControlHeader::new(AVTP_SUBTYPE_ADP)
        };
        ser.pack(&header)?
            .pack(&self.entity_model_id)?
            .write_u32(self.entity_capabilities.bits())?
            .write_u16(self.talker_stream_sources)?
            .write_u16(self.talker_capabilities.bits())?
            .write_u16(self.listener_stream_sinks)?
            .write_u16(self.listener_capabilities.bits())?
            .write_u32(self.controller_capabilities.bits())?
            .write_u32(self.available_index)?
            .pack(&self.gptp_grandmaster_id)?
            .write_u32(u32::from(self.gptp_domain_number) << 24)?
            .write_u16(self.identify_control_index)?
            .write_u16(self.interface_index)?
            .pack(&self.association_id)?
            .write_u32(0)?;
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
        let message_type = AdpMessageType(header.control_data);
        if message_type.name().is_none() {
            return Err(PduError::UnknownMessageType {
                subtype: AVTP_SUBTYPE_ADP,
                message_type: header.control_data,
            });
        }

        if des.remaining() < ADPDU_CONTROL_DATA_LENGTH {
            return Err(PduError::IncorrectPayloadSize {
                expected: ADPDU_CONTROL_DATA_LENGTH,
                actual: des.remaining(),
            });
        }
        header.checked_control_data_length(ADPDU_CONTROL_DATA_LENGTH, des.remaining(), policy)?;

        let entity_model_id = des.unpack()?;
        let entity_capabilities = EntityCapabilities::from_bits(des.read_u32()?);
        let talker_stream_sources = des.read_u16()?;
        let talker_capabilities = TalkerCapabilities::from_bits(des.read_u16()?);
        let listener_stream_sinks = des.read_u16()?;
        let listener_capabilities = ListenerCapabilities::from_bits(des.read_u16()?);
        let controller_capabilities = ControllerCapabilities::from_bits(des.read_u32()?);
        let available_index = des.read_u32()?;
        let gptp_grandmaster_id = des.unpack()?;
        let gptp_domain_number = des.read_u8()?;
        des.skip(3)?;
        let identify_control_index = des.read_u16()?;
        let interface_index = des.read_u16()?;
        let association_id = des.unpack()?;
        des.skip(4)?;

        Ok(Self {
            message_type,
            valid_time: header.status,
            entity_id: UniqueIdentifier::new(header.stream_id),
            entity_model_id,
            entity_capabilities,
            talker_stream_sources,
            talker_capabilities,
            listener_stream_sinks,
            listener_capabilities,
            controller_capabilities,
            available_index,
            gptp_grandmaster_id,
            gptp_domain_number,
            identify_control_index,
            interface_index,
            association_id,
        })
    }
}
