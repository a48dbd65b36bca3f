//! Builders for entities, models and frames used in tests
//!
//! These helpers skip validation where it is in the way and produce values
//! that are valid when it is not.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::entity::{
    AvbInterfaceIndex, CommonInformation, Entity, GLOBAL_AVB_INTERFACE_INDEX,
    InterfaceInformation,
};
use crate::model::{
    AudioUnitDescriptor, AvbInterfaceDescriptor, ClockDomainDescriptor, ClockSourceDescriptor,
    ConfigurationTree, EntityTree, SamplingRate, StreamDescriptor, StreamFormat,
};
use crate::protocol::defines::{
    ADP_MULTICAST_MAC, AdpMessageType, ControllerCapabilities, EntityCapabilities,
    ListenerCapabilities, TalkerCapabilities,
};
use crate::protocol::{Adpdu, Pdu, PduError, encode_frame};
use crate::types::{AvdeccFixedString, MacAddress, UniqueIdentifier};

/// Entity ID with a fixed vendor prefix
#[must_use]
pub const fn entity_id(n: u32) -> UniqueIdentifier {
    UniqueIdentifier::new(0x001B_92FF_FE00_0000 | n as u64)
}

/// Locally administered unicast address ending in `n`
#[must_use]
pub const fn mac_address(n: u8) -> MacAddress {
    MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, n])
}

/// Talker and listener with two streams each and AEM support
#[must_use]
pub fn common_information(entity_id: UniqueIdentifier) -> CommonInformation {
    CommonInformation {
        entity_id,
        entity_model_id: UniqueIdentifier::new(0x001B_92FF_0000_0001),
        entity_capabilities: EntityCapabilities::AEM_SUPPORTED,
        talker_stream_sources: 2,
        talker_capabilities: TalkerCapabilities::IMPLEMENTED | TalkerCapabilities::AUDIO_SOURCE,
        listener_stream_sinks: 2,
        listener_capabilities: ListenerCapabilities::IMPLEMENTED
            | ListenerCapabilities::AUDIO_SINK,
        controller_capabilities: ControllerCapabilities::NONE,
        identify_control_index: None,
        association_id: None,
    }
}

/// Single global interface on `mac_address`
#[must_use]
pub fn interfaces(
    mac_address: MacAddress,
) -> BTreeMap<AvbInterfaceIndex, InterfaceInformation> {
    BTreeMap::from([(
        GLOBAL_AVB_INTERFACE_INDEX,
        InterfaceInformation::new(mac_address),
    )])
}

/// Valid talker/listener entity on one interface
///
/// # Panics
///
/// Panics if `entity_id` is not a valid ID.
#[must_use]
pub fn test_entity(entity_id: UniqueIdentifier, mac_address: MacAddress) -> Entity {
    Entity::new(common_information(entity_id), interfaces(mac_address))
        .expect("test entity is valid")
}

/// One configuration with an audio unit, two streams each way, one AVB
/// interface, one clock source and one clock domain
#[must_use]
pub fn sample_entity_tree() -> EntityTree {
    let format = StreamFormat(0x0205_0220_0040_0800);
    let stream = |name: &str| StreamDescriptor {
        object_name: AvdeccFixedString::new(name),
        current_format: format,
        formats: vec![format],
        ..StreamDescriptor::default()
    };

    let mut configuration = ConfigurationTree::new("Default");
    configuration.audio_units.push(AudioUnitDescriptor {
        object_name: AvdeccFixedString::new("Audio Unit"),
        current_sampling_rate: SamplingRate::from_hz(48_000),
        sampling_rates: vec![SamplingRate::from_hz(48_000), SamplingRate::from_hz(96_000)],
        ..AudioUnitDescriptor::default()
    });
    configuration.stream_inputs.push(stream("Input 1"));
    configuration.stream_inputs.push(stream("Input 2"));
    configuration.stream_outputs.push(stream("Output 1"));
    configuration.stream_outputs.push(stream("Output 2"));
    configuration.avb_interfaces.push(AvbInterfaceDescriptor {
        object_name: AvdeccFixedString::new("Port 1"),
        ..AvbInterfaceDescriptor::default()
    });
    configuration.clock_sources.push(ClockSourceDescriptor {
        object_name: AvdeccFixedString::new("Internal"),
        ..ClockSourceDescriptor::default()
    });
    configuration.clock_domains.push(ClockDomainDescriptor {
        object_name: AvdeccFixedString::new("Domain"),
        clock_source_index: 0,
        clock_sources: vec![0],
        ..ClockDomainDescriptor::default()
    });

    let mut tree = EntityTree::with_configuration("Test Entity", configuration);
    tree.group_name = AvdeccFixedString::new("Test Group");
    tree
}

/// ENTITY_AVAILABLE frame for `entity` sent from its first interface
///
/// # Errors
///
/// Fails if the PDU does not serialize.
pub fn entity_available_frame(entity: &Entity) -> Result<Bytes, PduError> {
    adp_frame(entity, AdpMessageType::ENTITY_AVAILABLE)
}

/// ENTITY_DEPARTING frame for `entity`
///
/// # Errors
///
/// Fails if the PDU does not serialize.
pub fn entity_departing_frame(entity: &Entity) -> Result<Bytes, PduError> {
    adp_frame(entity, AdpMessageType::ENTITY_DEPARTING)
}

fn adp_frame(entity: &Entity, message_type: AdpMessageType) -> Result<Bytes, PduError> {
    let (index, info) = entity
        .interfaces()
        .iter()
        .next()
        .expect("entities have at least one interface");
    let adpdu: Adpdu = entity.to_adpdu(message_type, *index, info);
    encode_frame(ADP_MULTICAST_MAC, info.mac_address, &Pdu::Adp(adpdu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Frame, FrameDecoder};

    #[test]
    fn test_sample_tree_is_valid() {
        assert!(sample_entity_tree().validate().is_ok());
    }

    #[test]
    fn test_entity_available_frame_decodes() {
        let entity = test_entity(entity_id(1), mac_address(1));
        let frame = entity_available_frame(&entity).unwrap();

        let Frame {
            dest_address,
            src_address,
            pdu,
        } = FrameDecoder::default().decode(&frame).unwrap();
        assert_eq!(dest_address, ADP_MULTICAST_MAC);
        assert_eq!(src_address, mac_address(1));
        match pdu {
            Pdu::Adp(adpdu) => {
                assert_eq!(adpdu.message_type, AdpMessageType::ENTITY_AVAILABLE);
                assert_eq!(adpdu.entity_id, entity_id(1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
