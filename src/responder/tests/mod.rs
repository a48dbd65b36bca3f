use std::sync::Arc;

use crate::entity::Entity;
use crate::model::{Descriptor, MilanInfo, MilanInfoFeaturesFlags, SamplingRate, StreamFormat};
use crate::protocol::defines::{
    AaAecpStatus, AecpMessageType, AemAecpStatus, AemCommandType, DescriptorType, MvuAecpStatus,
    MvuCommandType,
};
use crate::protocol::payloads::{aem, descriptors, mvu};
use crate::controller::MvuCommandStatus;
use crate::protocol::{AaAecpdu, AemAecpdu, Aecpdu, MvuAecpdu, PduError, Tlv};
use crate::responder::{AemCommandDispatcher, AemHandler, AemResponse, UnsolicitedSubscriber};
use crate::testing::{entity_id, mac_address, sample_entity_tree, test_entity};
use crate::types::UniqueIdentifier;

const CONTROLLER: UniqueIdentifier = entity_id(0xC0);

fn entity() -> Entity {
    test_entity(entity_id(1), mac_address(1))
}

fn handler() -> AemHandler {
    AemHandler::new(Some(sample_entity_tree())).unwrap()
}

fn command(command_type: AemCommandType, payload: &[u8]) -> Aecpdu {
    AemAecpdu::command(entity_id(1), CONTROLLER, command_type, payload)
        .unwrap()
        .into()
}

fn answer(handler: &mut AemHandler, command: &Aecpdu) -> AemAecpdu {
    match handler.handle(&entity(), command, mac_address(0xC0)) {
        Some(Aecpdu::Aem(response)) => response,
        other => panic!("unexpected response {other:?}"),
    }
}

fn read(handler: &mut AemHandler, descriptor_type: DescriptorType, index: u16) -> AemAecpdu {
    let payload = descriptors::serialize_read_descriptor_command(0, descriptor_type, index).unwrap();
    answer(
        handler,
        &command(AemCommandType::READ_DESCRIPTOR, payload.data()),
    )
}

#[test]
fn test_read_entity_descriptor_uses_live_entity() {
    let mut handler = handler();
    let response = read(&mut handler, DescriptorType::ENTITY, 0);

    assert_eq!(response.common.message_type, AecpMessageType::AEM_RESPONSE);
    assert_eq!(response.status(), AemAecpStatus::SUCCESS);
    let decoded =
        descriptors::deserialize_read_descriptor_response(response.payload(), response.status())
            .unwrap();
    match decoded.descriptor {
        Some(Descriptor::Entity(descriptor)) => {
            assert_eq!(descriptor.entity_id, entity_id(1));
            assert_eq!(descriptor.entity_name.to_string_lossy(), "Test Entity");
            assert_eq!(descriptor.group_name.to_string_lossy(), "Test Group");
            assert_eq!(descriptor.configurations_count, 1);
            assert_eq!(descriptor.talker_stream_sources, 2);
        }
        other => panic!("unexpected descriptor {other:?}"),
    }
}

#[test]
fn test_read_configuration_and_stream_descriptors() {
    let mut handler = handler();

    let response = read(&mut handler, DescriptorType::CONFIGURATION, 0);
    assert_eq!(response.status(), AemAecpStatus::SUCCESS);
    let decoded =
        descriptors::deserialize_read_descriptor_response(response.payload(), response.status())
            .unwrap();
    assert!(matches!(decoded.descriptor, Some(Descriptor::Configuration(_))));

    let response = read(&mut handler, DescriptorType::STREAM_OUTPUT, 1);
    assert_eq!(response.status(), AemAecpStatus::SUCCESS);
    let decoded =
        descriptors::deserialize_read_descriptor_response(response.payload(), response.status())
            .unwrap();
    assert_eq!(decoded.descriptor_index, 1);
    match decoded.descriptor {
        Some(Descriptor::StreamOutput(stream)) => {
            assert_eq!(stream.object_name.to_string_lossy(), "Output 2");
        }
        other => panic!("unexpected descriptor {other:?}"),
    }
}

#[test]
fn test_unknown_descriptor_index() {
    let mut handler = handler();
    assert_eq!(
        read(&mut handler, DescriptorType::STREAM_INPUT, 2).status(),
        AemAecpStatus::NO_SUCH_DESCRIPTOR
    );
    assert_eq!(
        read(&mut handler, DescriptorType::JACK_INPUT, 0).status(),
        AemAecpStatus::NO_SUCH_DESCRIPTOR
    );
}

#[test]
fn test_entity_descriptor_requires_zero_indices() {
    let mut handler = handler();
    assert_eq!(
        read(&mut handler, DescriptorType::ENTITY, 1).status(),
        AemAecpStatus::BAD_ARGUMENTS
    );

    let payload =
        descriptors::serialize_read_descriptor_command(1, DescriptorType::ENTITY, 0).unwrap();
    let response = answer(
        &mut handler,
        &command(AemCommandType::READ_DESCRIPTOR, payload.data()),
    );
    assert_eq!(response.status(), AemAecpStatus::BAD_ARGUMENTS);
}

#[test]
fn test_short_payload_is_bad_arguments() {
    let mut handler = handler();
    let response = answer(&mut handler, &command(AemCommandType::READ_DESCRIPTOR, &[0, 0]));
    assert_eq!(response.status(), AemAecpStatus::BAD_ARGUMENTS);
}

#[test]
fn test_get_name() {
    let mut handler = handler();

    let payload = aem::serialize_get_name_command(DescriptorType::ENTITY, 0, 1, 0).unwrap();
    let response = answer(&mut handler, &command(AemCommandType::GET_NAME, payload.data()));
    assert_eq!(response.status(), AemAecpStatus::SUCCESS);
    let (_, _, name_index, _, name) = aem::deserialize_name(response.payload()).unwrap();
    assert_eq!(name_index, 1);
    assert_eq!(name.to_string_lossy(), "Test Group");

    let payload = aem::serialize_get_name_command(DescriptorType::STREAM_INPUT, 0, 0, 0).unwrap();
    let response = answer(&mut handler, &command(AemCommandType::GET_NAME, payload.data()));
    let (_, _, _, _, name) = aem::deserialize_name(response.payload()).unwrap();
    assert_eq!(name.to_string_lossy(), "Input 1");

    let payload = aem::serialize_get_name_command(DescriptorType::ENTITY, 0, 2, 0).unwrap();
    let response = answer(&mut handler, &command(AemCommandType::GET_NAME, payload.data()));
    assert_eq!(response.status(), AemAecpStatus::BAD_ARGUMENTS);
}

#[test]
fn test_get_current_values() {
    let mut handler = handler();

    let payload = aem::serialize_descriptor_reference(DescriptorType::STREAM_INPUT, 0).unwrap();
    let response = answer(
        &mut handler,
        &command(AemCommandType::GET_STREAM_FORMAT, payload.data()),
    );
    let (_, _, format) = aem::deserialize_stream_format(response.payload()).unwrap();
    assert_eq!(format, StreamFormat(0x0205_0220_0040_0800));

    let payload = aem::serialize_descriptor_reference(DescriptorType::AUDIO_UNIT, 0).unwrap();
    let response = answer(
        &mut handler,
        &command(AemCommandType::GET_SAMPLING_RATE, payload.data()),
    );
    let (_, _, rate) = aem::deserialize_sampling_rate(response.payload()).unwrap();
    assert_eq!(rate, SamplingRate::from_hz(48_000));

    let payload = aem::serialize_descriptor_reference(DescriptorType::CLOCK_DOMAIN, 0).unwrap();
    let response = answer(
        &mut handler,
        &command(AemCommandType::GET_CLOCK_SOURCE, payload.data()),
    );
    assert_eq!(aem::deserialize_clock_source(response.payload()).unwrap().2, 0);

    let response = answer(&mut handler, &command(AemCommandType::GET_CONFIGURATION, &[]));
    assert_eq!(aem::deserialize_configuration(response.payload()).unwrap(), 0);
}

#[test]
fn test_uncovered_command_without_dispatcher() {
    let mut handler = handler();
    let payload = aem::serialize_descriptor_reference(DescriptorType::STREAM_INPUT, 0).unwrap();
    let response = answer(
        &mut handler,
        &command(AemCommandType::START_STREAMING, payload.data()),
    );
    assert_eq!(response.status(), AemAecpStatus::NOT_IMPLEMENTED);
    assert_eq!(response.payload(), payload.data());
}

#[test]
fn test_read_descriptor_without_tree_is_not_implemented() {
    let mut handler = AemHandler::new(None).unwrap();
    assert_eq!(
        read(&mut handler, DescriptorType::ENTITY, 0).status(),
        AemAecpStatus::NOT_IMPLEMENTED
    );
    let response = answer(&mut handler, &command(AemCommandType::ENTITY_AVAILABLE, &[]));
    assert_eq!(response.status(), AemAecpStatus::SUCCESS);
}

struct StreamingDispatcher;

impl AemCommandDispatcher for StreamingDispatcher {
    fn handle_aem_command(&self, _entity: &Entity, command: &AemAecpdu) -> Option<AemResponse> {
        match command.command_type {
            AemCommandType::START_STREAMING => Some(AemResponse::reflect(AemAecpStatus::SUCCESS)),
            AemCommandType::GET_ASSOCIATION_ID => Some(AemResponse::success(
                aem::serialize_association_id(entity_id(0xA5))
                    .unwrap()
                    .data()
                    .to_vec(),
            )),
            AemCommandType::REBOOT => panic!("reboot is not allowed in tests"),
            _ => None,
        }
    }
}

#[test]
fn test_dispatcher_answers_uncovered_commands() {
    let mut handler = handler().with_dispatcher(Arc::new(StreamingDispatcher));

    let payload = aem::serialize_descriptor_reference(DescriptorType::STREAM_INPUT, 1).unwrap();
    let response = answer(
        &mut handler,
        &command(AemCommandType::START_STREAMING, payload.data()),
    );
    assert_eq!(response.status(), AemAecpStatus::SUCCESS);
    assert_eq!(response.payload(), payload.data());

    let response = answer(&mut handler, &command(AemCommandType::GET_ASSOCIATION_ID, &[]));
    assert_eq!(
        aem::deserialize_association_id(response.payload()).unwrap(),
        entity_id(0xA5)
    );

    let response = answer(&mut handler, &command(AemCommandType::STOP_STREAMING, &[]));
    assert_eq!(response.status(), AemAecpStatus::NOT_IMPLEMENTED);
}

#[test]
fn test_dispatcher_panic_is_entity_misbehaving() {
    let mut handler = handler().with_dispatcher(Arc::new(StreamingDispatcher));
    let payload = aem::serialize_descriptor_reference(DescriptorType::ENTITY, 0).unwrap();
    let response = answer(&mut handler, &command(AemCommandType::REBOOT, payload.data()));
    assert_eq!(response.status(), AemAecpStatus::ENTITY_MISBEHAVING);
}

#[test]
fn test_unsolicited_registration() {
    let mut handler = handler();
    answer(
        &mut handler,
        &command(AemCommandType::REGISTER_UNSOLICITED_NOTIFICATION, &[]),
    );
    // registering twice keeps one entry
    answer(
        &mut handler,
        &command(AemCommandType::REGISTER_UNSOLICITED_NOTIFICATION, &[]),
    );
    assert_eq!(
        handler.subscribers(),
        &[UnsolicitedSubscriber {
            controller_entity_id: CONTROLLER,
            mac_address: mac_address(0xC0),
        }]
    );

    let response = answer(
        &mut handler,
        &command(AemCommandType::DEREGISTER_UNSOLICITED_NOTIFICATION, &[]),
    );
    assert_eq!(response.status(), AemAecpStatus::SUCCESS);
    assert!(handler.subscribers().is_empty());
}

#[test]
fn test_milan_info() {
    let info = MilanInfo {
        protocol_version: 1,
        features_flags: MilanInfoFeaturesFlags::REDUNDANCY,
        certification_version: 0x0102_0304,
    };
    let payload = mvu::serialize_get_milan_info_command().unwrap();
    let command: Aecpdu = MvuAecpdu::command(
        entity_id(1),
        CONTROLLER,
        MvuCommandType::GET_MILAN_INFO,
        payload.data(),
    )
    .unwrap()
    .into();

    let mut without = handler();
    match without.handle(&entity(), &command, mac_address(0xC0)) {
        Some(Aecpdu::Mvu(response)) => {
            assert_eq!(response.status(), MvuAecpStatus::NOT_IMPLEMENTED);
        }
        other => panic!("unexpected response {other:?}"),
    }

    let mut with = handler().with_milan_info(info);
    match with.handle(&entity(), &command, mac_address(0xC0)) {
        Some(Aecpdu::Mvu(response)) => {
            assert_eq!(response.status(), MvuAecpStatus::SUCCESS);
            assert_eq!(
                mvu::deserialize_get_milan_info_response(response.payload()).unwrap(),
                info
            );
        }
        other => panic!("unexpected response {other:?}"),
    }
}

#[test]
fn test_milan_info_build_failure_is_entity_misbehaving() {
    let failure = PduError::IncorrectPayloadSize {
        expected: 4,
        actual: 0,
    };
    assert_eq!(
        super::handler::milan_info_status(Err(failure)),
        MvuAecpStatus::ENTITY_MISBEHAVING
    );
    assert_eq!(
        super::handler::milan_info_status(Ok(())),
        MvuAecpStatus::SUCCESS
    );
    assert_eq!(
        MvuCommandStatus::from(MvuAecpStatus::ENTITY_MISBEHAVING),
        MvuCommandStatus::ENTITY_MISBEHAVING
    );
    assert_eq!(
        MvuCommandStatus::ENTITY_MISBEHAVING.description(),
        Some("Entity misbehaving")
    );
}

#[test]
fn test_address_access_not_implemented() {
    let command: Aecpdu = AaAecpdu::command(entity_id(1), CONTROLLER, [Tlv::read(0x1000, 4).unwrap()])
        .unwrap()
        .into();
    match handler().handle(&entity(), &command, mac_address(0xC0)) {
        Some(Aecpdu::Aa(response)) => assert_eq!(response.status(), AaAecpStatus::NOT_IMPLEMENTED),
        other => panic!("unexpected response {other:?}"),
    }
}

#[test]
fn test_responses_are_not_answered() {
    let response = command(AemCommandType::ENTITY_AVAILABLE, &[])
        .response_copy()
        .unwrap();
    assert!(handler().handle(&entity(), &response, mac_address(0xC0)).is_none());
}
