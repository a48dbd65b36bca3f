use std::collections::BTreeMap;

use crate::model::{
    AudioMapDescriptor, AudioMapping, AudioUnitDescriptor, ClockDomainDescriptor,
    ConfigurationDescriptor, Descriptor, DescriptorRange, EntityDescriptor, LocaleDescriptor,
    SamplingRate, StreamDescriptor, StreamFlags, StreamFormat, StringsDescriptor,
};
use crate::protocol::PduError;
use crate::protocol::defines::{AemAecpStatus, DescriptorType, EntityCapabilities};
use crate::protocol::payloads::descriptors::{
    ReadDescriptorResponse, body_length, deserialize_read_descriptor_command,
    deserialize_read_descriptor_response, serialize_read_descriptor_command,
    serialize_read_descriptor_response,
};
use crate::types::{AvdeccFixedString, UniqueIdentifier};

fn roundtrip(index: u16, descriptor: Descriptor) -> ReadDescriptorResponse {
    let ser = serialize_read_descriptor_response(0, index, &descriptor).unwrap();
    deserialize_read_descriptor_response(ser.data(), AemAecpStatus::SUCCESS).unwrap()
}

#[test]
fn test_read_descriptor_command() {
    let ser = serialize_read_descriptor_command(1, DescriptorType::STREAM_INPUT, 3).unwrap();
    assert_eq!(ser.data(), &[0, 1, 0, 0, 0, 5, 0, 3]);
    assert_eq!(
        deserialize_read_descriptor_command(ser.data()).unwrap(),
        (1, DescriptorType::STREAM_INPUT, 3)
    );
    assert!(matches!(
        deserialize_read_descriptor_command(&[0; 7]),
        Err(PduError::IncorrectPayloadSize {
            expected: 8,
            actual: 7
        })
    ));
}

#[test]
fn test_entity_descriptor() {
    let entity = EntityDescriptor {
        entity_id: UniqueIdentifier::new(0x0011_2233_4455_6677),
        entity_model_id: UniqueIdentifier::new(0x0011_2233_0000_0001),
        entity_capabilities: EntityCapabilities::AEM_SUPPORTED,
        available_index: 9,
        entity_name: AvdeccFixedString::new("Stage Box"),
        firmware_version: AvdeccFixedString::new("1.2.3"),
        configurations_count: 1,
        ..EntityDescriptor::default()
    };
    let ser = serialize_read_descriptor_response(0, 0, &Descriptor::Entity(entity.clone())).unwrap();
    assert_eq!(ser.used_bytes(), 8 + body_length::ENTITY);

    let response = deserialize_read_descriptor_response(ser.data(), AemAecpStatus::SUCCESS).unwrap();
    assert_eq!(response.descriptor_type, DescriptorType::ENTITY);
    assert_eq!(response.descriptor, Some(Descriptor::Entity(entity)));
}

#[test]
fn test_configuration_descriptor_counts() {
    let mut descriptor_counts = BTreeMap::new();
    descriptor_counts.insert(DescriptorType::STREAM_INPUT, 2);
    descriptor_counts.insert(DescriptorType::AVB_INTERFACE, 1);
    let configuration = ConfigurationDescriptor {
        object_name: AvdeccFixedString::new("Default"),
        descriptor_counts,
        ..ConfigurationDescriptor::default()
    };

    let response = roundtrip(0, Descriptor::Configuration(configuration.clone()));
    assert_eq!(response.descriptor, Some(Descriptor::Configuration(configuration)));
}

#[test]
fn test_variable_parts() {
    let audio_unit = AudioUnitDescriptor {
        stream_input_ports: DescriptorRange::new(1, 0),
        current_sampling_rate: SamplingRate::from_hz(48_000),
        sampling_rates: vec![SamplingRate::from_hz(48_000), SamplingRate::from_hz(96_000)],
        ..AudioUnitDescriptor::default()
    };
    let stream = StreamDescriptor {
        object_name: AvdeccFixedString::new("Input 1"),
        stream_flags: StreamFlags::CLASS_A,
        current_format: StreamFormat(0x0205_0220_0000_0000),
        formats: vec![StreamFormat(0x0205_0220_0000_0000), StreamFormat(0x0205_0240_0000_0000)],
        buffer_length: 2_000_000,
        ..StreamDescriptor::default()
    };
    let clock_domain = ClockDomainDescriptor {
        clock_source_index: 1,
        clock_sources: vec![0, 1, 2],
        ..ClockDomainDescriptor::default()
    };
    let audio_map = AudioMapDescriptor {
        mappings: vec![AudioMapping {
            stream_index: 0,
            stream_channel: 1,
            cluster_offset: 2,
            cluster_channel: 0,
        }],
    };

    for descriptor in [
        Descriptor::AudioUnit(audio_unit),
        Descriptor::StreamOutput(stream),
        Descriptor::ClockDomain(clock_domain),
        Descriptor::AudioMap(audio_map),
    ] {
        let response = roundtrip(2, descriptor.clone());
        assert_eq!(response.descriptor_index, 2);
        assert_eq!(response.descriptor, Some(descriptor));
    }
}

#[test]
fn test_locale_and_strings() {
    let locale = LocaleDescriptor {
        locale_id: AvdeccFixedString::new("en-US"),
        strings: DescriptorRange::new(1, 0),
    };
    let mut strings = StringsDescriptor::default();
    strings.strings[0] = AvdeccFixedString::new("Vendor");
    strings.strings[6] = AvdeccFixedString::new("Model");

    for descriptor in [Descriptor::Locale(locale), Descriptor::Strings(strings)] {
        assert_eq!(roundtrip(0, descriptor.clone()).descriptor, Some(descriptor));
    }
}

#[test]
fn test_stream_formats_after_extra_fields() {
    let stream = StreamDescriptor {
        formats: vec![StreamFormat(1)],
        ..StreamDescriptor::default()
    };
    let mut payload = serialize_read_descriptor_response(0, 0, &Descriptor::StreamInput(stream))
        .unwrap()
        .data()
        .to_vec();

    // Insert 8 bytes of redundancy data before the formats and move the offset
    let fixed_end = 8 + body_length::STREAM;
    payload.splice(fixed_end..fixed_end, [0xAA; 8]);
    let offset_position = 8 + 64 + 2 + 2 + 2 + 8;
    let offset = u16::try_from(fixed_end + 8 - 4).unwrap();
    payload[offset_position..offset_position + 2].copy_from_slice(&offset.to_be_bytes());

    let response = deserialize_read_descriptor_response(&payload, AemAecpStatus::SUCCESS).unwrap();
    match response.descriptor {
        Some(Descriptor::StreamInput(stream)) => assert_eq!(stream.formats, vec![StreamFormat(1)]),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_offset_inside_fixed_part() {
    let clock_domain = ClockDomainDescriptor {
        clock_sources: vec![0],
        ..ClockDomainDescriptor::default()
    };
    let mut payload =
        serialize_read_descriptor_response(0, 0, &Descriptor::ClockDomain(clock_domain))
            .unwrap()
            .data()
            .to_vec();
    // clock_sources_offset follows name, description and clock_source_index
    let offset_position = 8 + 64 + 2 + 2;
    payload[offset_position..offset_position + 2].copy_from_slice(&10u16.to_be_bytes());

    assert!(matches!(
        deserialize_read_descriptor_response(&payload, AemAecpStatus::SUCCESS),
        Err(PduError::InvalidDescriptorOffset { offset: 10, .. })
    ));
}

#[test]
fn test_count_past_payload() {
    let clock_domain = ClockDomainDescriptor {
        clock_sources: vec![0, 1],
        ..ClockDomainDescriptor::default()
    };
    let payload = serialize_read_descriptor_response(0, 0, &Descriptor::ClockDomain(clock_domain))
        .unwrap()
        .data()
        .to_vec();

    assert!(matches!(
        deserialize_read_descriptor_response(&payload[..payload.len() - 1], AemAecpStatus::SUCCESS),
        Err(PduError::IncorrectPayloadSize { .. })
    ));
}

#[test]
fn test_failed_response_has_no_body() {
    let ser = serialize_read_descriptor_command(0, DescriptorType::ENTITY, 0).unwrap();
    let response =
        deserialize_read_descriptor_response(ser.data(), AemAecpStatus::NO_SUCH_DESCRIPTOR)
            .unwrap();

    assert_eq!(response.descriptor_type, DescriptorType::ENTITY);
    assert!(response.descriptor.is_none());
}

#[test]
fn test_unsupported_type_has_no_body() {
    let mut payload = vec![0, 0, 0, 0];
    payload.extend_from_slice(&DescriptorType::CONTROL.value().to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&[0; 100]);

    let response = deserialize_read_descriptor_response(&payload, AemAecpStatus::SUCCESS).unwrap();
    assert_eq!(response.descriptor_type, DescriptorType::CONTROL);
    assert!(response.descriptor.is_none());
}
