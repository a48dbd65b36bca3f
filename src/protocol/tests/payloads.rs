use crate::model::{
    AsPath, AudioMapping, AvbInfo, AvbInfoFlags, MemoryObjectOperationType, MilanInfo,
    MilanInfoFeaturesFlags, MilanStreamInfo, MsrpMapping, StreamFormat, StreamInfo,
    StreamInfoFlags, StreamInfoFlagsEx,
};
use crate::protocol::defines::{AcmpStatus, AcquireFlags, DescriptorType};
use crate::protocol::payloads::aem::{
    self, MAXIMUM_AUDIO_MAP_MAPPINGS, STREAM_INFO_PAYLOAD_LENGTH,
};
use crate::protocol::payloads::mvu;
use crate::protocol::{PduError, SerializationError};
use crate::types::{AvdeccFixedString, MacAddress, UniqueIdentifier};

fn mapping(channel: u16) -> AudioMapping {
    AudioMapping {
        stream_index: 0,
        stream_channel: channel,
        cluster_offset: channel,
        cluster_channel: 0,
    }
}

fn stream_info() -> StreamInfo {
    StreamInfo {
        stream_info_flags: StreamInfoFlags::CONNECTED.with(StreamInfoFlags::STREAM_ID_VALID),
        stream_format: StreamFormat(0x0205_0220_0000_0000),
        stream_id: UniqueIdentifier::new(0x0011_2233_4455_0000),
        msrp_accumulated_latency: 250_000,
        stream_dest_mac: MacAddress::new([0x91, 0xE0, 0xF0, 0x00, 0x01, 0x02]),
        stream_vlan_id: 2,
        ..StreamInfo::default()
    }
}

#[test]
fn test_acquire_entity_layout() {
    let owner = UniqueIdentifier::new(0x0A0B_0C0D_0E0F_1011);
    let ser = aem::serialize_acquire_entity(
        AcquireFlags::PERSISTENT,
        owner,
        DescriptorType::ENTITY,
        0,
    )
    .unwrap();

    assert_eq!(&ser.data()[..4], &1u32.to_be_bytes());
    assert_eq!(
        aem::deserialize_acquire_entity(ser.data()).unwrap(),
        (AcquireFlags::PERSISTENT, owner, DescriptorType::ENTITY, 0)
    );
}

#[test]
fn test_stream_info_without_milan_extension() {
    let info = stream_info();
    let ser = aem::serialize_stream_info(DescriptorType::STREAM_INPUT, 1, &info).unwrap();
    assert_eq!(ser.used_bytes(), STREAM_INFO_PAYLOAD_LENGTH);

    let (descriptor_type, index, decoded) = aem::deserialize_stream_info(ser.data()).unwrap();
    assert_eq!((descriptor_type, index), (DescriptorType::STREAM_INPUT, 1));
    assert_eq!(decoded, info);
}

#[test]
fn test_stream_info_with_milan_extension() {
    let info = StreamInfo {
        milan: Some(MilanStreamInfo {
            flags_ex: StreamInfoFlagsEx::REGISTERING,
            probing_status: 3,
            acmp_status: AcmpStatus::LISTENER_TALKER_TIMEOUT,
        }),
        ..stream_info()
    };
    let ser = aem::serialize_stream_info(DescriptorType::STREAM_INPUT, 0, &info).unwrap();
    assert_eq!(ser.used_bytes(), 56);

    let (_, _, decoded) = aem::deserialize_stream_info(ser.data()).unwrap();
    assert_eq!(decoded.milan, info.milan);
}

#[test]
fn test_short_payload_is_rejected() {
    let ser = aem::serialize_stream_info(DescriptorType::STREAM_INPUT, 0, &stream_info()).unwrap();

    assert!(matches!(
        aem::deserialize_stream_info(&ser.data()[..47]),
        Err(PduError::IncorrectPayloadSize {
            expected: 48,
            actual: 47
        })
    ));
    assert!(matches!(
        aem::deserialize_configuration(&[0, 0]),
        Err(PduError::IncorrectPayloadSize { .. })
    ));
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let mut payload = aem::serialize_configuration(2).unwrap().data().to_vec();
    payload.extend_from_slice(&[0xFF; 6]);
    assert_eq!(aem::deserialize_configuration(&payload).unwrap(), 2);
}

#[test]
fn test_name_payload() {
    let name = AvdeccFixedString::new("Front of House");
    let ser = aem::serialize_name(DescriptorType::STREAM_OUTPUT, 4, 0, 1, &name).unwrap();
    assert_eq!(ser.used_bytes(), 72);
    assert_eq!(
        aem::deserialize_name(ser.data()).unwrap(),
        (DescriptorType::STREAM_OUTPUT, 4, 0, 1, name)
    );
}

#[test]
fn test_audio_map_response_at_capacity() {
    let mappings: Vec<_> = (0..62).map(mapping).collect();
    let ser = aem::serialize_audio_map_response(
        DescriptorType::STREAM_PORT_INPUT,
        0,
        0,
        1,
        &mappings,
    )
    .unwrap();

    let response = aem::deserialize_audio_map_response(ser.data()).unwrap();
    assert_eq!(response.number_of_maps, 1);
    assert_eq!(response.mappings, mappings);
}

#[cfg(not(feature = "big-payloads"))]
#[test]
fn test_audio_map_response_overflow() {
    assert_eq!(MAXIMUM_AUDIO_MAP_MAPPINGS, 62);

    let mappings: Vec<_> = (0..64).map(mapping).collect();
    let err = aem::serialize_audio_map_response(
        DescriptorType::STREAM_PORT_INPUT,
        0,
        0,
        1,
        &mappings,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PduError::Serialization(SerializationError::BufferOverflow { .. })
    ));
}

#[cfg(feature = "big-payloads")]
#[test]
fn test_audio_map_response_big_payloads() {
    assert!(MAXIMUM_AUDIO_MAP_MAPPINGS > 64);

    let mappings: Vec<_> = (0..64).map(mapping).collect();
    let ser = aem::serialize_audio_map_response(
        DescriptorType::STREAM_PORT_INPUT,
        0,
        0,
        1,
        &mappings,
    )
    .unwrap();
    assert_eq!(aem::deserialize_audio_map_response(ser.data()).unwrap().mappings.len(), 64);
}

#[test]
fn test_audio_mappings_count_past_payload() {
    let ser =
        aem::serialize_audio_mappings(DescriptorType::STREAM_PORT_OUTPUT, 0, &[mapping(0), mapping(1)])
            .unwrap();
    let truncated = &ser.data()[..ser.used_bytes() - 4];

    assert!(matches!(
        aem::deserialize_audio_mappings(truncated),
        Err(PduError::IncorrectPayloadSize { .. })
    ));
}

#[test]
fn test_avb_info_response() {
    let info = AvbInfo {
        gptp_grandmaster_id: UniqueIdentifier::new(0x0011_22FF_FE33_4455),
        propagation_delay: 420,
        gptp_domain_number: 0,
        flags: AvbInfoFlags::AS_CAPABLE.with(AvbInfoFlags::GPTP_ENABLED),
        mappings: vec![MsrpMapping {
            traffic_class: 1,
            priority: 3,
            vlan_id: 2,
        }],
    };
    let ser = aem::serialize_avb_info_response(DescriptorType::AVB_INTERFACE, 0, &info).unwrap();
    assert_eq!(ser.used_bytes(), 20 + 4);

    let (_, _, decoded) = aem::deserialize_avb_info_response(ser.data()).unwrap();
    assert_eq!(decoded, info);
}

#[test]
fn test_as_path_response() {
    let path = AsPath {
        sequence: vec![UniqueIdentifier::new(1), UniqueIdentifier::new(2)],
    };
    let ser = aem::serialize_as_path_response(0, &path).unwrap();
    assert_eq!(aem::deserialize_as_path_response(ser.data()).unwrap(), (0, path));
}

#[test]
fn test_start_operation_buffer() {
    let ser = aem::serialize_start_operation(
        DescriptorType::MEMORY_OBJECT,
        1,
        0,
        MemoryObjectOperationType::UPLOAD,
        &[0xDE, 0xAD],
    )
    .unwrap();

    let operation = aem::deserialize_start_operation(ser.data()).unwrap();
    assert_eq!(operation.operation_type, MemoryObjectOperationType::UPLOAD);
    assert_eq!(operation.buffer, vec![0xDE, 0xAD]);
}

#[test]
fn test_memory_object_length_field_order() {
    let ser = aem::serialize_memory_object_length(1, 7, 0x1000).unwrap();
    // Memory object index comes first on the wire
    assert_eq!(&ser.data()[..4], &[0, 7, 0, 1]);
    assert_eq!(
        aem::deserialize_memory_object_length(ser.data()).unwrap(),
        (1, 7, 0x1000)
    );
}

#[test]
fn test_milan_info() {
    let info = MilanInfo {
        protocol_version: 1,
        features_flags: MilanInfoFeaturesFlags::REDUNDANCY,
        certification_version: 0x0102_0000,
    };
    let ser = mvu::serialize_get_milan_info_response(&info).unwrap();
    assert_eq!(ser.used_bytes(), 14);
    assert_eq!(mvu::deserialize_get_milan_info_response(ser.data()).unwrap(), info);

    assert!(mvu::deserialize_get_milan_info_command(&[0]).is_err());
    let command = mvu::serialize_get_milan_info_command().unwrap();
    mvu::deserialize_get_milan_info_command(command.data()).unwrap();
}
