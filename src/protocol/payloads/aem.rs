//! AEM command and response payloads.
//!
//! Where a response carries the same fields as its command, a single pair of
//! functions covers both directions. Commands that only address a descriptor
//! (GET_STREAM_FORMAT, GET_STREAM_INFO, GET_SAMPLING_RATE, GET_CLOCK_SOURCE,
//! GET_CONTROL, START/STOP_STREAMING, GET_AVB_INFO, GET_COUNTERS, REBOOT)
//! share [`serialize_descriptor_reference`].

use super::{AemPayloadSerializer, checked, ensure_remaining, list_count, read_descriptor_type};
use crate::model::{
    AsPath, AudioMapping, AvbInfo, AvbInfoFlags, ConfigurationIndex, DescriptorCounters,
    DescriptorIndex, MapIndex, MemoryObjectOperationType, MilanStreamInfo, MsrpMapping,
    OperationId, SamplingRate, StreamFormat, StreamInfo, StreamInfoFlags, StreamInfoFlagsEx,
};
use crate::protocol::defines::{AcmpStatus, AcquireFlags, DescriptorType, LockFlags};
use crate::protocol::error::PduError;
use crate::protocol::serialization::{Deserializer, Serializer};
use crate::types::{AvdeccFixedString, UniqueIdentifier};

/// ACQUIRE_ENTITY command and response
pub const ACQUIRE_ENTITY_PAYLOAD_LENGTH: usize = 16;
/// LOCK_ENTITY command and response
pub const LOCK_ENTITY_PAYLOAD_LENGTH: usize = 16;
/// Descriptor type plus descriptor index
pub const DESCRIPTOR_REFERENCE_LENGTH: usize = 4;
/// SET_CONFIGURATION command, SET/GET_CONFIGURATION response
pub const CONFIGURATION_PAYLOAD_LENGTH: usize = 4;
/// SET_STREAM_FORMAT command, SET/GET_STREAM_FORMAT response
pub const STREAM_FORMAT_PAYLOAD_LENGTH: usize = 12;
/// SET_STREAM_INFO command, SET/GET_STREAM_INFO response
pub const STREAM_INFO_PAYLOAD_LENGTH: usize = 48;
/// GET_STREAM_INFO response with the Milan extension
pub const MILAN_STREAM_INFO_PAYLOAD_LENGTH: usize = 56;
/// GET_NAME command
pub const GET_NAME_COMMAND_LENGTH: usize = 8;
/// SET_NAME command, SET/GET_NAME response
pub const NAME_PAYLOAD_LENGTH: usize = 72;
/// SET_ASSOCIATION_ID command, SET/GET_ASSOCIATION_ID response
pub const ASSOCIATION_ID_PAYLOAD_LENGTH: usize = 8;
/// SET_SAMPLING_RATE command, SET/GET_SAMPLING_RATE response
pub const SAMPLING_RATE_PAYLOAD_LENGTH: usize = 8;
/// SET_CLOCK_SOURCE command, SET/GET_CLOCK_SOURCE response
pub const CLOCK_SOURCE_PAYLOAD_LENGTH: usize = 8;
/// GET_AVB_INFO response, without MSRP mappings
pub const AVB_INFO_RESPONSE_MIN_LENGTH: usize = 20;
/// GET_AS_PATH command
pub const GET_AS_PATH_COMMAND_LENGTH: usize = 4;
/// GET_AS_PATH response, without path entries
pub const AS_PATH_RESPONSE_MIN_LENGTH: usize = 4;
/// GET_COUNTERS response
pub const COUNTERS_RESPONSE_LENGTH: usize = 136;
/// GET_AUDIO_MAP command
pub const GET_AUDIO_MAP_COMMAND_LENGTH: usize = 8;
/// GET_AUDIO_MAP response, without mappings
pub const AUDIO_MAP_RESPONSE_MIN_LENGTH: usize = 12;
/// ADD/REMOVE_AUDIO_MAPPINGS, without mappings
pub const AUDIO_MAPPINGS_PAYLOAD_MIN_LENGTH: usize = 8;
/// START_OPERATION, without the operation buffer
pub const START_OPERATION_PAYLOAD_MIN_LENGTH: usize = 8;
/// ABORT_OPERATION command and response
pub const ABORT_OPERATION_PAYLOAD_LENGTH: usize = 8;
/// OPERATION_STATUS unsolicited response
pub const OPERATION_STATUS_PAYLOAD_LENGTH: usize = 8;
/// SET_MEMORY_OBJECT_LENGTH command, SET/GET_MEMORY_OBJECT_LENGTH response
pub const MEMORY_OBJECT_LENGTH_PAYLOAD_LENGTH: usize = 12;
/// GET_MEMORY_OBJECT_LENGTH command
pub const GET_MEMORY_OBJECT_LENGTH_COMMAND_LENGTH: usize = 4;

/// Audio mappings that fit one GET_AUDIO_MAP response
pub const MAXIMUM_AUDIO_MAP_MAPPINGS: usize =
    (AemPayloadSerializer::CAPACITY - AUDIO_MAP_RESPONSE_MIN_LENGTH) / AudioMapping::SIZE;

/// Descriptor addressed by a command
pub type DescriptorReference = (DescriptorType, DescriptorIndex);

fn read_reference(des: &mut Deserializer<'_>) -> Result<DescriptorReference, PduError> {
    Ok((read_descriptor_type(des)?, des.read_u16()?))
}

fn write_reference<const N: usize>(
    ser: &mut Serializer<N>,
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Result<(), PduError> {
    ser.write_u16(descriptor_type.value())?
        .write_u16(descriptor_index)?;
    Ok(())
}

// ===== Descriptor reference =====

/// Payload made of a descriptor type and index only.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_descriptor_reference(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Result<Serializer<DESCRIPTOR_REFERENCE_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    Ok(ser)
}

/// Decode a descriptor type and index.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 4 bytes.
pub fn deserialize_descriptor_reference(payload: &[u8]) -> Result<DescriptorReference, PduError> {
    let mut des = checked(payload, DESCRIPTOR_REFERENCE_LENGTH)?;
    read_reference(&mut des)
}

// ===== ACQUIRE_ENTITY / LOCK_ENTITY =====

/// ACQUIRE_ENTITY command or response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_acquire_entity(
    flags: AcquireFlags,
    owner_id: UniqueIdentifier,
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Result<Serializer<ACQUIRE_ENTITY_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u32(flags.bits())?.pack(&owner_id)?;
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    Ok(ser)
}

/// Decode an ACQUIRE_ENTITY command or response.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 16 bytes.
pub fn deserialize_acquire_entity(
    payload: &[u8],
) -> Result<(AcquireFlags, UniqueIdentifier, DescriptorType, DescriptorIndex), PduError> {
    let mut des = checked(payload, ACQUIRE_ENTITY_PAYLOAD_LENGTH)?;
    let flags = AcquireFlags::from_bits(des.read_u32()?);
    let owner_id = des.unpack()?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((flags, owner_id, descriptor_type, descriptor_index))
}

/// LOCK_ENTITY command or response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_lock_entity(
    flags: LockFlags,
    locked_id: UniqueIdentifier,
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Result<Serializer<LOCK_ENTITY_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u32(flags.bits())?.pack(&locked_id)?;
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    Ok(ser)
}

/// Decode a LOCK_ENTITY command or response.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 16 bytes.
pub fn deserialize_lock_entity(
    payload: &[u8],
) -> Result<(LockFlags, UniqueIdentifier, DescriptorType, DescriptorIndex), PduError> {
    let mut des = checked(payload, LOCK_ENTITY_PAYLOAD_LENGTH)?;
    let flags = LockFlags::from_bits(des.read_u32()?);
    let locked_id = des.unpack()?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((flags, locked_id, descriptor_type, descriptor_index))
}

// ===== SET/GET_CONFIGURATION =====

/// SET_CONFIGURATION command, or either configuration response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_configuration(
    configuration_index: ConfigurationIndex,
) -> Result<Serializer<CONFIGURATION_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u16(0)?.write_u16(configuration_index)?;
    Ok(ser)
}

/// Decode a configuration payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 4 bytes.
pub fn deserialize_configuration(payload: &[u8]) -> Result<ConfigurationIndex, PduError> {
    let mut des = checked(payload, CONFIGURATION_PAYLOAD_LENGTH)?;
    des.skip(2)?;
    Ok(des.read_u16()?)
}

// ===== SET/GET_STREAM_FORMAT =====

/// SET_STREAM_FORMAT command, or either stream format response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_stream_format(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    stream_format: StreamFormat,
) -> Result<Serializer<STREAM_FORMAT_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u64(stream_format.0)?;
    Ok(ser)
}

/// Decode a stream format payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 12 bytes.
pub fn deserialize_stream_format(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, StreamFormat), PduError> {
    let mut des = checked(payload, STREAM_FORMAT_PAYLOAD_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, StreamFormat(des.read_u64()?)))
}

// ===== SET/GET_STREAM_INFO =====

/// SET_STREAM_INFO command, or either stream info response.
///
/// The Milan extension is appended when `info.milan` is set.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_stream_info(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    info: &StreamInfo,
) -> Result<Serializer<MILAN_STREAM_INFO_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u32(info.stream_info_flags.bits())?
        .write_u64(info.stream_format.0)?
        .pack(&info.stream_id)?
        .write_u32(info.msrp_accumulated_latency)?
        .pack(&info.stream_dest_mac)?
        .write_u8(info.msrp_failure_code)?
        .write_u8(0)?
        .write_u64(info.msrp_failure_bridge_id)?
        .write_u16(info.stream_vlan_id)?
        .write_u16(0)?;
    if let Some(milan) = &info.milan {
        let status_byte = ((milan.probing_status & 0x07) << 5) | (milan.acmp_status.value() & 0x1F);
        ser.write_u32(milan.flags_ex.bits())?
            .write_u8(status_byte)?
            .write_zeroes(3)?;
    }
    Ok(ser)
}

/// Decode a stream info payload.
///
/// The Milan extension is read when the payload is long enough to carry it.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 48 bytes.
pub fn deserialize_stream_info(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, StreamInfo), PduError> {
    let mut des = checked(payload, STREAM_INFO_PAYLOAD_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    let stream_info_flags = StreamInfoFlags::from_bits(des.read_u32()?);
    let stream_format = StreamFormat(des.read_u64()?);
    let stream_id = des.unpack()?;
    let msrp_accumulated_latency = des.read_u32()?;
    let stream_dest_mac = des.unpack()?;
    let msrp_failure_code = des.read_u8()?;
    des.skip(1)?;
    let msrp_failure_bridge_id = des.read_u64()?;
    let stream_vlan_id = des.read_u16()?;
    des.skip(2)?;

    let milan = if payload.len() >= MILAN_STREAM_INFO_PAYLOAD_LENGTH {
        let flags_ex = StreamInfoFlagsEx::from_bits(des.read_u32()?);
        let status_byte = des.read_u8()?;
        des.skip(3)?;
        Some(MilanStreamInfo {
            flags_ex,
            probing_status: status_byte >> 5,
            acmp_status: AcmpStatus(status_byte & 0x1F),
        })
    } else {
        None
    };

    Ok((
        descriptor_type,
        descriptor_index,
        StreamInfo {
            stream_info_flags,
            stream_format,
            stream_id,
            msrp_accumulated_latency,
            stream_dest_mac,
            msrp_failure_code,
            msrp_failure_bridge_id,
            stream_vlan_id,
            milan,
        },
    ))
}

// ===== SET/GET_NAME =====

/// GET_NAME command.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_get_name_command(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    name_index: u16,
    configuration_index: ConfigurationIndex,
) -> Result<Serializer<GET_NAME_COMMAND_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(name_index)?.write_u16(configuration_index)?;
    Ok(ser)
}

/// Decode a GET_NAME command into (type, index, name index, configuration).
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_get_name_command(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, u16, ConfigurationIndex), PduError> {
    let mut des = checked(payload, GET_NAME_COMMAND_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, des.read_u16()?, des.read_u16()?))
}

/// SET_NAME command, or either name response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_name(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    name_index: u16,
    configuration_index: ConfigurationIndex,
    name: &AvdeccFixedString,
) -> Result<Serializer<NAME_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(name_index)?
        .write_u16(configuration_index)?
        .pack(name)?;
    Ok(ser)
}

/// Decode a name payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 72 bytes.
pub fn deserialize_name(
    payload: &[u8],
) -> Result<
    (
        DescriptorType,
        DescriptorIndex,
        u16,
        ConfigurationIndex,
        AvdeccFixedString,
    ),
    PduError,
> {
    let mut des = checked(payload, NAME_PAYLOAD_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    let name_index = des.read_u16()?;
    let configuration_index = des.read_u16()?;
    let name = des.unpack()?;
    Ok((
        descriptor_type,
        descriptor_index,
        name_index,
        configuration_index,
        name,
    ))
}

// ===== SET/GET_ASSOCIATION_ID =====

/// SET_ASSOCIATION_ID command, or either association ID response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_association_id(
    association_id: UniqueIdentifier,
) -> Result<Serializer<ASSOCIATION_ID_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.pack(&association_id)?;
    Ok(ser)
}

/// Decode an association ID payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_association_id(payload: &[u8]) -> Result<UniqueIdentifier, PduError> {
    let mut des = checked(payload, ASSOCIATION_ID_PAYLOAD_LENGTH)?;
    Ok(des.unpack()?)
}

// ===== SET/GET_SAMPLING_RATE =====

/// SET_SAMPLING_RATE command, or either sampling rate response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_sampling_rate(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    sampling_rate: SamplingRate,
) -> Result<Serializer<SAMPLING_RATE_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u32(sampling_rate.0)?;
    Ok(ser)
}

/// Decode a sampling rate payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_sampling_rate(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, SamplingRate), PduError> {
    let mut des = checked(payload, SAMPLING_RATE_PAYLOAD_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, SamplingRate(des.read_u32()?)))
}

// ===== SET/GET_CLOCK_SOURCE =====

/// SET_CLOCK_SOURCE command, or either clock source response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_clock_source(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    clock_source_index: u16,
) -> Result<Serializer<CLOCK_SOURCE_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(clock_source_index)?.write_u16(0)?;
    Ok(ser)
}

/// Decode a clock source payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_clock_source(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, u16), PduError> {
    let mut des = checked(payload, CLOCK_SOURCE_PAYLOAD_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, des.read_u16()?))
}

// ===== SET/GET_CONTROL =====

/// SET_CONTROL command, or either control response.
///
/// Control values are opaque; their layout depends on the CONTROL
/// descriptor's value type.
///
/// # Errors
///
/// `BufferOverflow` when the values do not fit an AEM payload.
pub fn serialize_control(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    values: &[u8],
) -> Result<AemPayloadSerializer, PduError> {
    let mut ser = AemPayloadSerializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_bytes(values)?;
    Ok(ser)
}

/// Decode a control payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 4 bytes.
pub fn deserialize_control(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, Vec<u8>), PduError> {
    let mut des = checked(payload, DESCRIPTOR_REFERENCE_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, des.remaining_data().to_vec()))
}

// ===== GET_AVB_INFO =====

/// GET_AVB_INFO response.
///
/// # Errors
///
/// `BufferOverflow` when the MSRP mappings do not fit.
pub fn serialize_avb_info_response(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    info: &AvbInfo,
) -> Result<AemPayloadSerializer, PduError> {
    let mut ser = AemPayloadSerializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.pack(&info.gptp_grandmaster_id)?
        .write_u32(info.propagation_delay)?
        .write_u8(info.gptp_domain_number)?
        .write_u8(info.flags.bits())?
        .write_u16(list_count(info.mappings.len())?)?;
    for mapping in &info.mappings {
        ser.pack(mapping)?;
    }
    Ok(ser)
}

/// Decode a GET_AVB_INFO response.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 20 bytes or when the mapping count runs
/// past the payload.
pub fn deserialize_avb_info_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, AvbInfo), PduError> {
    let mut des = checked(payload, AVB_INFO_RESPONSE_MIN_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    let gptp_grandmaster_id = des.unpack()?;
    let propagation_delay = des.read_u32()?;
    let gptp_domain_number = des.read_u8()?;
    let flags = AvbInfoFlags::from_bits(des.read_u8()?);
    let count = des.read_u16()?;
    ensure_remaining(&des, count, MsrpMapping::SIZE)?;
    let mappings = (0..count)
        .map(|_| des.unpack())
        .collect::<Result<Vec<MsrpMapping>, _>>()?;
    Ok((
        descriptor_type,
        descriptor_index,
        AvbInfo {
            gptp_grandmaster_id,
            propagation_delay,
            gptp_domain_number,
            flags,
            mappings,
        },
    ))
}

// ===== GET_AS_PATH =====

/// GET_AS_PATH command.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_get_as_path_command(
    descriptor_index: DescriptorIndex,
) -> Result<Serializer<GET_AS_PATH_COMMAND_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u16(descriptor_index)?.write_u16(0)?;
    Ok(ser)
}

/// Decode a GET_AS_PATH command into the AVB interface index.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 4 bytes.
pub fn deserialize_get_as_path_command(payload: &[u8]) -> Result<DescriptorIndex, PduError> {
    let mut des = checked(payload, GET_AS_PATH_COMMAND_LENGTH)?;
    Ok(des.read_u16()?)
}

/// GET_AS_PATH response.
///
/// # Errors
///
/// `BufferOverflow` when the path does not fit.
pub fn serialize_as_path_response(
    descriptor_index: DescriptorIndex,
    path: &AsPath,
) -> Result<AemPayloadSerializer, PduError> {
    let mut ser = AemPayloadSerializer::new();
    ser.write_u16(descriptor_index)?
        .write_u16(list_count(path.sequence.len())?)?;
    for hop in &path.sequence {
        ser.pack(hop)?;
    }
    Ok(ser)
}

/// Decode a GET_AS_PATH response.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 4 bytes or when the count runs past the
/// payload.
pub fn deserialize_as_path_response(
    payload: &[u8],
) -> Result<(DescriptorIndex, AsPath), PduError> {
    let mut des = checked(payload, AS_PATH_RESPONSE_MIN_LENGTH)?;
    let descriptor_index = des.read_u16()?;
    let count = des.read_u16()?;
    ensure_remaining(&des, count, 8)?;
    let sequence = (0..count)
        .map(|_| des.unpack())
        .collect::<Result<Vec<UniqueIdentifier>, _>>()?;
    Ok((descriptor_index, AsPath { sequence }))
}

// ===== GET_COUNTERS =====

/// GET_COUNTERS response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_counters_response(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    counters: &DescriptorCounters,
) -> Result<Serializer<COUNTERS_RESPONSE_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u32(counters.valid_flags)?;
    for counter in &counters.counters {
        ser.write_u32(*counter)?;
    }
    Ok(ser)
}

/// Decode a GET_COUNTERS response.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 136 bytes.
pub fn deserialize_counters_response(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, DescriptorCounters), PduError> {
    let mut des = checked(payload, COUNTERS_RESPONSE_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    let mut counters = DescriptorCounters {
        valid_flags: des.read_u32()?,
        ..DescriptorCounters::default()
    };
    for counter in &mut counters.counters {
        *counter = des.read_u32()?;
    }
    Ok((descriptor_type, descriptor_index, counters))
}

// ===== GET_AUDIO_MAP / ADD/REMOVE_AUDIO_MAPPINGS =====

/// GET_AUDIO_MAP command.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_get_audio_map_command(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    map_index: MapIndex,
) -> Result<Serializer<GET_AUDIO_MAP_COMMAND_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(map_index)?.write_u16(0)?;
    Ok(ser)
}

/// Decode a GET_AUDIO_MAP command.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_get_audio_map_command(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, MapIndex), PduError> {
    let mut des = checked(payload, GET_AUDIO_MAP_COMMAND_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, des.read_u16()?))
}

/// GET_AUDIO_MAP response.
///
/// Without the `big-payloads` feature at most
/// [`MAXIMUM_AUDIO_MAP_MAPPINGS`] mappings fit.
///
/// # Errors
///
/// `BufferOverflow` when the mappings do not fit an AEM payload.
pub fn serialize_audio_map_response(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    map_index: MapIndex,
    number_of_maps: MapIndex,
    mappings: &[AudioMapping],
) -> Result<AemPayloadSerializer, PduError> {
    let mut ser = AemPayloadSerializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(map_index)?
        .write_u16(number_of_maps)?
        .write_u16(list_count(mappings.len())?)?
        .write_u16(0)?;
    for mapping in mappings {
        ser.pack(mapping)?;
    }
    Ok(ser)
}

/// Decoded GET_AUDIO_MAP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioMapResponse {
    /// Stream port type
    pub descriptor_type: DescriptorType,
    /// Stream port index
    pub descriptor_index: DescriptorIndex,
    /// Index of this map
    pub map_index: MapIndex,
    /// Number of maps the port exposes
    pub number_of_maps: MapIndex,
    /// Mappings of this map
    pub mappings: Vec<AudioMapping>,
}

/// Decode a GET_AUDIO_MAP response.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 12 bytes or when the count runs past the
/// payload.
pub fn deserialize_audio_map_response(payload: &[u8]) -> Result<AudioMapResponse, PduError> {
    let mut des = checked(payload, AUDIO_MAP_RESPONSE_MIN_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    let map_index = des.read_u16()?;
    let number_of_maps = des.read_u16()?;
    let count = des.read_u16()?;
    des.skip(2)?;
    let mappings = read_mappings(&mut des, count)?;
    Ok(AudioMapResponse {
        descriptor_type,
        descriptor_index,
        map_index,
        number_of_maps,
        mappings,
    })
}

/// ADD_AUDIO_MAPPINGS or REMOVE_AUDIO_MAPPINGS, command or response.
///
/// # Errors
///
/// `BufferOverflow` when the mappings do not fit an AEM payload.
pub fn serialize_audio_mappings(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    mappings: &[AudioMapping],
) -> Result<AemPayloadSerializer, PduError> {
    let mut ser = AemPayloadSerializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(list_count(mappings.len())?)?.write_u16(0)?;
    for mapping in mappings {
        ser.pack(mapping)?;
    }
    Ok(ser)
}

/// Decode an ADD/REMOVE_AUDIO_MAPPINGS payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes or when the count runs past the
/// payload.
pub fn deserialize_audio_mappings(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, Vec<AudioMapping>), PduError> {
    let mut des = checked(payload, AUDIO_MAPPINGS_PAYLOAD_MIN_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    let count = des.read_u16()?;
    des.skip(2)?;
    Ok((descriptor_type, descriptor_index, read_mappings(&mut des, count)?))
}

fn read_mappings(des: &mut Deserializer<'_>, count: u16) -> Result<Vec<AudioMapping>, PduError> {
    ensure_remaining(des, count, AudioMapping::SIZE)?;
    Ok((0..count)
        .map(|_| des.unpack())
        .collect::<Result<Vec<AudioMapping>, _>>()?)
}

// ===== START/ABORT_OPERATION, OPERATION_STATUS =====

/// Decoded START_OPERATION payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOperation {
    /// Target descriptor type, normally MEMORY_OBJECT
    pub descriptor_type: DescriptorType,
    /// Target descriptor index
    pub descriptor_index: DescriptorIndex,
    /// Assigned by the entity in the response; zero in the command
    pub operation_id: OperationId,
    /// Operation to run
    pub operation_type: MemoryObjectOperationType,
    /// Operation-specific data
    pub buffer: Vec<u8>,
}

/// START_OPERATION command or response.
///
/// # Errors
///
/// `BufferOverflow` when the buffer does not fit an AEM payload.
pub fn serialize_start_operation(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    operation_id: OperationId,
    operation_type: MemoryObjectOperationType,
    buffer: &[u8],
) -> Result<AemPayloadSerializer, PduError> {
    let mut ser = AemPayloadSerializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(operation_id)?
        .write_u16(operation_type.0)?
        .write_bytes(buffer)?;
    Ok(ser)
}

/// Decode a START_OPERATION payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_start_operation(payload: &[u8]) -> Result<StartOperation, PduError> {
    let mut des = checked(payload, START_OPERATION_PAYLOAD_MIN_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    let operation_id = des.read_u16()?;
    let operation_type = MemoryObjectOperationType(des.read_u16()?);
    Ok(StartOperation {
        descriptor_type,
        descriptor_index,
        operation_id,
        operation_type,
        buffer: des.remaining_data().to_vec(),
    })
}

/// ABORT_OPERATION command or response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_abort_operation(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    operation_id: OperationId,
) -> Result<Serializer<ABORT_OPERATION_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(operation_id)?.write_u16(0)?;
    Ok(ser)
}

/// Decode an ABORT_OPERATION payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_abort_operation(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, OperationId), PduError> {
    let mut des = checked(payload, ABORT_OPERATION_PAYLOAD_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, des.read_u16()?))
}

/// OPERATION_STATUS unsolicited response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_operation_status(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
    operation_id: OperationId,
    percent_complete: u16,
) -> Result<Serializer<OPERATION_STATUS_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    write_reference(&mut ser, descriptor_type, descriptor_index)?;
    ser.write_u16(operation_id)?.write_u16(percent_complete)?;
    Ok(ser)
}

/// Decode an OPERATION_STATUS payload.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_operation_status(
    payload: &[u8],
) -> Result<(DescriptorType, DescriptorIndex, OperationId, u16), PduError> {
    let mut des = checked(payload, OPERATION_STATUS_PAYLOAD_LENGTH)?;
    let (descriptor_type, descriptor_index) = read_reference(&mut des)?;
    Ok((descriptor_type, descriptor_index, des.read_u16()?, des.read_u16()?))
}

// ===== SET/GET_MEMORY_OBJECT_LENGTH =====

/// GET_MEMORY_OBJECT_LENGTH command.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_get_memory_object_length_command(
    configuration_index: ConfigurationIndex,
    memory_object_index: DescriptorIndex,
) -> Result<Serializer<GET_MEMORY_OBJECT_LENGTH_COMMAND_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u16(memory_object_index)?
        .write_u16(configuration_index)?;
    Ok(ser)
}

/// Decode a GET_MEMORY_OBJECT_LENGTH command into (configuration, memory object).
///
/// # Errors
///
/// `IncorrectPayloadSize` below 4 bytes.
pub fn deserialize_get_memory_object_length_command(
    payload: &[u8],
) -> Result<(ConfigurationIndex, DescriptorIndex), PduError> {
    let mut des = checked(payload, GET_MEMORY_OBJECT_LENGTH_COMMAND_LENGTH)?;
    let memory_object_index = des.read_u16()?;
    let configuration_index = des.read_u16()?;
    Ok((configuration_index, memory_object_index))
}

/// SET_MEMORY_OBJECT_LENGTH command, or either length response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_memory_object_length(
    configuration_index: ConfigurationIndex,
    memory_object_index: DescriptorIndex,
    length: u64,
) -> Result<Serializer<MEMORY_OBJECT_LENGTH_PAYLOAD_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u16(memory_object_index)?
        .write_u16(configuration_index)?
        .write_u64(length)?;
    Ok(ser)
}

/// Decode a memory object length payload into (configuration, memory object, length).
///
/// # Errors
///
/// `IncorrectPayloadSize` below 12 bytes.
pub fn deserialize_memory_object_length(
    payload: &[u8],
) -> Result<(ConfigurationIndex, DescriptorIndex, u64), PduError> {
    let mut des = checked(payload, MEMORY_OBJECT_LENGTH_PAYLOAD_LENGTH)?;
    let memory_object_index = des.read_u16()?;
    let configuration_index = des.read_u16()?;
    Ok((configuration_index, memory_object_index, des.read_u64()?))
}
