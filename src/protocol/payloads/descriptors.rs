//! READ_DESCRIPTOR payloads and the descriptor body codecs.
//!
//! A response starts with configuration index, a reserved word, descriptor
//! type and descriptor index. The descriptor body follows. Offsets inside a
//! body (`formats_offset`, `sampling_rates_offset`...) count from the
//! descriptor base, which is the descriptor type field at payload position 4.

use super::{AemPayloadSerializer, checked, ensure_remaining, list_count, read_descriptor_type};
use crate::model::{
    AudioClusterDescriptor, AudioMapDescriptor, AudioMapping, AudioUnitDescriptor,
    AvbInterfaceDescriptor, AvbInterfaceFlags, ClockDomainDescriptor, ClockSourceDescriptor,
    ClockSourceFlags, ConfigurationDescriptor, ConfigurationIndex, Descriptor, DescriptorIndex,
    EntityDescriptor, JackDescriptor, JackFlags, LocaleDescriptor, LocalizedStringReference,
    MemoryObjectDescriptor, PortFlags, SamplingRate, StreamDescriptor, StreamFlags, StreamFormat,
    StreamPortDescriptor, StringsDescriptor,
};
use crate::protocol::defines::{
    AemAecpStatus, ControllerCapabilities, DescriptorType, EntityCapabilities,
    ListenerCapabilities, TalkerCapabilities,
};
use crate::protocol::error::PduError;
use crate::protocol::serialization::{Deserializer, Serializer};

/// READ_DESCRIPTOR command payload
pub const READ_DESCRIPTOR_COMMAND_LENGTH: usize = 8;

/// Common part of every READ_DESCRIPTOR response
pub const READ_DESCRIPTOR_COMMON_RESPONSE_LENGTH: usize = 8;

/// Payload position of the descriptor base
const DESCRIPTOR_BASE: usize = 4;

/// Fixed body sizes, common header excluded
pub mod body_length {
    /// ENTITY
    pub const ENTITY: usize = 308;
    /// CONFIGURATION, without descriptor counts
    pub const CONFIGURATION: usize = 70;
    /// AUDIO_UNIT, without sampling rates
    pub const AUDIO_UNIT: usize = 140;
    /// STREAM_INPUT/OUTPUT, without formats
    pub const STREAM: usize = 128;
    /// JACK_INPUT/OUTPUT
    pub const JACK: usize = 74;
    /// AVB_INTERFACE
    pub const AVB_INTERFACE: usize = 94;
    /// CLOCK_SOURCE
    pub const CLOCK_SOURCE: usize = 82;
    /// MEMORY_OBJECT
    pub const MEMORY_OBJECT: usize = 96;
    /// LOCALE
    pub const LOCALE: usize = 68;
    /// STRINGS
    pub const STRINGS: usize = 448;
    /// STREAM_PORT_INPUT/OUTPUT
    pub const STREAM_PORT: usize = 16;
    /// AUDIO_CLUSTER
    pub const AUDIO_CLUSTER: usize = 83;
    /// AUDIO_MAP, without mappings
    pub const AUDIO_MAP: usize = 4;
    /// CLOCK_DOMAIN, without clock sources
    pub const CLOCK_DOMAIN: usize = 72;
}

/// Decoded READ_DESCRIPTOR response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadDescriptorResponse {
    /// Configuration the descriptor belongs to
    pub configuration_index: ConfigurationIndex,
    /// Descriptor type
    pub descriptor_type: DescriptorType,
    /// Descriptor index
    pub descriptor_index: DescriptorIndex,
    /// Descriptor body; `None` for failed responses and unsupported types
    pub descriptor: Option<Descriptor>,
}

/// READ_DESCRIPTOR command.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_read_descriptor_command(
    configuration_index: ConfigurationIndex,
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> Result<Serializer<READ_DESCRIPTOR_COMMAND_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u16(configuration_index)?
        .write_u16(0)?
        .write_u16(descriptor_type.value())?
        .write_u16(descriptor_index)?;
    Ok(ser)
}

/// Decode a READ_DESCRIPTOR command into (configuration, type, index).
///
/// # Errors
///
/// `IncorrectPayloadSize` below 8 bytes.
pub fn deserialize_read_descriptor_command(
    payload: &[u8],
) -> Result<(ConfigurationIndex, DescriptorType, DescriptorIndex), PduError> {
    let mut des = checked(payload, READ_DESCRIPTOR_COMMAND_LENGTH)?;
    let configuration_index = des.read_u16()?;
    des.skip(2)?;
    let descriptor_type = read_descriptor_type(&mut des)?;
    let descriptor_index = des.read_u16()?;
    Ok((configuration_index, descriptor_type, descriptor_index))
}

/// READ_DESCRIPTOR response carrying `descriptor`.
///
/// # Errors
///
/// `BufferOverflow` when the descriptor does not fit an AEM payload.
pub fn serialize_read_descriptor_response(
    configuration_index: ConfigurationIndex,
    descriptor_index: DescriptorIndex,
    descriptor: &Descriptor,
) -> Result<AemPayloadSerializer, PduError> {
    let mut ser = AemPayloadSerializer::new();
    ser.write_u16(configuration_index)?
        .write_u16(0)?
        .write_u16(descriptor.descriptor_type().value())?
        .write_u16(descriptor_index)?;
    write_descriptor(&mut ser, descriptor)?;
    Ok(ser)
}

/// Decode a READ_DESCRIPTOR response.
///
/// The body is only decoded for a `SUCCESS` status.
///
/// # Errors
///
/// `IncorrectPayloadSize` for short payloads, `InvalidDescriptorOffset` for
/// an offset pointing inside the fixed part.
pub fn deserialize_read_descriptor_response(
    payload: &[u8],
    status: AemAecpStatus,
) -> Result<ReadDescriptorResponse, PduError> {
    let mut des = checked(payload, READ_DESCRIPTOR_COMMON_RESPONSE_LENGTH)?;
    let configuration_index = des.read_u16()?;
    des.skip(2)?;
    let descriptor_type = read_descriptor_type(&mut des)?;
    let descriptor_index = des.read_u16()?;

    let descriptor = if status == AemAecpStatus::SUCCESS {
        read_descriptor(payload, descriptor_type)?
    } else {
        None
    };

    Ok(ReadDescriptorResponse {
        configuration_index,
        descriptor_type,
        descriptor_index,
        descriptor,
    })
}

fn write_descriptor<const N: usize>(
    ser: &mut Serializer<N>,
    descriptor: &Descriptor,
) -> Result<(), PduError> {
    match descriptor {
        Descriptor::Entity(d) => write_entity(ser, d),
        Descriptor::Configuration(d) => write_configuration(ser, d),
        Descriptor::AudioUnit(d) => write_audio_unit(ser, d),
        Descriptor::StreamInput(d) | Descriptor::StreamOutput(d) => write_stream(ser, d),
        Descriptor::JackInput(d) | Descriptor::JackOutput(d) => {
            ser.pack(&d.object_name)?
                .write_u16(d.localized_description.0)?
                .write_u16(d.jack_flags.bits())?
                .write_u16(d.jack_type)?
                .pack(&d.controls)?;
            Ok(())
        }
        Descriptor::AvbInterface(d) => {
            ser.pack(&d.object_name)?
                .write_u16(d.localized_description.0)?
                .pack(&d.mac_address)?
                .write_u16(d.interface_flags.bits())?
                .pack(&d.clock_identity)?
                .write_u8(d.priority1)?
                .write_u8(d.clock_class)?
                .write_u16(d.offset_scaled_log_variance)?
                .write_u8(d.clock_accuracy)?
                .write_u8(d.priority2)?
                .write_u8(d.domain_number)?
                .write_i8(d.log_sync_interval)?
                .write_i8(d.log_announce_interval)?
                .write_i8(d.log_pdelay_interval)?
                .write_u16(d.port_number)?;
            Ok(())
        }
        Descriptor::ClockSource(d) => {
            ser.pack(&d.object_name)?
                .write_u16(d.localized_description.0)?
                .write_u16(d.clock_source_flags.bits())?
                .write_u16(d.clock_source_type)?
                .pack(&d.clock_source_identifier)?
                .write_u16(d.clock_source_location_type.value())?
                .write_u16(d.clock_source_location_index)?;
            Ok(())
        }
        Descriptor::MemoryObject(d) => {
            ser.pack(&d.object_name)?
                .write_u16(d.localized_description.0)?
                .write_u16(d.memory_object_type)?
                .write_u16(d.target_descriptor_type.value())?
                .write_u16(d.target_descriptor_index)?
                .write_u64(d.start_address)?
                .write_u64(d.maximum_length)?
                .write_u64(d.length)?;
            Ok(())
        }
        Descriptor::Locale(d) => {
            ser.pack(&d.locale_id)?.pack(&d.strings)?;
            Ok(())
        }
        Descriptor::Strings(d) => {
            for string in &d.strings {
                ser.pack(string)?;
            }
            Ok(())
        }
        Descriptor::StreamPortInput(d) | Descriptor::StreamPortOutput(d) => {
            ser.write_u16(d.clock_domain_index)?
                .write_u16(d.port_flags.bits())?
                .pack(&d.controls)?
                .pack(&d.clusters)?
                .pack(&d.maps)?;
            Ok(())
        }
        Descriptor::AudioCluster(d) => {
            ser.pack(&d.object_name)?
                .write_u16(d.localized_description.0)?
                .write_u16(d.signal_type.value())?
                .write_u16(d.signal_index)?
                .write_u16(d.signal_output)?
                .write_u32(d.path_latency)?
                .write_u32(d.block_latency)?
                .write_u16(d.channel_count)?
                .write_u8(d.format)?;
            Ok(())
        }
        Descriptor::AudioMap(d) => {
            ser.write_u16(variable_offset(body_length::AUDIO_MAP))?
                .write_u16(list_count(d.mappings.len())?)?;
            for mapping in &d.mappings {
                ser.pack(mapping)?;
            }
            Ok(())
        }
        Descriptor::ClockDomain(d) => {
            ser.pack(&d.object_name)?
                .write_u16(d.localized_description.0)?
                .write_u16(d.clock_source_index)?
                .write_u16(variable_offset(body_length::CLOCK_DOMAIN))?
                .write_u16(list_count(d.clock_sources.len())?)?;
            for index in &d.clock_sources {
                ser.write_u16(*index)?;
            }
            Ok(())
        }
    }
}

/// Offset field value for a variable part following a fixed body of
/// `fixed_length` bytes.
fn variable_offset(fixed_length: usize) -> u16 {
    let position = READ_DESCRIPTOR_COMMON_RESPONSE_LENGTH + fixed_length;
    u16::try_from(position - DESCRIPTOR_BASE).unwrap_or(u16::MAX)
}

fn write_entity<const N: usize>(
    ser: &mut Serializer<N>,
    d: &EntityDescriptor,
) -> Result<(), PduError> {
    ser.pack(&d.entity_id)?
        .pack(&d.entity_model_id)?
        .write_u32(d.entity_capabilities.bits())?
        .write_u16(d.talker_stream_sources)?
        .write_u16(d.talker_capabilities.bits())?
        .write_u16(d.listener_stream_sinks)?
        .write_u16(d.listener_capabilities.bits())?
        .write_u32(d.controller_capabilities.bits())?
        .write_u32(d.available_index)?
        .pack(&d.association_id)?
        .pack(&d.entity_name)?
        .write_u16(d.vendor_name_string.0)?
        .write_u16(d.model_name_string.0)?
        .pack(&d.firmware_version)?
        .pack(&d.group_name)?
        .pack(&d.serial_number)?
        .write_u16(d.configurations_count)?
        .write_u16(d.current_configuration)?;
    Ok(())
}

fn write_configuration<const N: usize>(
    ser: &mut Serializer<N>,
    d: &ConfigurationDescriptor,
) -> Result<(), PduError> {
    ser.pack(&d.object_name)?
        .write_u16(d.localized_description.0)?
        .write_u16(list_count(d.descriptor_counts.len())?)?
        .write_u16(variable_offset(body_length::CONFIGURATION))?;
    for (descriptor_type, count) in &d.descriptor_counts {
        ser.write_u16(descriptor_type.value())?.write_u16(*count)?;
    }
    Ok(())
}

fn write_audio_unit<const N: usize>(
    ser: &mut Serializer<N>,
    d: &AudioUnitDescriptor,
) -> Result<(), PduError> {
    ser.pack(&d.object_name)?
        .write_u16(d.localized_description.0)?
        .write_u16(d.clock_domain_index)?;
    for range in [
        &d.stream_input_ports,
        &d.stream_output_ports,
        &d.external_input_ports,
        &d.external_output_ports,
        &d.internal_input_ports,
        &d.internal_output_ports,
        &d.controls,
        &d.signal_selectors,
        &d.mixers,
        &d.matrices,
        &d.splitters,
        &d.combiners,
        &d.demultiplexers,
        &d.multiplexers,
        &d.transcoders,
        &d.control_blocks,
    ] {
        ser.pack(range)?;
    }
    ser.write_u32(d.current_sampling_rate.0)?
        .write_u16(variable_offset(body_length::AUDIO_UNIT))?
        .write_u16(list_count(d.sampling_rates.len())?)?;
    for rate in &d.sampling_rates {
        ser.write_u32(rate.0)?;
    }
    Ok(())
}

fn write_stream<const N: usize>(
    ser: &mut Serializer<N>,
    d: &StreamDescriptor,
) -> Result<(), PduError> {
    ser.pack(&d.object_name)?
        .write_u16(d.localized_description.0)?
        .write_u16(d.clock_domain_index)?
        .write_u16(d.stream_flags.bits())?
        .write_u64(d.current_format.0)?;
    ser.write_u16(variable_offset(body_length::STREAM))?
        .write_u16(list_count(d.formats.len())?)?;
    for (entity_id, unique_id) in &d.backup_talkers {
        ser.pack(entity_id)?.write_u16(*unique_id)?;
    }
    ser.pack(&d.backedup_talker.0)?
        .write_u16(d.backedup_talker.1)?
        .write_u16(d.avb_interface_index)?
        .write_u32(d.buffer_length)?;
    for format in &d.formats {
        ser.write_u64(format.0)?;
    }
    Ok(())
}

/// Position the deserializer on a variable part and check it fits.
fn seek_variable_part(
    des: &mut Deserializer<'_>,
    offset: u16,
    count: u16,
    item_size: usize,
) -> Result<(), PduError> {
    let fixed_end = des.used_bytes();
    let position = usize::from(offset) + DESCRIPTOR_BASE;
    if position < fixed_end {
        return Err(PduError::InvalidDescriptorOffset {
            offset: usize::from(offset),
            minimum: fixed_end - DESCRIPTOR_BASE,
        });
    }
    des.set_position(position.min(des.len()))?;
    ensure_remaining(des, count, item_size)
}

fn read_descriptor(
    payload: &[u8],
    descriptor_type: DescriptorType,
) -> Result<Option<Descriptor>, PduError> {
    let length = match descriptor_type {
        DescriptorType::ENTITY => body_length::ENTITY,
        DescriptorType::CONFIGURATION => body_length::CONFIGURATION,
        DescriptorType::AUDIO_UNIT => body_length::AUDIO_UNIT,
        DescriptorType::STREAM_INPUT | DescriptorType::STREAM_OUTPUT => body_length::STREAM,
        DescriptorType::JACK_INPUT | DescriptorType::JACK_OUTPUT => body_length::JACK,
        DescriptorType::AVB_INTERFACE => body_length::AVB_INTERFACE,
        DescriptorType::CLOCK_SOURCE => body_length::CLOCK_SOURCE,
        DescriptorType::MEMORY_OBJECT => body_length::MEMORY_OBJECT,
        DescriptorType::LOCALE => body_length::LOCALE,
        DescriptorType::STRINGS => body_length::STRINGS,
        DescriptorType::STREAM_PORT_INPUT | DescriptorType::STREAM_PORT_OUTPUT => {
            body_length::STREAM_PORT
        }
        DescriptorType::AUDIO_CLUSTER => body_length::AUDIO_CLUSTER,
        DescriptorType::AUDIO_MAP => body_length::AUDIO_MAP,
        DescriptorType::CLOCK_DOMAIN => body_length::CLOCK_DOMAIN,
        other => {
            tracing::trace!(descriptor_type = %other, "descriptor body not decoded");
            return Ok(None);
        }
    };

    let des = &mut checked(payload, READ_DESCRIPTOR_COMMON_RESPONSE_LENGTH + length)?;
    des.set_position(READ_DESCRIPTOR_COMMON_RESPONSE_LENGTH)?;

    let descriptor = match descriptor_type {
        DescriptorType::ENTITY => Descriptor::Entity(read_entity(des)?),
        DescriptorType::CONFIGURATION => Descriptor::Configuration(read_configuration(des)?),
        DescriptorType::AUDIO_UNIT => Descriptor::AudioUnit(read_audio_unit(des)?),
        DescriptorType::STREAM_INPUT => Descriptor::StreamInput(read_stream(des)?),
        DescriptorType::STREAM_OUTPUT => Descriptor::StreamOutput(read_stream(des)?),
        DescriptorType::JACK_INPUT => Descriptor::JackInput(read_jack(des)?),
        DescriptorType::JACK_OUTPUT => Descriptor::JackOutput(read_jack(des)?),
        DescriptorType::AVB_INTERFACE => Descriptor::AvbInterface(read_avb_interface(des)?),
        DescriptorType::CLOCK_SOURCE => Descriptor::ClockSource(read_clock_source(des)?),
        DescriptorType::MEMORY_OBJECT => Descriptor::MemoryObject(read_memory_object(des)?),
        DescriptorType::LOCALE => Descriptor::Locale(LocaleDescriptor {
            locale_id: des.unpack()?,
            strings: des.unpack()?,
        }),
        DescriptorType::STRINGS => {
            let mut strings = StringsDescriptor::default();
            for string in &mut strings.strings {
                *string = des.unpack()?;
            }
            Descriptor::Strings(strings)
        }
        DescriptorType::STREAM_PORT_INPUT => Descriptor::StreamPortInput(read_stream_port(des)?),
        DescriptorType::STREAM_PORT_OUTPUT => Descriptor::StreamPortOutput(read_stream_port(des)?),
        DescriptorType::AUDIO_CLUSTER => Descriptor::AudioCluster(read_audio_cluster(des)?),
        DescriptorType::AUDIO_MAP => {
            let offset = des.read_u16()?;
            let count = des.read_u16()?;
            seek_variable_part(des, offset, count, AudioMapping::SIZE)?;
            let mappings = (0..count)
                .map(|_| des.unpack())
                .collect::<Result<Vec<AudioMapping>, _>>()?;
            Descriptor::AudioMap(AudioMapDescriptor { mappings })
        }
        _ => Descriptor::ClockDomain(read_clock_domain(des)?),
    };

    Ok(Some(descriptor))
}

fn read_string_ref(des: &mut Deserializer<'_>) -> Result<LocalizedStringReference, PduError> {
    Ok(LocalizedStringReference(des.read_u16()?))
}

fn read_entity(des: &mut Deserializer<'_>) -> Result<EntityDescriptor, PduError> {
    Ok(EntityDescriptor {
        entity_id: des.unpack()?,
        entity_model_id: des.unpack()?,
        entity_capabilities: EntityCapabilities::from_bits(des.read_u32()?),
        talker_stream_sources: des.read_u16()?,
        talker_capabilities: TalkerCapabilities::from_bits(des.read_u16()?),
        listener_stream_sinks: des.read_u16()?,
        listener_capabilities: ListenerCapabilities::from_bits(des.read_u16()?),
        controller_capabilities: ControllerCapabilities::from_bits(des.read_u32()?),
        available_index: des.read_u32()?,
        association_id: des.unpack()?,
        entity_name: des.unpack()?,
        vendor_name_string: read_string_ref(des)?,
        model_name_string: read_string_ref(des)?,
        firmware_version: des.unpack()?,
        group_name: des.unpack()?,
        serial_number: des.unpack()?,
        configurations_count: des.read_u16()?,
        current_configuration: des.read_u16()?,
    })
}

fn read_configuration(des: &mut Deserializer<'_>) -> Result<ConfigurationDescriptor, PduError> {
    let object_name = des.unpack()?;
    let localized_description = read_string_ref(des)?;
    let count = des.read_u16()?;
    let offset = des.read_u16()?;
    seek_variable_part(des, offset, count, 4)?;

    let mut descriptor_counts = std::collections::BTreeMap::new();
    for _ in 0..count {
        let descriptor_type = read_descriptor_type(des)?;
        descriptor_counts.insert(descriptor_type, des.read_u16()?);
    }
    Ok(ConfigurationDescriptor {
        object_name,
        localized_description,
        descriptor_counts,
    })
}

fn read_audio_unit(des: &mut Deserializer<'_>) -> Result<AudioUnitDescriptor, PduError> {
    let mut d = AudioUnitDescriptor {
        object_name: des.unpack()?,
        localized_description: read_string_ref(des)?,
        clock_domain_index: des.read_u16()?,
        ..AudioUnitDescriptor::default()
    };
    for range in [
        &mut d.stream_input_ports,
        &mut d.stream_output_ports,
        &mut d.external_input_ports,
        &mut d.external_output_ports,
        &mut d.internal_input_ports,
        &mut d.internal_output_ports,
        &mut d.controls,
        &mut d.signal_selectors,
        &mut d.mixers,
        &mut d.matrices,
        &mut d.splitters,
        &mut d.combiners,
        &mut d.demultiplexers,
        &mut d.multiplexers,
        &mut d.transcoders,
        &mut d.control_blocks,
    ] {
        *range = des.unpack()?;
    }
    d.current_sampling_rate = SamplingRate(des.read_u32()?);
    let offset = des.read_u16()?;
    let count = des.read_u16()?;
    seek_variable_part(des, offset, count, 4)?;
    d.sampling_rates = (0..count)
        .map(|_| des.read_u32().map(SamplingRate))
        .collect::<Result<_, _>>()?;
    Ok(d)
}

fn read_stream(des: &mut Deserializer<'_>) -> Result<StreamDescriptor, PduError> {
    let mut d = StreamDescriptor {
        object_name: des.unpack()?,
        localized_description: read_string_ref(des)?,
        clock_domain_index: des.read_u16()?,
        stream_flags: StreamFlags::from_bits(des.read_u16()?),
        current_format: StreamFormat(des.read_u64()?),
        ..StreamDescriptor::default()
    };
    let offset = des.read_u16()?;
    let count = des.read_u16()?;
    for talker in &mut d.backup_talkers {
        *talker = (des.unpack()?, des.read_u16()?);
    }
    d.backedup_talker = (des.unpack()?, des.read_u16()?);
    d.avb_interface_index = des.read_u16()?;
    d.buffer_length = des.read_u32()?;

    // Milan redundancy fields may sit between the fixed part and the formats
    seek_variable_part(des, offset, count, 8)?;
    d.formats = (0..count)
        .map(|_| des.read_u64().map(StreamFormat))
        .collect::<Result<_, _>>()?;
    Ok(d)
}

fn read_jack(des: &mut Deserializer<'_>) -> Result<JackDescriptor, PduError> {
    Ok(JackDescriptor {
        object_name: des.unpack()?,
        localized_description: read_string_ref(des)?,
        jack_flags: JackFlags::from_bits(des.read_u16()?),
        jack_type: des.read_u16()?,
        controls: des.unpack()?,
    })
}

fn read_avb_interface(des: &mut Deserializer<'_>) -> Result<AvbInterfaceDescriptor, PduError> {
    Ok(AvbInterfaceDescriptor {
        object_name: des.unpack()?,
        localized_description: read_string_ref(des)?,
        mac_address: des.unpack()?,
        interface_flags: AvbInterfaceFlags::from_bits(des.read_u16()?),
        clock_identity: des.unpack()?,
        priority1: des.read_u8()?,
        clock_class: des.read_u8()?,
        offset_scaled_log_variance: des.read_u16()?,
        clock_accuracy: des.read_u8()?,
        priority2: des.read_u8()?,
        domain_number: des.read_u8()?,
        log_sync_interval: des.read_i8()?,
        log_announce_interval: des.read_i8()?,
        log_pdelay_interval: des.read_i8()?,
        port_number: des.read_u16()?,
    })
}

fn read_clock_source(des: &mut Deserializer<'_>) -> Result<ClockSourceDescriptor, PduError> {
    Ok(ClockSourceDescriptor {
        object_name: des.unpack()?,
        localized_description: read_string_ref(des)?,
        clock_source_flags: ClockSourceFlags::from_bits(des.read_u16()?),
        clock_source_type: des.read_u16()?,
        clock_source_identifier: des.unpack()?,
        clock_source_location_type: read_descriptor_type(des)?,
        clock_source_location_index: des.read_u16()?,
    })
}

fn read_memory_object(des: &mut Deserializer<'_>) -> Result<MemoryObjectDescriptor, PduError> {
    Ok(MemoryObjectDescriptor {
        object_name: des.unpack()?,
        localized_description: read_string_ref(des)?,
        memory_object_type: des.read_u16()?,
        target_descriptor_type: read_descriptor_type(des)?,
        target_descriptor_index: des.read_u16()?,
        start_address: des.read_u64()?,
        maximum_length: des.read_u64()?,
        length: des.read_u64()?,
    })
}

fn read_stream_port(des: &mut Deserializer<'_>) -> Result<StreamPortDescriptor, PduError> {
    Ok(StreamPortDescriptor {
        clock_domain_index: des.read_u16()?,
        port_flags: PortFlags::from_bits(des.read_u16()?),
        controls: des.unpack()?,
        clusters: des.unpack()?,
        maps: des.unpack()?,
    })
}

fn read_audio_cluster(des: &mut Deserializer<'_>) -> Result<AudioClusterDescriptor, PduError> {
    Ok(AudioClusterDescriptor {
        object_name: des.unpack()?,
        localized_description: read_string_ref(des)?,
        signal_type: read_descriptor_type(des)?,
        signal_index: des.read_u16()?,
        signal_output: des.read_u16()?,
        path_latency: des.read_u32()?,
        block_latency: des.read_u32()?,
        channel_count: des.read_u16()?,
        format: des.read_u8()?,
    })
}

fn read_clock_domain(des: &mut Deserializer<'_>) -> Result<ClockDomainDescriptor, PduError> {
    let object_name = des.unpack()?;
    let localized_description = read_string_ref(des)?;
    let clock_source_index = des.read_u16()?;
    let offset = des.read_u16()?;
    let count = des.read_u16()?;
    seek_variable_part(des, offset, count, 2)?;
    let clock_sources = (0..count)
        .map(|_| des.read_u16())
        .collect::<Result<_, _>>()?;
    Ok(ClockDomainDescriptor {
        object_name,
        localized_description,
        clock_source_index,
        clock_sources,
    })
}
