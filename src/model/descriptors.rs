//! Descriptor structures, as carried by READ_DESCRIPTOR responses.
//!
//! These are plain data. Wire encoding lives in
//! [`crate::protocol::payloads::descriptors`].

use std::collections::BTreeMap;

use super::types::{
    AudioMapping, ClockSourceIndex, ConfigurationIndex, DescriptorIndex, DescriptorRange,
    LocalizedStringReference, SamplingRate, StreamFormat,
};
use crate::protocol::defines::{
    ControllerCapabilities, DescriptorType, EntityCapabilities, ListenerCapabilities,
    TalkerCapabilities, flag_set,
};
use crate::types::{AvdeccFixedString, MacAddress, UniqueIdentifier};

flag_set! {
    /// Static capabilities of a stream
    StreamFlags(u16) {
        /// Usable as a clock synchronization source
        CLOCK_SYNC_SOURCE = 1 << 0,
        /// Supports class A
        CLASS_A = 1 << 1,
        /// Supports class B
        CLASS_B = 1 << 2,
        /// Supports encrypted PDUs
        SUPPORTS_ENCRYPTED = 1 << 3,
        /// Primary backup talker supported
        PRIMARY_BACKUP_SUPPORTED = 1 << 4,
        /// Primary backup talker valid
        PRIMARY_BACKUP_VALID = 1 << 5,
        /// Secondary backup talker supported
        SECONDARY_BACKUP_SUPPORTED = 1 << 6,
        /// Secondary backup talker valid
        SECONDARY_BACKUP_VALID = 1 << 7,
        /// Tertiary backup talker supported
        TERTIARY_BACKUP_SUPPORTED = 1 << 8,
        /// Tertiary backup talker valid
        TERTIARY_BACKUP_VALID = 1 << 9,
    }
}

flag_set! {
    /// Jack properties
    JackFlags(u16) {
        /// Usable as a clock synchronization source
        CLOCK_SYNC_SOURCE = 1 << 0,
        /// Hardwired
        CAPTIVE = 1 << 1,
    }
}

flag_set! {
    /// AVB interface capabilities
    AvbInterfaceFlags(u16) {
        /// Can be 802.1AS grandmaster
        GPTP_GRANDMASTER_SUPPORTED = 1 << 0,
        /// Supports 802.1AS
        GPTP_SUPPORTED = 1 << 1,
        /// Supports SRP
        SRP_SUPPORTED = 1 << 2,
    }
}

flag_set! {
    /// How an input stream clock source is identified
    ClockSourceFlags(u16) {
        /// By stream ID
        STREAM_ID = 1 << 0,
        /// By local ID
        LOCAL_ID = 1 << 1,
    }
}

flag_set! {
    /// Port properties
    PortFlags(u16) {
        /// Usable as a clock synchronization source
        CLOCK_SYNC_SOURCE = 1 << 0,
        /// Asynchronous sample rate converter
        ASYNC_SAMPLE_RATE_CONV = 1 << 1,
        /// Synchronous sample rate converter
        SYNC_SAMPLE_RATE_CONV = 1 << 2,
    }
}

/// ENTITY descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityDescriptor {
    /// Entity ID
    pub entity_id: UniqueIdentifier,
    /// Entity model ID
    pub entity_model_id: UniqueIdentifier,
    /// Entity capabilities
    pub entity_capabilities: EntityCapabilities,
    /// Number of output streams
    pub talker_stream_sources: u16,
    /// Talker capabilities
    pub talker_capabilities: TalkerCapabilities,
    /// Number of input streams
    pub listener_stream_sinks: u16,
    /// Listener capabilities
    pub listener_capabilities: ListenerCapabilities,
    /// Controller capabilities
    pub controller_capabilities: ControllerCapabilities,
    /// Current available index
    pub available_index: u32,
    /// Association ID
    pub association_id: UniqueIdentifier,
    /// Entity name
    pub entity_name: AvdeccFixedString,
    /// Vendor name
    pub vendor_name_string: LocalizedStringReference,
    /// Model name
    pub model_name_string: LocalizedStringReference,
    /// Firmware version
    pub firmware_version: AvdeccFixedString,
    /// Group name
    pub group_name: AvdeccFixedString,
    /// Serial number
    pub serial_number: AvdeccFixedString,
    /// Number of configurations
    pub configurations_count: u16,
    /// Active configuration
    pub current_configuration: ConfigurationIndex,
}

/// CONFIGURATION descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Number of top-level descriptors of each type
    pub descriptor_counts: BTreeMap<DescriptorType, u16>,
}

/// AUDIO_UNIT descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioUnitDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Clock domain of the unit
    pub clock_domain_index: DescriptorIndex,
    /// Stream input ports
    pub stream_input_ports: DescriptorRange,
    /// Stream output ports
    pub stream_output_ports: DescriptorRange,
    /// External input ports
    pub external_input_ports: DescriptorRange,
    /// External output ports
    pub external_output_ports: DescriptorRange,
    /// Internal input ports
    pub internal_input_ports: DescriptorRange,
    /// Internal output ports
    pub internal_output_ports: DescriptorRange,
    /// Controls
    pub controls: DescriptorRange,
    /// Signal selectors
    pub signal_selectors: DescriptorRange,
    /// Mixers
    pub mixers: DescriptorRange,
    /// Matrices
    pub matrices: DescriptorRange,
    /// Signal splitters
    pub splitters: DescriptorRange,
    /// Signal combiners
    pub combiners: DescriptorRange,
    /// Signal demultiplexers
    pub demultiplexers: DescriptorRange,
    /// Signal multiplexers
    pub multiplexers: DescriptorRange,
    /// Signal transcoders
    pub transcoders: DescriptorRange,
    /// Control blocks
    pub control_blocks: DescriptorRange,
    /// Current sampling rate
    pub current_sampling_rate: SamplingRate,
    /// Supported sampling rates
    pub sampling_rates: Vec<SamplingRate>,
}

/// STREAM_INPUT or STREAM_OUTPUT descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Clock domain of the stream
    pub clock_domain_index: DescriptorIndex,
    /// Static capabilities
    pub stream_flags: StreamFlags,
    /// Current format
    pub current_format: StreamFormat,
    /// Backup talkers, primary to tertiary
    pub backup_talkers: [(UniqueIdentifier, u16); 3],
    /// Talker this stream backs up
    pub backedup_talker: (UniqueIdentifier, u16),
    /// AVB interface the stream uses
    pub avb_interface_index: DescriptorIndex,
    /// Buffer length in nanoseconds
    pub buffer_length: u32,
    /// Supported formats
    pub formats: Vec<StreamFormat>,
}

/// JACK_INPUT or JACK_OUTPUT descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JackDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Jack properties
    pub jack_flags: JackFlags,
    /// Physical connector kind
    pub jack_type: u16,
    /// Controls on the jack
    pub controls: DescriptorRange,
}

/// AVB_INTERFACE descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvbInterfaceDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Interface MAC address
    pub mac_address: MacAddress,
    /// Capabilities
    pub interface_flags: AvbInterfaceFlags,
    /// 802.1AS clock identity
    pub clock_identity: UniqueIdentifier,
    /// gPTP priority1
    pub priority1: u8,
    /// gPTP clock class
    pub clock_class: u8,
    /// gPTP offset scaled log variance
    pub offset_scaled_log_variance: u16,
    /// gPTP clock accuracy
    pub clock_accuracy: u8,
    /// gPTP priority2
    pub priority2: u8,
    /// gPTP domain
    pub domain_number: u8,
    /// Log2 sync interval
    pub log_sync_interval: i8,
    /// Log2 announce interval
    pub log_announce_interval: i8,
    /// Log2 peer delay interval
    pub log_pdelay_interval: i8,
    /// 802.1AS port number
    pub port_number: u16,
}

/// CLOCK_SOURCE descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockSourceDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Identification flags
    pub clock_source_flags: ClockSourceFlags,
    /// Internal, external or input stream
    pub clock_source_type: u16,
    /// Source identifier
    pub clock_source_identifier: UniqueIdentifier,
    /// Descriptor type of the source location
    pub clock_source_location_type: DescriptorType,
    /// Descriptor index of the source location
    pub clock_source_location_index: DescriptorIndex,
}

/// MEMORY_OBJECT descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryObjectDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Firmware image, log, settings...
    pub memory_object_type: u16,
    /// Descriptor the object belongs to
    pub target_descriptor_type: DescriptorType,
    /// Index of that descriptor
    pub target_descriptor_index: DescriptorIndex,
    /// Start address
    pub start_address: u64,
    /// Maximum length
    pub maximum_length: u64,
    /// Current length
    pub length: u64,
}

/// LOCALE descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocaleDescriptor {
    /// Locale identifier, e.g. `en-US`
    pub locale_id: AvdeccFixedString,
    /// Strings descriptors of the locale
    pub strings: DescriptorRange,
}

/// STRINGS descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringsDescriptor {
    /// The seven strings
    pub strings: [AvdeccFixedString; 7],
}

/// STREAM_PORT_INPUT or STREAM_PORT_OUTPUT descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamPortDescriptor {
    /// Clock domain of the port
    pub clock_domain_index: DescriptorIndex,
    /// Port properties
    pub port_flags: PortFlags,
    /// Controls on the port
    pub controls: DescriptorRange,
    /// Audio clusters
    pub clusters: DescriptorRange,
    /// Static audio maps
    pub maps: DescriptorRange,
}

/// AUDIO_CLUSTER descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioClusterDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Type of the signal source
    pub signal_type: DescriptorType,
    /// Index of the signal source
    pub signal_index: DescriptorIndex,
    /// Output of the signal source
    pub signal_output: u16,
    /// Path latency in nanoseconds
    pub path_latency: u32,
    /// Block latency in nanoseconds
    pub block_latency: u32,
    /// Number of channels
    pub channel_count: u16,
    /// Cluster format
    pub format: u8,
}

/// AUDIO_MAP descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioMapDescriptor {
    /// Static mappings
    pub mappings: Vec<AudioMapping>,
}

/// CLOCK_DOMAIN descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClockDomainDescriptor {
    /// Object name
    pub object_name: AvdeccFixedString,
    /// Localized description
    pub localized_description: LocalizedStringReference,
    /// Current clock source
    pub clock_source_index: ClockSourceIndex,
    /// Selectable clock sources
    pub clock_sources: Vec<ClockSourceIndex>,
}

/// Any supported descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// ENTITY
    Entity(EntityDescriptor),
    /// CONFIGURATION
    Configuration(ConfigurationDescriptor),
    /// AUDIO_UNIT
    AudioUnit(AudioUnitDescriptor),
    /// STREAM_INPUT
    StreamInput(StreamDescriptor),
    /// STREAM_OUTPUT
    StreamOutput(StreamDescriptor),
    /// JACK_INPUT
    JackInput(JackDescriptor),
    /// JACK_OUTPUT
    JackOutput(JackDescriptor),
    /// AVB_INTERFACE
    AvbInterface(AvbInterfaceDescriptor),
    /// CLOCK_SOURCE
    ClockSource(ClockSourceDescriptor),
    /// MEMORY_OBJECT
    MemoryObject(MemoryObjectDescriptor),
    /// LOCALE
    Locale(LocaleDescriptor),
    /// STRINGS
    Strings(StringsDescriptor),
    /// STREAM_PORT_INPUT
    StreamPortInput(StreamPortDescriptor),
    /// STREAM_PORT_OUTPUT
    StreamPortOutput(StreamPortDescriptor),
    /// AUDIO_CLUSTER
    AudioCluster(AudioClusterDescriptor),
    /// AUDIO_MAP
    AudioMap(AudioMapDescriptor),
    /// CLOCK_DOMAIN
    ClockDomain(ClockDomainDescriptor),
}

impl Descriptor {
    /// Wire descriptor type
    #[must_use]
    pub fn descriptor_type(&self) -> DescriptorType {
        match self {
            Self::Entity(_) => DescriptorType::ENTITY,
            Self::Configuration(_) => DescriptorType::CONFIGURATION,
            Self::AudioUnit(_) => DescriptorType::AUDIO_UNIT,
            Self::StreamInput(_) => DescriptorType::STREAM_INPUT,
            Self::StreamOutput(_) => DescriptorType::STREAM_OUTPUT,
            Self::JackInput(_) => DescriptorType::JACK_INPUT,
            Self::JackOutput(_) => DescriptorType::JACK_OUTPUT,
            Self::AvbInterface(_) => DescriptorType::AVB_INTERFACE,
            Self::ClockSource(_) => DescriptorType::CLOCK_SOURCE,
            Self::MemoryObject(_) => DescriptorType::MEMORY_OBJECT,
            Self::Locale(_) => DescriptorType::LOCALE,
            Self::Strings(_) => DescriptorType::STRINGS,
            Self::StreamPortInput(_) => DescriptorType::STREAM_PORT_INPUT,
            Self::StreamPortOutput(_) => DescriptorType::STREAM_PORT_OUTPUT,
            Self::AudioCluster(_) => DescriptorType::AUDIO_CLUSTER,
            Self::AudioMap(_) => DescriptorType::AUDIO_MAP,
            Self::ClockDomain(_) => DescriptorType::CLOCK_DOMAIN,
        }
    }

    /// Object name, for descriptors that have one
    #[must_use]
    pub fn object_name(&self) -> Option<&AvdeccFixedString> {
        match self {
            Self::Entity(d) => Some(&d.entity_name),
            Self::Configuration(d) => Some(&d.object_name),
            Self::AudioUnit(d) => Some(&d.object_name),
            Self::StreamInput(d) | Self::StreamOutput(d) => Some(&d.object_name),
            Self::JackInput(d) | Self::JackOutput(d) => Some(&d.object_name),
            Self::AvbInterface(d) => Some(&d.object_name),
            Self::ClockSource(d) => Some(&d.object_name),
            Self::MemoryObject(d) => Some(&d.object_name),
            Self::AudioCluster(d) => Some(&d.object_name),
            Self::ClockDomain(d) => Some(&d.object_name),
            Self::Locale(_)
            | Self::Strings(_)
            | Self::StreamPortInput(_)
            | Self::StreamPortOutput(_)
            | Self::AudioMap(_) => None,
        }
    }
}
