//! Value types shared by descriptors and command payloads

use std::fmt;

use crate::protocol::defines::{AcmpStatus, flag_set};
use crate::protocol::serialization::{
    Deserializer, Pack, SerializationError, Serializer, Unpack,
};
use crate::types::{MacAddress, UniqueIdentifier};

/// Index of a configuration descriptor
pub type ConfigurationIndex = u16;
/// Index of a descriptor within its configuration
pub type DescriptorIndex = u16;
/// Index of a stream descriptor
pub type StreamIndex = u16;
/// Index of a clock source descriptor
pub type ClockSourceIndex = u16;
/// Index of a map within a stream port
pub type MapIndex = u16;
/// Identifier of a long-running memory object operation
pub type OperationId = u16;

/// Reference into the strings descriptors of a locale
///
/// The high 13 bits select the strings descriptor, the low 3 bits pick one
/// of its seven strings. `0xFFFF` means no string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalizedStringReference(pub u16);

impl LocalizedStringReference {
    /// No localized string
    pub const NONE: Self = Self(0xFFFF);

    /// Whether a string is referenced
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::NONE.0
    }
}

impl Default for LocalizedStringReference {
    fn default() -> Self {
        Self::NONE
    }
}

/// IEEE 1722 stream format, kept as its raw 64-bit encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StreamFormat(pub u64);

impl StreamFormat {
    /// The null format
    pub const NULL: Self = Self(0);
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

/// Sampling rate: 3-bit pull field and 29-bit base frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SamplingRate(pub u32);

impl SamplingRate {
    /// Rate with no pull
    #[must_use]
    pub const fn from_hz(hz: u32) -> Self {
        Self(hz & 0x1FFF_FFFF)
    }

    /// Pull multiplier code
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn pull(self) -> u8 {
        (self.0 >> 29) as u8
    }

    /// Base frequency in Hz
    #[must_use]
    pub const fn base_frequency(self) -> u32 {
        self.0 & 0x1FFF_FFFF
    }
}

impl fmt::Display for SamplingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pull() {
            0 => write!(f, "{} Hz", self.base_frequency()),
            pull => write!(f, "{} Hz (pull {pull})", self.base_frequency()),
        }
    }
}

/// Contiguous run of child descriptors: how many, starting at which index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorRange {
    /// Number of descriptors
    pub count: u16,
    /// Index of the first one
    pub base: DescriptorIndex,
}

impl DescriptorRange {
    /// Range of `count` descriptors starting at `base`
    #[must_use]
    pub const fn new(count: u16, base: DescriptorIndex) -> Self {
        Self { count, base }
    }
}

impl Pack for DescriptorRange {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        ser.write_u16(self.count)?.write_u16(self.base).map(|_| ())
    }
}

impl Unpack for DescriptorRange {
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError> {
        Ok(Self {
            count: des.read_u16()?,
            base: des.read_u16()?,
        })
    }
}

/// One stream channel to cluster channel route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AudioMapping {
    /// Stream descriptor index
    pub stream_index: StreamIndex,
    /// Channel within the stream
    pub stream_channel: u16,
    /// Cluster offset from the port's base cluster
    pub cluster_offset: u16,
    /// Channel within the cluster
    pub cluster_channel: u16,
}

impl AudioMapping {
    /// Bytes on the wire
    pub const SIZE: usize = 8;
}

impl Pack for AudioMapping {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        ser.write_u16(self.stream_index)?
            .write_u16(self.stream_channel)?
            .write_u16(self.cluster_offset)?
            .write_u16(self.cluster_channel)
            .map(|_| ())
    }
}

impl Unpack for AudioMapping {
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError> {
        Ok(Self {
            stream_index: des.read_u16()?,
            stream_channel: des.read_u16()?,
            cluster_offset: des.read_u16()?,
            cluster_channel: des.read_u16()?,
        })
    }
}

/// SRP traffic class parameters of an AVB interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsrpMapping {
    /// Traffic class
    pub traffic_class: u8,
    /// Priority code point
    pub priority: u8,
    /// VLAN used by the class
    pub vlan_id: u16,
}

impl MsrpMapping {
    /// Bytes on the wire
    pub const SIZE: usize = 4;
}

impl Pack for MsrpMapping {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        ser.write_u8(self.traffic_class)?
            .write_u8(self.priority)?
            .write_u16(self.vlan_id)
            .map(|_| ())
    }
}

impl Unpack for MsrpMapping {
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError> {
        Ok(Self {
            traffic_class: des.read_u8()?,
            priority: des.read_u8()?,
            vlan_id: des.read_u16()?,
        })
    }
}

flag_set! {
    /// Dynamic state of a stream
    StreamInfoFlags(u32) {
        /// Class B rather than class A
        CLASS_B = 1 << 0,
        /// Connected or connecting in fast connect mode
        FAST_CONNECT = 1 << 1,
        /// Connection has saved ACMP state
        SAVED_STATE = 1 << 2,
        /// Stream is in STREAMING_WAIT
        STREAMING_WAIT = 1 << 3,
        /// Encrypted PDUs supported
        SUPPORTS_ENCRYPTED = 1 << 4,
        /// Encrypted PDUs in use
        ENCRYPTED_PDU = 1 << 5,
        /// Listener registered an SRP talker failed attribute
        TALKER_FAILED = 1 << 6,
        /// `stream_vlan_id` is valid
        STREAM_VLAN_ID_VALID = 1 << 25,
        /// Connected with ACMP
        CONNECTED = 1 << 26,
        /// MSRP failure fields are valid
        MSRP_FAILURE_VALID = 1 << 27,
        /// `stream_dest_mac` is valid
        STREAM_DEST_MAC_VALID = 1 << 28,
        /// `msrp_accumulated_latency` is valid
        MSRP_ACC_LAT_VALID = 1 << 29,
        /// `stream_id` is valid
        STREAM_ID_VALID = 1 << 30,
        /// `stream_format` is valid
        STREAM_FORMAT_VALID = 1 << 31,
    }
}

flag_set! {
    /// Milan extension flags of GET_STREAM_INFO
    StreamInfoFlagsEx(u32) {
        /// Stream is registering
        REGISTERING = 1 << 0,
    }
}

/// Milan extension of a GET_STREAM_INFO response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MilanStreamInfo {
    /// Extended flags
    pub flags_ex: StreamInfoFlagsEx,
    /// Probing status (3 bits)
    pub probing_status: u8,
    /// Last ACMP status (5 bits)
    pub acmp_status: AcmpStatus,
}

/// GET/SET_STREAM_INFO data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamInfo {
    /// Validity and state flags
    pub stream_info_flags: StreamInfoFlags,
    /// Current format
    pub stream_format: StreamFormat,
    /// Stream ID
    pub stream_id: UniqueIdentifier,
    /// Accumulated latency in nanoseconds
    pub msrp_accumulated_latency: u32,
    /// Destination MAC address
    pub stream_dest_mac: MacAddress,
    /// MSRP failure code
    pub msrp_failure_code: u8,
    /// Bridge reporting the MSRP failure
    pub msrp_failure_bridge_id: u64,
    /// Stream VLAN
    pub stream_vlan_id: u16,
    /// Present in responses from Milan devices
    pub milan: Option<MilanStreamInfo>,
}

flag_set! {
    /// AVB interface state reported by GET_AVB_INFO
    AvbInfoFlags(u8) {
        /// 802.1AS asCapable is set
        AS_CAPABLE = 1 << 0,
        /// gPTP enabled
        GPTP_ENABLED = 1 << 1,
        /// SRP enabled
        SRP_ENABLED = 1 << 2,
    }
}

/// GET_AVB_INFO data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AvbInfo {
    /// Current grandmaster
    pub gptp_grandmaster_id: UniqueIdentifier,
    /// Propagation delay in nanoseconds
    pub propagation_delay: u32,
    /// gPTP domain
    pub gptp_domain_number: u8,
    /// Interface state
    pub flags: AvbInfoFlags,
    /// SRP class parameters
    pub mappings: Vec<MsrpMapping>,
}

/// GET_AS_PATH data: the 802.1AS path trace
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsPath {
    /// Clock identities from the grandmaster to this interface
    pub sequence: Vec<UniqueIdentifier>,
}

/// GET_COUNTERS data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorCounters {
    /// One bit per valid counter
    pub valid_flags: u32,
    /// Counter values; the meaning depends on the descriptor type
    pub counters: [u32; Self::COUNT],
}

impl DescriptorCounters {
    /// Counters per descriptor
    pub const COUNT: usize = 32;
}

impl Default for DescriptorCounters {
    fn default() -> Self {
        Self {
            valid_flags: 0,
            counters: [0; Self::COUNT],
        }
    }
}

/// Kinds of memory object operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryObjectOperationType(pub u16);

impl MemoryObjectOperationType {
    /// Store the object to non-volatile storage
    pub const STORE: Self = Self(0);
    /// Store and reboot
    pub const STORE_AND_REBOOT: Self = Self(1);
    /// Read the object
    pub const READ: Self = Self(2);
    /// Erase the object
    pub const ERASE: Self = Self(3);
    /// Upload new content
    pub const UPLOAD: Self = Self(4);
}

flag_set! {
    /// Milan feature flags
    MilanInfoFeaturesFlags(u32) {
        /// Network redundancy
        REDUNDANCY = 1 << 0,
    }
}

/// GET_MILAN_INFO data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MilanInfo {
    /// Milan protocol version
    pub protocol_version: u32,
    /// Supported features
    pub features_flags: MilanInfoFeaturesFlags,
    /// Certification version
    pub certification_version: u32,
}
