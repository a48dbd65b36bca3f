//! Wire constants, code vocabularies and flag sets shared by every PDU.
//!
//! Open-valued wire codes (command types, statuses, descriptor types) are
//! newtypes with associated constants rather than enums: a peer may send any
//! value and the codec must carry it through unchanged.

use std::time::Duration;

use crate::types::MacAddress;

/// Declare an open-valued wire code newtype with named constants.
macro_rules! wire_code {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr => $text:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub $repr);

        impl $name {
            $( $(#[$vmeta])* pub const $variant: Self = Self($value); )*

            /// Raw wire value
            #[must_use]
            pub const fn value(self) -> $repr {
                self.0
            }

            /// Human-readable name, `None` for an unassigned value
            #[must_use]
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $( Self::$variant => Some($text), )*
                    _ => None,
                }
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "Unknown({:#x})", self.0),
                }
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

/// Declare a bit-flag set over an unsigned integer.
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            $( $(#[$vmeta:meta])* $flag:ident = $value:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($repr);

        impl $name {
            /// Empty set
            pub const NONE: Self = Self(0);
            $( $(#[$vmeta])* pub const $flag: Self = Self($value); )*

            /// Wrap raw bits, keeping unknown bits
            #[must_use]
            pub const fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }

            /// Raw bits
            #[must_use]
            pub const fn bits(self) -> $repr {
                self.0
            }

            /// Whether every bit of `other` is set
            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Whether any bit of `other` is set
            #[must_use]
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Whether no bit is set
            #[must_use]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Set the bits of `other`
            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            /// Clear the bits of `other`
            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            /// Set or clear the bits of `other`
            pub fn set(&mut self, other: Self, enabled: bool) {
                if enabled {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }

            /// Copy with the bits of `other` set
            #[must_use]
            pub const fn with(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Copy with the bits of `other` cleared
            #[must_use]
            pub const fn without(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let names: Vec<&str> = [$( (stringify!($flag), Self::$flag) ),*]
                    .iter()
                    .filter(|(_, flag)| flag.0 != 0 && self.contains(*flag))
                    .map(|(name, _)| *name)
                    .collect();
                write!(f, "{}({:#x}", stringify!($name), self.0)?;
                if !names.is_empty() {
                    write!(f, ": {}", names.join(" | "))?;
                }
                f.write_str(")")
            }
        }
    };
}

pub(crate) use flag_set;

// ===== Framing =====

/// IEEE 1722 EtherType
pub const AVTP_ETHER_TYPE: u16 = 0x22F0;

/// AVTP version carried in every control header
pub const AVTP_VERSION: u8 = 0;

/// ADP subtype
pub const AVTP_SUBTYPE_ADP: u8 = 0x7A;

/// AECP subtype
pub const AVTP_SUBTYPE_AECP: u8 = 0x7B;

/// ACMP subtype
pub const AVTP_SUBTYPE_ACMP: u8 = 0x7C;

/// Destination of ADP and ACMP messages
pub const ADP_MULTICAST_MAC: MacAddress = MacAddress([0x91, 0xE0, 0xF0, 0x01, 0x00, 0x00]);

/// Destination of IDENTIFY notifications
pub const IDENTIFY_MULTICAST_MAC: MacAddress = MacAddress([0x91, 0xE0, 0xF0, 0x01, 0x00, 0x01]);

/// Ethernet layer-2 header (dest + src + EtherType)
pub const ETHERNET_HEADER_LENGTH: usize = 14;

/// Largest frame accepted or produced
pub const ETHERNET_MAX_FRAME_LENGTH: usize = 1522;

/// AVTP control header (subtype, flags, status, length, stream ID)
pub const AVTPDU_HEADER_LENGTH: usize = 12;

/// Maximum `control_data_length` field value (11 bits)
pub const AVTPDU_MAX_CONTROL_DATA_LENGTH: usize = 0x7FF;

// ===== ADP =====

/// ADPDU control data length
pub const ADPDU_CONTROL_DATA_LENGTH: usize = 56;

/// Default advertised valid time, in 2-second units (62 seconds)
pub const ADP_DEFAULT_VALID_TIME: u8 = 31;

/// Smallest meaningful valid time (2 seconds)
pub const ADP_MIN_VALID_TIME: u8 = 1;

/// Largest valid time the 5-bit field can carry
pub const ADP_MAX_VALID_TIME: u8 = 31;

// ===== AECP =====

/// Controller entity ID plus sequence ID
pub const AECPDU_COMMON_HEADER_LENGTH: usize = 10;

/// AECPDU maximum control data length (IEEE 1722.1 clause 9.2.1.1.7)
pub const AECP_MAXIMUM_LENGTH_1722_1: usize = 524;

/// AECPDU maximum control data length with big payloads
pub const AECP_MAXIMUM_LENGTH_BIG_PAYLOADS: usize = 1488;

/// Largest AECPDU this build sends
#[cfg(not(feature = "big-payloads"))]
pub const AECP_MAXIMUM_SEND_LENGTH: usize = AECP_MAXIMUM_LENGTH_1722_1;
/// Largest AECPDU this build sends
#[cfg(feature = "big-payloads")]
pub const AECP_MAXIMUM_SEND_LENGTH: usize = AECP_MAXIMUM_LENGTH_BIG_PAYLOADS;

/// Largest AECPDU this build accepts
#[cfg(not(feature = "big-payloads"))]
pub const AECP_MAXIMUM_RECEIVE_LENGTH: usize = AECP_MAXIMUM_LENGTH_1722_1;
/// Largest AECPDU this build accepts
#[cfg(feature = "big-payloads")]
pub const AECP_MAXIMUM_RECEIVE_LENGTH: usize = AECP_MAXIMUM_LENGTH_BIG_PAYLOADS;

/// Unsolicited flag plus command type
pub const AEM_HEADER_LENGTH: usize = 2;

/// Largest AEM command-specific payload this build sends
pub const AEM_MAXIMUM_SEND_PAYLOAD_LENGTH: usize =
    AECP_MAXIMUM_SEND_LENGTH - AECPDU_COMMON_HEADER_LENGTH - AEM_HEADER_LENGTH;

/// Largest AEM command-specific payload this build accepts
pub const AEM_MAXIMUM_RECEIVE_PAYLOAD_LENGTH: usize =
    AECP_MAXIMUM_RECEIVE_LENGTH - AECPDU_COMMON_HEADER_LENGTH - AEM_HEADER_LENGTH;

/// TLV count field
pub const AA_HEADER_LENGTH: usize = 2;

/// Mode/length word plus address
pub const AA_TLV_HEADER_LENGTH: usize = 10;

/// Largest total TLV area of an AA PDU
pub const AA_MAXIMUM_TLV_DATA_LENGTH: usize =
    AECP_MAXIMUM_SEND_LENGTH - AECPDU_COMMON_HEADER_LENGTH - AA_HEADER_LENGTH;

/// Vendor-unique protocol identifier
pub const VU_PROTOCOL_ID_LENGTH: usize = 6;

/// Milan vendor-unique protocol identifier
pub const MVU_PROTOCOL_ID: u64 = 0x001B_C50A_C100;

/// MVU reserved/unsolicited bit plus command type
pub const MVU_HEADER_LENGTH: usize = 2;

/// Largest MVU command-specific payload this build sends
pub const MVU_MAXIMUM_SEND_PAYLOAD_LENGTH: usize = AECP_MAXIMUM_SEND_LENGTH
    - AECPDU_COMMON_HEADER_LENGTH
    - VU_PROTOCOL_ID_LENGTH
    - MVU_HEADER_LENGTH;

/// Largest MVU command-specific payload this build accepts
pub const MVU_MAXIMUM_RECEIVE_PAYLOAD_LENGTH: usize = AECP_MAXIMUM_RECEIVE_LENGTH
    - AECPDU_COMMON_HEADER_LENGTH
    - VU_PROTOCOL_ID_LENGTH
    - MVU_HEADER_LENGTH;

/// AEM command timeout
pub const AEM_COMMAND_TIMEOUT: Duration = Duration::from_millis(250);

/// Address Access command timeout
pub const AA_COMMAND_TIMEOUT: Duration = Duration::from_millis(250);

/// Milan vendor-unique command timeout
pub const MVU_COMMAND_TIMEOUT: Duration = Duration::from_millis(250);

/// Retransmissions of an unanswered AECP command
pub const AECP_COMMAND_RETRIES: u8 = 1;

// ===== ACMP =====

/// ACMPDU control data length
pub const ACMPDU_CONTROL_DATA_LENGTH: usize = 44;

// ===== Message types =====

wire_code! {
    /// ADP message type (4-bit `control_data` field)
    AdpMessageType(u8) {
        /// ENTITY_AVAILABLE
        ENTITY_AVAILABLE = 0 => "ENTITY_AVAILABLE",
        /// ENTITY_DEPARTING
        ENTITY_DEPARTING = 1 => "ENTITY_DEPARTING",
        /// ENTITY_DISCOVER
        ENTITY_DISCOVER = 2 => "ENTITY_DISCOVER",
    }
}

wire_code! {
    /// AECP message type (4-bit `control_data` field)
    AecpMessageType(u8) {
        /// AEM_COMMAND
        AEM_COMMAND = 0 => "AEM_COMMAND",
        /// AEM_RESPONSE
        AEM_RESPONSE = 1 => "AEM_RESPONSE",
        /// ADDRESS_ACCESS_COMMAND
        ADDRESS_ACCESS_COMMAND = 2 => "ADDRESS_ACCESS_COMMAND",
        /// ADDRESS_ACCESS_RESPONSE
        ADDRESS_ACCESS_RESPONSE = 3 => "ADDRESS_ACCESS_RESPONSE",
        /// AVC_COMMAND
        AVC_COMMAND = 4 => "AVC_COMMAND",
        /// AVC_RESPONSE
        AVC_RESPONSE = 5 => "AVC_RESPONSE",
        /// VENDOR_UNIQUE_COMMAND
        VENDOR_UNIQUE_COMMAND = 6 => "VENDOR_UNIQUE_COMMAND",
        /// VENDOR_UNIQUE_RESPONSE
        VENDOR_UNIQUE_RESPONSE = 7 => "VENDOR_UNIQUE_RESPONSE",
        /// HDCP_APM_COMMAND
        HDCP_APM_COMMAND = 8 => "HDCP_APM_COMMAND",
        /// HDCP_APM_RESPONSE
        HDCP_APM_RESPONSE = 9 => "HDCP_APM_RESPONSE",
        /// EXTENDED_COMMAND
        EXTENDED_COMMAND = 14 => "EXTENDED_COMMAND",
        /// EXTENDED_RESPONSE
        EXTENDED_RESPONSE = 15 => "EXTENDED_RESPONSE",
    }
}

impl AecpMessageType {
    /// Whether this is one of the command message types
    ///
    /// Commands have even values and the matching response is value + 1.
    #[must_use]
    pub const fn is_command(self) -> bool {
        self.0 & 1 == 0
    }

    /// Response type matching this command type
    #[must_use]
    pub const fn response_type(self) -> Self {
        Self(self.0 | 1)
    }
}

wire_code! {
    /// ACMP message type (4-bit `control_data` field)
    AcmpMessageType(u8) {
        /// CONNECT_TX_COMMAND
        CONNECT_TX_COMMAND = 0 => "CONNECT_TX_COMMAND",
        /// CONNECT_TX_RESPONSE
        CONNECT_TX_RESPONSE = 1 => "CONNECT_TX_RESPONSE",
        /// DISCONNECT_TX_COMMAND
        DISCONNECT_TX_COMMAND = 2 => "DISCONNECT_TX_COMMAND",
        /// DISCONNECT_TX_RESPONSE
        DISCONNECT_TX_RESPONSE = 3 => "DISCONNECT_TX_RESPONSE",
        /// GET_TX_STATE_COMMAND
        GET_TX_STATE_COMMAND = 4 => "GET_TX_STATE_COMMAND",
        /// GET_TX_STATE_RESPONSE
        GET_TX_STATE_RESPONSE = 5 => "GET_TX_STATE_RESPONSE",
        /// CONNECT_RX_COMMAND
        CONNECT_RX_COMMAND = 6 => "CONNECT_RX_COMMAND",
        /// CONNECT_RX_RESPONSE
        CONNECT_RX_RESPONSE = 7 => "CONNECT_RX_RESPONSE",
        /// DISCONNECT_RX_COMMAND
        DISCONNECT_RX_COMMAND = 8 => "DISCONNECT_RX_COMMAND",
        /// DISCONNECT_RX_RESPONSE
        DISCONNECT_RX_RESPONSE = 9 => "DISCONNECT_RX_RESPONSE",
        /// GET_RX_STATE_COMMAND
        GET_RX_STATE_COMMAND = 10 => "GET_RX_STATE_COMMAND",
        /// GET_RX_STATE_RESPONSE
        GET_RX_STATE_RESPONSE = 11 => "GET_RX_STATE_RESPONSE",
        /// GET_TX_CONNECTION_COMMAND
        GET_TX_CONNECTION_COMMAND = 12 => "GET_TX_CONNECTION_COMMAND",
        /// GET_TX_CONNECTION_RESPONSE
        GET_TX_CONNECTION_RESPONSE = 13 => "GET_TX_CONNECTION_RESPONSE",
    }
}

impl AcmpMessageType {
    /// Whether this is one of the command message types
    #[must_use]
    pub const fn is_command(self) -> bool {
        self.0 & 1 == 0
    }

    /// Response type matching this command type
    #[must_use]
    pub const fn response_type(self) -> Self {
        Self(self.0 | 1)
    }

    /// How long a controller waits for the response to this command
    #[must_use]
    pub fn timeout(self) -> Duration {
        let ms = match self {
            Self::CONNECT_TX_COMMAND => 2000,
            Self::CONNECT_RX_COMMAND => 4500,
            Self::DISCONNECT_RX_COMMAND => 500,
            _ => 200,
        };
        Duration::from_millis(ms)
    }
}

// ===== Status vocabularies =====

wire_code! {
    /// AEM status (5-bit AVTP `status` field)
    AemAecpStatus(u8) {
        /// SUCCESS
        SUCCESS = 0 => "SUCCESS",
        /// NOT_IMPLEMENTED
        NOT_IMPLEMENTED = 1 => "NOT_IMPLEMENTED",
        /// NO_SUCH_DESCRIPTOR
        NO_SUCH_DESCRIPTOR = 2 => "NO_SUCH_DESCRIPTOR",
        /// ENTITY_LOCKED
        ENTITY_LOCKED = 3 => "ENTITY_LOCKED",
        /// ENTITY_ACQUIRED
        ENTITY_ACQUIRED = 4 => "ENTITY_ACQUIRED",
        /// NOT_AUTHENTICATED
        NOT_AUTHENTICATED = 5 => "NOT_AUTHENTICATED",
        /// AUTHENTICATION_DISABLED
        AUTHENTICATION_DISABLED = 6 => "AUTHENTICATION_DISABLED",
        /// BAD_ARGUMENTS
        BAD_ARGUMENTS = 7 => "BAD_ARGUMENTS",
        /// NO_RESOURCES
        NO_RESOURCES = 8 => "NO_RESOURCES",
        /// IN_PROGRESS
        IN_PROGRESS = 9 => "IN_PROGRESS",
        /// ENTITY_MISBEHAVING
        ENTITY_MISBEHAVING = 10 => "ENTITY_MISBEHAVING",
        /// NOT_SUPPORTED
        NOT_SUPPORTED = 11 => "NOT_SUPPORTED",
        /// STREAM_IS_RUNNING
        STREAM_IS_RUNNING = 12 => "STREAM_IS_RUNNING",
    }
}

wire_code! {
    /// Address Access status
    AaAecpStatus(u8) {
        /// SUCCESS
        SUCCESS = 0 => "SUCCESS",
        /// NOT_IMPLEMENTED
        NOT_IMPLEMENTED = 1 => "NOT_IMPLEMENTED",
        /// ADDRESS_TOO_LOW
        ADDRESS_TOO_LOW = 2 => "ADDRESS_TOO_LOW",
        /// ADDRESS_TOO_HIGH
        ADDRESS_TOO_HIGH = 3 => "ADDRESS_TOO_HIGH",
        /// ADDRESS_INVALID
        ADDRESS_INVALID = 4 => "ADDRESS_INVALID",
        /// TLV_INVALID
        TLV_INVALID = 5 => "TLV_INVALID",
        /// DATA_INVALID
        DATA_INVALID = 6 => "DATA_INVALID",
        /// UNSUPPORTED
        UNSUPPORTED = 7 => "UNSUPPORTED",
    }
}

wire_code! {
    /// Milan vendor-unique status
    MvuAecpStatus(u8) {
        /// SUCCESS
        SUCCESS = 0 => "SUCCESS",
        /// NOT_IMPLEMENTED
        NOT_IMPLEMENTED = 1 => "NOT_IMPLEMENTED",
        /// BAD_ARGUMENTS
        BAD_ARGUMENTS = 2 => "BAD_ARGUMENTS",
        /// ENTITY_MISBEHAVING, shared with the AEM status space
        ENTITY_MISBEHAVING = 10 => "ENTITY_MISBEHAVING",
    }
}

wire_code! {
    /// ACMP status
    AcmpStatus(u8) {
        /// SUCCESS
        SUCCESS = 0 => "SUCCESS",
        /// LISTENER_UNKNOWN_ID
        LISTENER_UNKNOWN_ID = 1 => "LISTENER_UNKNOWN_ID",
        /// TALKER_UNKNOWN_ID
        TALKER_UNKNOWN_ID = 2 => "TALKER_UNKNOWN_ID",
        /// TALKER_DEST_MAC_FAIL
        TALKER_DEST_MAC_FAIL = 3 => "TALKER_DEST_MAC_FAIL",
        /// TALKER_NO_STREAM_INDEX
        TALKER_NO_STREAM_INDEX = 4 => "TALKER_NO_STREAM_INDEX",
        /// TALKER_NO_BANDWIDTH
        TALKER_NO_BANDWIDTH = 5 => "TALKER_NO_BANDWIDTH",
        /// TALKER_EXCLUSIVE
        TALKER_EXCLUSIVE = 6 => "TALKER_EXCLUSIVE",
        /// LISTENER_TALKER_TIMEOUT
        LISTENER_TALKER_TIMEOUT = 7 => "LISTENER_TALKER_TIMEOUT",
        /// LISTENER_EXCLUSIVE
        LISTENER_EXCLUSIVE = 8 => "LISTENER_EXCLUSIVE",
        /// STATE_UNAVAILABLE
        STATE_UNAVAILABLE = 9 => "STATE_UNAVAILABLE",
        /// NOT_CONNECTED
        NOT_CONNECTED = 10 => "NOT_CONNECTED",
        /// NO_SUCH_CONNECTION
        NO_SUCH_CONNECTION = 11 => "NO_SUCH_CONNECTION",
        /// COULD_NOT_SEND_MESSAGE
        COULD_NOT_SEND_MESSAGE = 12 => "COULD_NOT_SEND_MESSAGE",
        /// TALKER_MISBEHAVING
        TALKER_MISBEHAVING = 13 => "TALKER_MISBEHAVING",
        /// LISTENER_MISBEHAVING
        LISTENER_MISBEHAVING = 14 => "LISTENER_MISBEHAVING",
        /// CONTROLLER_NOT_AUTHORIZED
        CONTROLLER_NOT_AUTHORIZED = 16 => "CONTROLLER_NOT_AUTHORIZED",
        /// INCOMPATIBLE_REQUEST
        INCOMPATIBLE_REQUEST = 17 => "INCOMPATIBLE_REQUEST",
        /// NOT_SUPPORTED
        NOT_SUPPORTED = 31 => "NOT_SUPPORTED",
    }
}

// ===== Command types =====

wire_code! {
    /// AEM command type (15 bits)
    AemCommandType(u16) {
        /// ACQUIRE_ENTITY
        ACQUIRE_ENTITY = 0x0000 => "ACQUIRE_ENTITY",
        /// LOCK_ENTITY
        LOCK_ENTITY = 0x0001 => "LOCK_ENTITY",
        /// ENTITY_AVAILABLE
        ENTITY_AVAILABLE = 0x0002 => "ENTITY_AVAILABLE",
        /// CONTROLLER_AVAILABLE
        CONTROLLER_AVAILABLE = 0x0003 => "CONTROLLER_AVAILABLE",
        /// READ_DESCRIPTOR
        READ_DESCRIPTOR = 0x0004 => "READ_DESCRIPTOR",
        /// WRITE_DESCRIPTOR
        WRITE_DESCRIPTOR = 0x0005 => "WRITE_DESCRIPTOR",
        /// SET_CONFIGURATION
        SET_CONFIGURATION = 0x0006 => "SET_CONFIGURATION",
        /// GET_CONFIGURATION
        GET_CONFIGURATION = 0x0007 => "GET_CONFIGURATION",
        /// SET_STREAM_FORMAT
        SET_STREAM_FORMAT = 0x0008 => "SET_STREAM_FORMAT",
        /// GET_STREAM_FORMAT
        GET_STREAM_FORMAT = 0x0009 => "GET_STREAM_FORMAT",
        /// SET_VIDEO_FORMAT
        SET_VIDEO_FORMAT = 0x000a => "SET_VIDEO_FORMAT",
        /// GET_VIDEO_FORMAT
        GET_VIDEO_FORMAT = 0x000b => "GET_VIDEO_FORMAT",
        /// SET_SENSOR_FORMAT
        SET_SENSOR_FORMAT = 0x000c => "SET_SENSOR_FORMAT",
        /// GET_SENSOR_FORMAT
        GET_SENSOR_FORMAT = 0x000d => "GET_SENSOR_FORMAT",
        /// SET_STREAM_INFO
        SET_STREAM_INFO = 0x000e => "SET_STREAM_INFO",
        /// GET_STREAM_INFO
        GET_STREAM_INFO = 0x000f => "GET_STREAM_INFO",
        /// SET_NAME
        SET_NAME = 0x0010 => "SET_NAME",
        /// GET_NAME
        GET_NAME = 0x0011 => "GET_NAME",
        /// SET_ASSOCIATION_ID
        SET_ASSOCIATION_ID = 0x0012 => "SET_ASSOCIATION_ID",
        /// GET_ASSOCIATION_ID
        GET_ASSOCIATION_ID = 0x0013 => "GET_ASSOCIATION_ID",
        /// SET_SAMPLING_RATE
        SET_SAMPLING_RATE = 0x0014 => "SET_SAMPLING_RATE",
        /// GET_SAMPLING_RATE
        GET_SAMPLING_RATE = 0x0015 => "GET_SAMPLING_RATE",
        /// SET_CLOCK_SOURCE
        SET_CLOCK_SOURCE = 0x0016 => "SET_CLOCK_SOURCE",
        /// GET_CLOCK_SOURCE
        GET_CLOCK_SOURCE = 0x0017 => "GET_CLOCK_SOURCE",
        /// SET_CONTROL
        SET_CONTROL = 0x0018 => "SET_CONTROL",
        /// GET_CONTROL
        GET_CONTROL = 0x0019 => "GET_CONTROL",
        /// INCREMENT_CONTROL
        INCREMENT_CONTROL = 0x001a => "INCREMENT_CONTROL",
        /// DECREMENT_CONTROL
        DECREMENT_CONTROL = 0x001b => "DECREMENT_CONTROL",
        /// SET_SIGNAL_SELECTOR
        SET_SIGNAL_SELECTOR = 0x001c => "SET_SIGNAL_SELECTOR",
        /// GET_SIGNAL_SELECTOR
        GET_SIGNAL_SELECTOR = 0x001d => "GET_SIGNAL_SELECTOR",
        /// SET_MIXER
        SET_MIXER = 0x001e => "SET_MIXER",
        /// GET_MIXER
        GET_MIXER = 0x001f => "GET_MIXER",
        /// SET_MATRIX
        SET_MATRIX = 0x0020 => "SET_MATRIX",
        /// GET_MATRIX
        GET_MATRIX = 0x0021 => "GET_MATRIX",
        /// START_STREAMING
        START_STREAMING = 0x0022 => "START_STREAMING",
        /// STOP_STREAMING
        STOP_STREAMING = 0x0023 => "STOP_STREAMING",
        /// REGISTER_UNSOLICITED_NOTIFICATION
        REGISTER_UNSOLICITED_NOTIFICATION = 0x0024 => "REGISTER_UNSOLICITED_NOTIFICATION",
        /// DEREGISTER_UNSOLICITED_NOTIFICATION
        DEREGISTER_UNSOLICITED_NOTIFICATION = 0x0025 => "DEREGISTER_UNSOLICITED_NOTIFICATION",
        /// IDENTIFY_NOTIFICATION
        IDENTIFY_NOTIFICATION = 0x0026 => "IDENTIFY_NOTIFICATION",
        /// GET_AVB_INFO
        GET_AVB_INFO = 0x0027 => "GET_AVB_INFO",
        /// GET_AS_PATH
        GET_AS_PATH = 0x0028 => "GET_AS_PATH",
        /// GET_COUNTERS
        GET_COUNTERS = 0x0029 => "GET_COUNTERS",
        /// REBOOT
        REBOOT = 0x002a => "REBOOT",
        /// GET_AUDIO_MAP
        GET_AUDIO_MAP = 0x002b => "GET_AUDIO_MAP",
        /// ADD_AUDIO_MAPPINGS
        ADD_AUDIO_MAPPINGS = 0x002c => "ADD_AUDIO_MAPPINGS",
        /// REMOVE_AUDIO_MAPPINGS
        REMOVE_AUDIO_MAPPINGS = 0x002d => "REMOVE_AUDIO_MAPPINGS",
        /// GET_VIDEO_MAP
        GET_VIDEO_MAP = 0x002e => "GET_VIDEO_MAP",
        /// ADD_VIDEO_MAPPINGS
        ADD_VIDEO_MAPPINGS = 0x002f => "ADD_VIDEO_MAPPINGS",
        /// REMOVE_VIDEO_MAPPINGS
        REMOVE_VIDEO_MAPPINGS = 0x0030 => "REMOVE_VIDEO_MAPPINGS",
        /// GET_SENSOR_MAP
        GET_SENSOR_MAP = 0x0031 => "GET_SENSOR_MAP",
        /// ADD_SENSOR_MAPPINGS
        ADD_SENSOR_MAPPINGS = 0x0032 => "ADD_SENSOR_MAPPINGS",
        /// REMOVE_SENSOR_MAPPINGS
        REMOVE_SENSOR_MAPPINGS = 0x0033 => "REMOVE_SENSOR_MAPPINGS",
        /// START_OPERATION
        START_OPERATION = 0x0034 => "START_OPERATION",
        /// ABORT_OPERATION
        ABORT_OPERATION = 0x0035 => "ABORT_OPERATION",
        /// OPERATION_STATUS
        OPERATION_STATUS = 0x0036 => "OPERATION_STATUS",
        /// AUTH_ADD_KEY
        AUTH_ADD_KEY = 0x0037 => "AUTH_ADD_KEY",
        /// AUTH_DELETE_KEY
        AUTH_DELETE_KEY = 0x0038 => "AUTH_DELETE_KEY",
        /// AUTH_GET_KEY_LIST
        AUTH_GET_KEY_LIST = 0x0039 => "AUTH_GET_KEY_LIST",
        /// AUTH_GET_KEY
        AUTH_GET_KEY = 0x003a => "AUTH_GET_KEY",
        /// AUTH_ADD_KEY_TO_CHAIN
        AUTH_ADD_KEY_TO_CHAIN = 0x003b => "AUTH_ADD_KEY_TO_CHAIN",
        /// AUTH_DELETE_KEY_FROM_CHAIN
        AUTH_DELETE_KEY_FROM_CHAIN = 0x003c => "AUTH_DELETE_KEY_FROM_CHAIN",
        /// AUTH_GET_KEYCHAIN_LIST
        AUTH_GET_KEYCHAIN_LIST = 0x003d => "AUTH_GET_KEYCHAIN_LIST",
        /// AUTH_GET_IDENTITY
        AUTH_GET_IDENTITY = 0x003e => "AUTH_GET_IDENTITY",
        /// AUTH_ADD_TOKEN
        AUTH_ADD_TOKEN = 0x003f => "AUTH_ADD_TOKEN",
        /// AUTH_DELETE_TOKEN
        AUTH_DELETE_TOKEN = 0x0040 => "AUTH_DELETE_TOKEN",
        /// AUTHENTICATE
        AUTHENTICATE = 0x0041 => "AUTHENTICATE",
        /// DEAUTHENTICATE
        DEAUTHENTICATE = 0x0042 => "DEAUTHENTICATE",
        /// ENABLE_TRANSPORT_SECURITY
        ENABLE_TRANSPORT_SECURITY = 0x0043 => "ENABLE_TRANSPORT_SECURITY",
        /// DISABLE_TRANSPORT_SECURITY
        DISABLE_TRANSPORT_SECURITY = 0x0044 => "DISABLE_TRANSPORT_SECURITY",
        /// ENABLE_STREAM_ENCRYPTION
        ENABLE_STREAM_ENCRYPTION = 0x0045 => "ENABLE_STREAM_ENCRYPTION",
        /// DISABLE_STREAM_ENCRYPTION
        DISABLE_STREAM_ENCRYPTION = 0x0046 => "DISABLE_STREAM_ENCRYPTION",
        /// SET_MEMORY_OBJECT_LENGTH
        SET_MEMORY_OBJECT_LENGTH = 0x0047 => "SET_MEMORY_OBJECT_LENGTH",
        /// GET_MEMORY_OBJECT_LENGTH
        GET_MEMORY_OBJECT_LENGTH = 0x0048 => "GET_MEMORY_OBJECT_LENGTH",
        /// SET_STREAM_BACKUP
        SET_STREAM_BACKUP = 0x0049 => "SET_STREAM_BACKUP",
        /// GET_STREAM_BACKUP
        GET_STREAM_BACKUP = 0x004a => "GET_STREAM_BACKUP",
        /// EXPANSION
        EXPANSION = 0x7fff => "EXPANSION",
        /// Not a valid command type
        INVALID = 0xffff => "INVALID_COMMAND_TYPE",
    }
}

wire_code! {
    /// Milan vendor-unique command type (15 bits)
    MvuCommandType(u16) {
        /// GET_MILAN_INFO
        GET_MILAN_INFO = 0x0000 => "GET_MILAN_INFO",
        /// SET_SYSTEM_UNIQUE_ID
        SET_SYSTEM_UNIQUE_ID = 0x0001 => "SET_SYSTEM_UNIQUE_ID",
        /// GET_SYSTEM_UNIQUE_ID
        GET_SYSTEM_UNIQUE_ID = 0x0002 => "GET_SYSTEM_UNIQUE_ID",
        /// SET_MEDIA_CLOCK_REFERENCE_INFO
        SET_MEDIA_CLOCK_REFERENCE_INFO = 0x0003 => "SET_MEDIA_CLOCK_REFERENCE_INFO",
        /// GET_MEDIA_CLOCK_REFERENCE_INFO
        GET_MEDIA_CLOCK_REFERENCE_INFO = 0x0004 => "GET_MEDIA_CLOCK_REFERENCE_INFO",
        /// Not a valid command type
        INVALID = 0xffff => "INVALID_COMMAND_TYPE",
    }
}

wire_code! {
    /// Address Access TLV mode (4 bits)
    AaMode(u8) {
        /// READ
        READ = 0 => "READ",
        /// WRITE
        WRITE = 1 => "WRITE",
        /// EXECUTE
        EXECUTE = 2 => "EXECUTE",
    }
}

wire_code! {
    /// Entity model descriptor type
    DescriptorType(u16) {
        /// ENTITY
        ENTITY = 0x0000 => "ENTITY",
        /// CONFIGURATION
        CONFIGURATION = 0x0001 => "CONFIGURATION",
        /// AUDIO_UNIT
        AUDIO_UNIT = 0x0002 => "AUDIO_UNIT",
        /// VIDEO_UNIT
        VIDEO_UNIT = 0x0003 => "VIDEO_UNIT",
        /// SENSOR_UNIT
        SENSOR_UNIT = 0x0004 => "SENSOR_UNIT",
        /// STREAM_INPUT
        STREAM_INPUT = 0x0005 => "STREAM_INPUT",
        /// STREAM_OUTPUT
        STREAM_OUTPUT = 0x0006 => "STREAM_OUTPUT",
        /// JACK_INPUT
        JACK_INPUT = 0x0007 => "JACK_INPUT",
        /// JACK_OUTPUT
        JACK_OUTPUT = 0x0008 => "JACK_OUTPUT",
        /// AVB_INTERFACE
        AVB_INTERFACE = 0x0009 => "AVB_INTERFACE",
        /// CLOCK_SOURCE
        CLOCK_SOURCE = 0x000a => "CLOCK_SOURCE",
        /// MEMORY_OBJECT
        MEMORY_OBJECT = 0x000b => "MEMORY_OBJECT",
        /// LOCALE
        LOCALE = 0x000c => "LOCALE",
        /// STRINGS
        STRINGS = 0x000d => "STRINGS",
        /// STREAM_PORT_INPUT
        STREAM_PORT_INPUT = 0x000e => "STREAM_PORT_INPUT",
        /// STREAM_PORT_OUTPUT
        STREAM_PORT_OUTPUT = 0x000f => "STREAM_PORT_OUTPUT",
        /// EXTERNAL_PORT_INPUT
        EXTERNAL_PORT_INPUT = 0x0010 => "EXTERNAL_PORT_INPUT",
        /// EXTERNAL_PORT_OUTPUT
        EXTERNAL_PORT_OUTPUT = 0x0011 => "EXTERNAL_PORT_OUTPUT",
        /// INTERNAL_PORT_INPUT
        INTERNAL_PORT_INPUT = 0x0012 => "INTERNAL_PORT_INPUT",
        /// INTERNAL_PORT_OUTPUT
        INTERNAL_PORT_OUTPUT = 0x0013 => "INTERNAL_PORT_OUTPUT",
        /// AUDIO_CLUSTER
        AUDIO_CLUSTER = 0x0014 => "AUDIO_CLUSTER",
        /// VIDEO_CLUSTER
        VIDEO_CLUSTER = 0x0015 => "VIDEO_CLUSTER",
        /// SENSOR_CLUSTER
        SENSOR_CLUSTER = 0x0016 => "SENSOR_CLUSTER",
        /// AUDIO_MAP
        AUDIO_MAP = 0x0017 => "AUDIO_MAP",
        /// VIDEO_MAP
        VIDEO_MAP = 0x0018 => "VIDEO_MAP",
        /// SENSOR_MAP
        SENSOR_MAP = 0x0019 => "SENSOR_MAP",
        /// CONTROL
        CONTROL = 0x001a => "CONTROL",
        /// SIGNAL_SELECTOR
        SIGNAL_SELECTOR = 0x001b => "SIGNAL_SELECTOR",
        /// MIXER
        MIXER = 0x001c => "MIXER",
        /// MATRIX
        MATRIX = 0x001d => "MATRIX",
        /// MATRIX_SIGNAL
        MATRIX_SIGNAL = 0x001e => "MATRIX_SIGNAL",
        /// SIGNAL_SPLITTER
        SIGNAL_SPLITTER = 0x001f => "SIGNAL_SPLITTER",
        /// SIGNAL_COMBINER
        SIGNAL_COMBINER = 0x0020 => "SIGNAL_COMBINER",
        /// SIGNAL_DEMULTIPLEXER
        SIGNAL_DEMULTIPLEXER = 0x0021 => "SIGNAL_DEMULTIPLEXER",
        /// SIGNAL_MULTIPLEXER
        SIGNAL_MULTIPLEXER = 0x0022 => "SIGNAL_MULTIPLEXER",
        /// SIGNAL_TRANSCODER
        SIGNAL_TRANSCODER = 0x0023 => "SIGNAL_TRANSCODER",
        /// CLOCK_DOMAIN
        CLOCK_DOMAIN = 0x0024 => "CLOCK_DOMAIN",
        /// CONTROL_BLOCK
        CONTROL_BLOCK = 0x0025 => "CONTROL_BLOCK",
        /// Not a valid descriptor type
        INVALID = 0xffff => "INVALID",
    }
}

// ===== Flag sets =====

flag_set! {
    /// ACMP connection flags
    ConnectionFlags(u16) {
        /// Stream is Class B
        CLASS_B = 0x0001,
        /// Fast connect mode
        FAST_CONNECT = 0x0002,
        /// Connection has saved state
        SAVED_STATE = 0x0004,
        /// Connected in STREAMING_WAIT
        STREAMING_WAIT = 0x0008,
        /// Stream supports encrypted PDUs
        SUPPORTS_ENCRYPTED = 0x0010,
        /// Stream uses encrypted PDUs
        ENCRYPTED_PDU = 0x0020,
        /// Listener registered a talker-failed attribute
        TALKER_FAILED = 0x0040,
    }
}

flag_set! {
    /// ACQUIRE_ENTITY flags
    AcquireFlags(u32) {
        /// Acquire survives controller departure
        PERSISTENT = 0x0000_0001,
        /// Release instead of acquire
        RELEASE = 0x8000_0000,
    }
}

flag_set! {
    /// LOCK_ENTITY flags
    LockFlags(u32) {
        /// Unlock instead of lock
        UNLOCK = 0x8000_0000,
    }
}

flag_set! {
    /// ADP entity capabilities
    EntityCapabilities(u32) {
        /// Firmware upgrade mode
        EFU_MODE = 0x0000_0001,
        /// Supports Address Access commands
        ADDRESS_ACCESS_SUPPORTED = 0x0000_0002,
        /// Gateway to another protocol
        GATEWAY_ENTITY = 0x0000_0004,
        /// Supports AEM commands
        AEM_SUPPORTED = 0x0000_0008,
        /// Supports legacy AV/C
        LEGACY_AVC = 0x0000_0010,
        /// Supports the association ID field
        ASSOCIATION_ID_SUPPORTED = 0x0000_0020,
        /// Association ID field is valid
        ASSOCIATION_ID_VALID = 0x0000_0040,
        /// Supports vendor-unique commands
        VENDOR_UNIQUE_SUPPORTED = 0x0000_0080,
        /// Supports Class A streams
        CLASS_A_SUPPORTED = 0x0000_0100,
        /// Supports Class B streams
        CLASS_B_SUPPORTED = 0x0000_0200,
        /// gPTP fields are valid
        GPTP_SUPPORTED = 0x0000_0400,
        /// Supports AEM authentication
        AEM_AUTHENTICATION_SUPPORTED = 0x0000_0800,
        /// Requires AEM authentication
        AEM_AUTHENTICATION_REQUIRED = 0x0000_1000,
        /// Supports persistent acquire
        AEM_PERSISTENT_ACQUIRE_SUPPORTED = 0x0000_2000,
        /// Identify control index field is valid
        AEM_IDENTIFY_CONTROL_INDEX_VALID = 0x0000_4000,
        /// Interface index field is valid
        AEM_INTERFACE_INDEX_VALID = 0x0000_8000,
        /// General controllers should ignore this entity
        GENERAL_CONTROLLER_IGNORE = 0x0001_0000,
        /// Entity is not ready to be enumerated
        ENTITY_NOT_READY = 0x0002_0000,
    }
}

flag_set! {
    /// ADP talker capabilities
    TalkerCapabilities(u16) {
        /// Talker is implemented
        IMPLEMENTED = 0x0001,
        /// Other sources
        OTHER_SOURCE = 0x0200,
        /// Control sources
        CONTROL_SOURCE = 0x0400,
        /// Media clock sources
        MEDIA_CLOCK_SOURCE = 0x0800,
        /// SMPTE sources
        SMPTE_SOURCE = 0x1000,
        /// MIDI sources
        MIDI_SOURCE = 0x2000,
        /// Audio sources
        AUDIO_SOURCE = 0x4000,
        /// Video sources
        VIDEO_SOURCE = 0x8000,
    }
}

flag_set! {
    /// ADP listener capabilities
    ListenerCapabilities(u16) {
        /// Listener is implemented
        IMPLEMENTED = 0x0001,
        /// Other sinks
        OTHER_SINK = 0x0200,
        /// Control sinks
        CONTROL_SINK = 0x0400,
        /// Media clock sinks
        MEDIA_CLOCK_SINK = 0x0800,
        /// SMPTE sinks
        SMPTE_SINK = 0x1000,
        /// MIDI sinks
        MIDI_SINK = 0x2000,
        /// Audio sinks
        AUDIO_SINK = 0x4000,
        /// Video sinks
        VIDEO_SINK = 0x8000,
    }
}

flag_set! {
    /// ADP controller capabilities
    ControllerCapabilities(u32) {
        /// Controller is implemented
        IMPLEMENTED = 0x0000_0001,
    }
}
