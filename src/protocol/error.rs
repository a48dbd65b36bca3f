use thiserror::Error;

use super::serialization::SerializationError;

/// PDU encode/decode errors
///
/// Inbound frames that fail with one of these are dropped by the executor;
/// they never abort processing of other frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PduError {
    /// Underlying codec error
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A command payload is shorter than its schema requires
    #[error("incorrect payload size: expected at least {expected} bytes, got {actual}")]
    IncorrectPayloadSize {
        /// Minimum size of the payload
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Frame is not an AVTP frame
    #[error("invalid EtherType: 0x{0:04x}")]
    InvalidEtherType(u16),

    /// AVTP stream data frame (cd bit clear)
    #[error("not an AVTP control frame")]
    NotControlFrame,

    /// AVTP subtype outside ADP/AECP/ACMP
    #[error("unknown AVTP subtype: 0x{0:02x}")]
    UnknownSubtype(u8),

    /// Message type not defined for the subtype
    #[error("unknown message type {message_type} for subtype 0x{subtype:02x}")]
    UnknownMessageType {
        /// AVTP subtype
        subtype: u8,
        /// Message type as read from the wire
        message_type: u8,
    },

    /// Declared control data length below the protocol minimum
    #[error("control data length {declared} below minimum {minimum}")]
    ControlDataLengthTooSmall {
        /// Length in the header
        declared: usize,
        /// Required minimum
        minimum: usize,
    },

    /// Declared control data length exceeds the received bytes
    #[error("control data length {declared} exceeds the {available} bytes received")]
    ControlDataLengthTooLarge {
        /// Length in the header
        declared: usize,
        /// Bytes actually present
        available: usize,
    },

    /// Payload exceeds what this build sends or accepts
    #[error("payload of {length} bytes exceeds maximum {maximum}")]
    PayloadTooLarge {
        /// Payload size
        length: usize,
        /// Allowed maximum
        maximum: usize,
    },

    /// Vendor-unique protocol identifier with no registered delegate
    #[error("unknown vendor-unique protocol 0x{0:012x}")]
    UnknownVendorProtocol(u64),

    /// More TLVs than the count field can carry
    #[error("too many TLVs")]
    TooManyTlvs,

    /// TLV does not fit in the remaining AA payload
    #[error("TLV of {length} bytes does not fit, {available} bytes left")]
    TlvTooLarge {
        /// TLV size, header included
        length: usize,
        /// Remaining TLV area
        available: usize,
    },

    /// TLV data length is zero or exceeds 12 bits
    #[error("invalid TLV length {0}")]
    InvalidTlvLength(usize),

    /// A descriptor offset field points inside the fixed part
    #[error("invalid descriptor offset {offset}, minimum {minimum}")]
    InvalidDescriptorOffset {
        /// Offset read from the wire
        offset: usize,
        /// End of the fixed part
        minimum: usize,
    },
}

impl PduError {
    /// Whether the error is about the declared length of an inbound frame
    #[must_use]
    pub fn is_length_error(&self) -> bool {
        matches!(
            self,
            Self::ControlDataLengthTooSmall { .. }
                | Self::ControlDataLengthTooLarge { .. }
                | Self::PayloadTooLarge { .. }
                | Self::IncorrectPayloadSize { .. }
        )
    }
}
