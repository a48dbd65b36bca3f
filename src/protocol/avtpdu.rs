//! Ethernet layer-2 header and the AVTP control header shared by ADP, AECP
//! and ACMP.

use super::defines::{AVTP_ETHER_TYPE, AVTP_VERSION, AVTPDU_MAX_CONTROL_DATA_LENGTH};
use super::error::PduError;
use super::serialization::{Deserializer, Pack, SerializationError, Serializer, Unpack};
use crate::types::{MacAddress, PayloadPolicy};

/// Ethernet II header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination address
    pub dest_address: MacAddress,
    /// Source address
    pub src_address: MacAddress,
    /// EtherType
    pub ether_type: u16,
}

impl EthernetHeader {
    /// Header size in bytes
    pub const LENGTH: usize = 14;

    /// AVTP header between two stations
    #[must_use]
    pub fn new(dest_address: MacAddress, src_address: MacAddress) -> Self {
        Self {
            dest_address,
            src_address,
            ether_type: AVTP_ETHER_TYPE,
        }
    }
}

impl Pack for EthernetHeader {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        ser.pack(&self.dest_address)?
            .pack(&self.src_address)?
            .write_u16(self.ether_type)?;
        Ok(())
    }
}

impl Unpack for EthernetHeader {
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError> {
        Ok(Self {
            dest_address: des.unpack()?,
            src_address: des.unpack()?,
            ether_type: des.read_u16()?,
        })
    }
}

/// AVTP control header (12 bytes)
///
/// ```text
/// | cd:1 subtype:7 | sv:1 version:3 control_data:4 | status:5 cdl:11 | stream_id:64 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvtpControlHeader {
    /// AVTP subtype (ADP/AECP/ACMP)
    pub subtype: u8,
    /// Stream valid bit
    pub stream_valid: bool,
    /// AVTP version
    pub version: u8,
    /// Message type (4 bits)
    pub control_data: u8,
    /// Status or valid time (5 bits)
    pub status: u8,
    /// Declared length of the bytes following the header (11 bits)
    pub control_data_length: u16,
    /// Stream ID, or the entity ID for ADP/AECP
    pub stream_id: u64,
}

impl AvtpControlHeader {
    /// Header size in bytes
    pub const LENGTH: usize = 12;

    /// Header for a given subtype with every other field zeroed
    #[must_use]
    pub fn new(subtype: u8) -> Self {
        Self {
            subtype,
            stream_valid: false,
            version: AVTP_VERSION,
            control_data: 0,
            status: 0,
            control_data_length: 0,
            stream_id: 0,
        }
    }
}

impl Pack for AvtpControlHeader {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        // Control frames always have the cd bit set
        let byte0 = 0x80 | (self.subtype & 0x7F);
        let byte1 = (u8::from(self.stream_valid) << 7)
            | ((self.version & 0x07) << 4)
            | (self.control_data & 0x0F);
        let status_length =
            (u16::from(self.status & 0x1F) << 11) | (self.control_data_length & 0x07FF);
        ser.write_u8(byte0)?
            .write_u8(byte1)?
            .write_u16(status_length)?
            .write_u64(self.stream_id)?;
        Ok(())
    }
}

impl AvtpControlHeader {
    /// Decode the header, rejecting stream data frames.
    ///
    /// # Errors
    ///
    /// `NotControlFrame` when the cd bit is clear, or a codec error when
    /// fewer than 12 bytes remain.
    pub fn deserialize(des: &mut Deserializer<'_>) -> Result<Self, PduError> {
        let byte0 = des.read_u8()?;
        if byte0 & 0x80 == 0 {
            return Err(PduError::NotControlFrame);
        }
        let byte1 = des.read_u8()?;
        let status_length = des.read_u16()?;
        let stream_id = des.read_u64()?;

        // Both fields are masked to their bit widths before narrowing
        #[allow(clippy::cast_possible_truncation)]
        let status = (status_length >> 11) as u8;

        Ok(Self {
            subtype: byte0 & 0x7F,
            stream_valid: byte1 & 0x80 != 0,
            version: (byte1 >> 4) & 0x07,
            control_data: byte1 & 0x0F,
            status,
            control_data_length: status_length & 0x07FF,
            stream_id,
        })
    }

    /// Validate the declared length against what the PDU needs and what
    /// was actually received.
    ///
    /// Checks, in order, that the declared length is at least `minimum`
    /// and that it does not exceed `available`. Returns the length the
    /// caller should consume. With [`PayloadPolicy::Tolerant`] an
    /// over-long declaration is clamped to `available` and logged instead
    /// of rejected.
    ///
    /// # Errors
    ///
    /// `ControlDataLengthTooSmall` or `ControlDataLengthTooLarge`.
    pub fn checked_control_data_length(
        &self,
        minimum: usize,
        available: usize,
        policy: PayloadPolicy,
    ) -> Result<usize, PduError> {
        let declared = usize::from(self.control_data_length);
        if declared < minimum {
            return Err(PduError::ControlDataLengthTooSmall { declared, minimum });
        }
        if declared > available {
            if policy.is_tolerant() {
                tracing::warn!(
                    subtype = self.subtype,
                    declared,
                    available,
                    "control data length exceeds received bytes, clamping"
                );
                return Ok(available);
            }
            return Err(PduError::ControlDataLengthTooLarge {
                declared,
                available,
            });
        }
        Ok(declared)
    }
}

/// Convert a computed length to the 11-bit wire field.
///
/// # Errors
///
/// `PayloadTooLarge` when the length does not fit.
pub(crate) fn control_data_length(length: usize) -> Result<u16, PduError> {
    if length > AVTPDU_MAX_CONTROL_DATA_LENGTH {
        return Err(PduError::PayloadTooLarge {
            length,
            maximum: AVTPDU_MAX_CONTROL_DATA_LENGTH,
        });
    }
    u16::try_from(length).map_err(|_| PduError::PayloadTooLarge {
        length,
        maximum: AVTPDU_MAX_CONTROL_DATA_LENGTH,
    })
}
