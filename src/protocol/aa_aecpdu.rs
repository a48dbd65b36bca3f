//! Address Access AECPDU: raw memory read/write/execute through TLVs

use super::aecpdu::AecpCommonHeader;
use super::defines::{
    AA_HEADER_LENGTH, AA_MAXIMUM_TLV_DATA_LENGTH, AA_TLV_HEADER_LENGTH, AaAecpStatus, AaMode,
    AecpMessageType,
};
use super::error::PduError;
use super::serialization::{Deserializer, Serializer};
use crate::types::UniqueIdentifier;

/// One memory access: mode, start address and data
///
/// For [`AaMode::READ`] commands the data is zero-filled and only its length
/// matters; the response carries the bytes read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    /// Access mode (4 bits)
    pub mode: AaMode,
    /// Start address
    pub address: u64,
    data: Vec<u8>,
}

impl Tlv {
    /// Largest data length the 12-bit length field can carry
    pub const MAX_DATA_LENGTH: usize = 0x0FFF;

    /// Read `length` bytes at `address`.
    ///
    /// # Errors
    ///
    /// `InvalidTlvLength` for a zero length or one above 4095.
    pub fn read(address: u64, length: usize) -> Result<Self, PduError> {
        Self::validate_length(length)?;
        Ok(Self {
            mode: AaMode::READ,
            address,
            data: vec![0u8; length],
        })
    }

    /// Write or execute with the given data.
    ///
    /// # Errors
    ///
    /// `InvalidTlvLength` for empty data or more than 4095 bytes.
    pub fn with_data(mode: AaMode, address: u64, data: Vec<u8>) -> Result<Self, PduError> {
        Self::validate_length(data.len())?;
        Ok(Self {
            mode,
            address,
            data,
        })
    }

    fn validate_length(length: usize) -> Result<(), PduError> {
        if length == 0 || length > Self::MAX_DATA_LENGTH {
            return Err(PduError::InvalidTlvLength(length));
        }
        Ok(())
    }

    /// Memory data
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Memory data length
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the TLV carries no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes on the wire, header included
    #[must_use]
    pub fn wire_length(&self) -> usize {
        AA_TLV_HEADER_LENGTH + self.data.len()
    }
}

/// Address Access command or response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AaAecpdu {
    /// Common AECP fields
    pub common: AecpCommonHeader,
    tlvs: Vec<Tlv>,
    tlv_data_length: usize,
}

impl AaAecpdu {
    /// TLV count field
    pub const HEADER_LENGTH: usize = AA_HEADER_LENGTH;

    /// Largest total size of the TLV area
    pub const MAXIMUM_TLV_DATA_LENGTH: usize = AA_MAXIMUM_TLV_DATA_LENGTH;

    /// Empty command or response
    #[must_use]
    pub fn new(is_response: bool) -> Self {
        let message_type = if is_response {
            AecpMessageType::ADDRESS_ACCESS_RESPONSE
        } else {
            AecpMessageType::ADDRESS_ACCESS_COMMAND
        };
        Self {
            common: AecpCommonHeader::new(message_type),
            tlvs: Vec::new(),
            tlv_data_length: 0,
        }
    }

    /// Command addressed to `target` carrying `tlvs`.
    ///
    /// # Errors
    ///
    /// Fails if the TLVs do not fit one PDU.
    pub fn command(
        target: UniqueIdentifier,
        controller: UniqueIdentifier,
        tlvs: impl IntoIterator<Item = Tlv>,
    ) -> Result<Self, PduError> {
        let mut pdu = Self::new(false);
        pdu.common.target_entity_id = target;
        pdu.common.controller_entity_id = controller;
        for tlv in tlvs {
            pdu.add_tlv(tlv)?;
        }
        Ok(pdu)
    }

    /// Status of a response
    #[must_use]
    pub fn status(&self) -> AaAecpStatus {
        AaAecpStatus(self.common.status)
    }

    /// Set the response status
    pub fn set_status(&mut self, status: AaAecpStatus) {
        self.common.status = status.value();
    }

    /// TLVs in wire order
    #[must_use]
    pub fn tlvs(&self) -> &[Tlv] {
        &self.tlvs
    }

    /// Total TLV bytes, headers included
    #[must_use]
    pub fn tlv_data_length(&self) -> usize {
        self.tlv_data_length
    }

    /// Append a TLV.
    ///
    /// # Errors
    ///
    /// `TlvTooLarge` when the TLV does not fit the remaining AA area, or
    /// `TooManyTlvs` when the count field would overflow. The PDU is left
    /// unchanged on error.
    pub fn add_tlv(&mut self, tlv: Tlv) -> Result<(), PduError> {
        let new_length = self.tlv_data_length + tlv.wire_length();
        if new_length > Self::MAXIMUM_TLV_DATA_LENGTH {
            return Err(PduError::TlvTooLarge {
                length: tlv.wire_length(),
                available: Self::MAXIMUM_TLV_DATA_LENGTH - self.tlv_data_length,
            });
        }
        if self.tlvs.len() >= usize::from(u16::MAX) {
            return Err(PduError::TooManyTlvs);
        }
        self.tlv_data_length = new_length;
        self.tlvs.push(tlv);
        Ok(())
    }

    pub(crate) fn serialize<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), PduError> {
        self.common
            .serialize(ser, Self::HEADER_LENGTH + self.tlv_data_length)?;
        let count = u16::try_from(self.tlvs.len()).map_err(|_| PduError::TooManyTlvs)?;
        ser.write_u16(count)?;
        for tlv in &self.tlvs {
            let length = u16::try_from(tlv.len())
                .map_err(|_| PduError::InvalidTlvLength(tlv.len()))?;
            let mode_length = (u16::from(tlv.mode.value() & 0x0F) << 12) | (length & 0x0FFF);
            ser.write_u16(mode_length)?
                .write_u64(tlv.address)?
                .write_bytes(&tlv.data)?;
        }
        Ok(())
    }

    pub(crate) fn deserialize(common: AecpCommonHeader, data: &[u8]) -> Result<Self, PduError> {
        let mut des = Deserializer::new(data);
        let count = des.read_u16()?;

        let mut tlvs = Vec::with_capacity(usize::from(count).min(64));
        let mut tlv_data_length = 0;
        for _ in 0..count {
            let mode_length = des.read_u16()?;
            let address = des.read_u64()?;
            let length = usize::from(mode_length & 0x0FFF);
            let data = des.read_bytes(length)?.to_vec();
            // Mode is masked to 4 bits
            #[allow(clippy::cast_possible_truncation)]
            let mode = AaMode((mode_length >> 12) as u8);
            tlvs.push(Tlv {
                mode,
                address,
                data,
            });
            tlv_data_length += AA_TLV_HEADER_LENGTH + length;
        }

        Ok(Self {
            common,
            tlvs,
            tlv_data_length,
        })
    }
}
