//! Per-command payload schemas.
//!
//! Each command has a serialize function returning a [`Serializer`] sized to
//! the protocol constant, and a deserialize function taking the payload
//! slice of a decoded PDU. Deserializers fail with
//! [`PduError::IncorrectPayloadSize`] below the schema minimum and ignore
//! trailing bytes.

pub mod aem;
pub mod descriptors;
pub mod mvu;

use super::defines::{AEM_MAXIMUM_SEND_PAYLOAD_LENGTH, DescriptorType, MVU_MAXIMUM_SEND_PAYLOAD_LENGTH};
use super::error::PduError;
use super::serialization::{Deserializer, Serializer};

/// Serializer for AEM payloads of variable length
pub type AemPayloadSerializer = Serializer<AEM_MAXIMUM_SEND_PAYLOAD_LENGTH>;

/// Serializer for MVU payloads of variable length
pub type MvuPayloadSerializer = Serializer<MVU_MAXIMUM_SEND_PAYLOAD_LENGTH>;

/// Open a payload after checking its minimum length
pub(crate) fn checked(payload: &[u8], minimum: usize) -> Result<Deserializer<'_>, PduError> {
    if payload.len() < minimum {
        return Err(PduError::IncorrectPayloadSize {
            expected: minimum,
            actual: payload.len(),
        });
    }
    Ok(Deserializer::new(payload))
}

/// Make sure `count` items of `item_size` bytes remain
pub(crate) fn ensure_remaining(
    des: &Deserializer<'_>,
    count: u16,
    item_size: usize,
) -> Result<(), PduError> {
    let needed = usize::from(count) * item_size;
    if des.remaining() < needed {
        return Err(PduError::IncorrectPayloadSize {
            expected: des.used_bytes() + needed,
            actual: des.len(),
        });
    }
    Ok(())
}

pub(crate) fn read_descriptor_type(des: &mut Deserializer<'_>) -> Result<DescriptorType, PduError> {
    Ok(DescriptorType(des.read_u16()?))
}

/// 16-bit count prefix of a variable list
pub(crate) fn list_count(len: usize) -> Result<u16, PduError> {
    u16::try_from(len).map_err(|_| PduError::PayloadTooLarge {
        length: len,
        maximum: usize::from(u16::MAX),
    })
}
