//! Milan vendor-unique payloads.
//!
//! Only GET_MILAN_INFO has a schema here. The SYSTEM_UNIQUE_ID and
//! MEDIA_CLOCK_REFERENCE_INFO commands travel as opaque payloads.

use super::checked;
use crate::model::{MilanInfo, MilanInfoFeaturesFlags};
use crate::protocol::error::PduError;
use crate::protocol::serialization::Serializer;

/// GET_MILAN_INFO command
pub const GET_MILAN_INFO_COMMAND_LENGTH: usize = 2;

/// GET_MILAN_INFO response
pub const GET_MILAN_INFO_RESPONSE_LENGTH: usize = 14;

/// GET_MILAN_INFO command.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_get_milan_info_command()
-> Result<Serializer<GET_MILAN_INFO_COMMAND_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u16(0)?;
    Ok(ser)
}

/// Check a GET_MILAN_INFO command.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 2 bytes.
pub fn deserialize_get_milan_info_command(payload: &[u8]) -> Result<(), PduError> {
    checked(payload, GET_MILAN_INFO_COMMAND_LENGTH).map(|_| ())
}

/// GET_MILAN_INFO response.
///
/// # Errors
///
/// Never fails in practice; the buffer is sized for the payload.
pub fn serialize_get_milan_info_response(
    info: &MilanInfo,
) -> Result<Serializer<GET_MILAN_INFO_RESPONSE_LENGTH>, PduError> {
    let mut ser = Serializer::new();
    ser.write_u16(0)?
        .write_u32(info.protocol_version)?
        .write_u32(info.features_flags.bits())?
        .write_u32(info.certification_version)?;
    Ok(ser)
}

/// Decode a GET_MILAN_INFO response.
///
/// # Errors
///
/// `IncorrectPayloadSize` below 14 bytes.
pub fn deserialize_get_milan_info_response(payload: &[u8]) -> Result<MilanInfo, PduError> {
    let mut des = checked(payload, GET_MILAN_INFO_RESPONSE_LENGTH)?;
    des.skip(2)?;
    Ok(MilanInfo {
        protocol_version: des.read_u32()?,
        features_flags: MilanInfoFeaturesFlags::from_bits(des.read_u32()?),
        certification_version: des.read_u32()?,
    })
}
