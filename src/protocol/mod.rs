//! AVDECC wire protocol: codec, PDUs and payload schemas

pub mod aa_aecpdu;
pub mod acmpdu;
pub mod adpdu;
pub mod aecpdu;
pub mod aem_aecpdu;
pub mod avtpdu;
pub mod defines;
pub mod error;
pub mod frame;
pub mod mvu_aecpdu;
pub mod payloads;
pub mod serialization;
pub mod vu_aecpdu;

#[cfg(test)]
mod tests;

pub use aa_aecpdu::{AaAecpdu, Tlv};
pub use acmpdu::Acmpdu;
pub use adpdu::Adpdu;
pub use aecpdu::{AecpCommonHeader, Aecpdu};
pub use aem_aecpdu::AemAecpdu;
pub use avtpdu::EthernetHeader;
pub use error::PduError;
pub use frame::{Frame, FrameDecoder, Pdu, encode_frame};
pub use mvu_aecpdu::{MvuAecpdu, MvuDelegate};
pub use serialization::{Deserializer, Pack, SerializationError, Serializer, Unpack};
pub use vu_aecpdu::{VuAecpdu, VuDelegate, VuProtocolIdentifier, VuRegistry};
