//! Whole-frame encoding and the inbound demultiplexer.

use bytes::Bytes;

use super::acmpdu::Acmpdu;
use super::adpdu::Adpdu;
use super::aecpdu::Aecpdu;
use super::avtpdu::{AvtpControlHeader, EthernetHeader};
use super::defines::{
    AVTP_ETHER_TYPE, AVTP_SUBTYPE_ACMP, AVTP_SUBTYPE_ADP, AVTP_SUBTYPE_AECP,
    ETHERNET_MAX_FRAME_LENGTH,
};
use super::error::PduError;
use super::serialization::{Deserializer, Serializer};
use super::vu_aecpdu::VuRegistry;
use crate::types::{MacAddress, PayloadPolicy};

/// Any AVDECC PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pdu {
    /// Discovery
    Adp(Adpdu),
    /// Enumeration and control
    Aecp(Aecpdu),
    /// Connection management
    Acmp(Acmpdu),
}

impl Pdu {
    /// Short name of the sub-protocol, for logs
    #[must_use]
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Adp(_) => "ADP",
            Self::Aecp(_) => "AECP",
            Self::Acmp(_) => "ACMP",
        }
    }

    fn serialize<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), PduError> {
        match self {
            Self::Adp(pdu) => pdu.serialize(ser),
            Self::Aecp(pdu) => pdu.serialize(ser),
            Self::Acmp(pdu) => pdu.serialize(ser),
        }
    }
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Ethernet destination
    pub dest_address: MacAddress,
    /// Ethernet source
    pub src_address: MacAddress,
    /// Decoded PDU
    pub pdu: Pdu,
}

/// Encode a PDU into a complete Ethernet frame.
///
/// # Errors
///
/// Fails when the PDU does not fit a frame.
pub fn encode_frame(
    dest_address: MacAddress,
    src_address: MacAddress,
    pdu: &Pdu,
) -> Result<Bytes, PduError> {
    let mut ser = Serializer::<ETHERNET_MAX_FRAME_LENGTH>::new();
    ser.pack(&EthernetHeader::new(dest_address, src_address))?;
    pdu.serialize(&mut ser)?;
    Ok(Bytes::copy_from_slice(ser.data()))
}

/// Inbound frame demultiplexer
///
/// Dispatches on EtherType and AVTP subtype, then hands the bytes to the
/// matching PDU decoder with the configured length policy.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    policy: PayloadPolicy,
    registry: VuRegistry,
}

impl FrameDecoder {
    /// Decoder with an explicit policy and vendor-unique registry
    #[must_use]
    pub fn new(policy: PayloadPolicy, registry: VuRegistry) -> Self {
        Self { policy, registry }
    }

    /// Length policy in force
    #[must_use]
    pub fn policy(&self) -> PayloadPolicy {
        self.policy
    }

    /// Vendor-unique registry
    #[must_use]
    pub fn registry(&self) -> &VuRegistry {
        &self.registry
    }

    /// Mutable vendor-unique registry
    pub fn registry_mut(&mut self) -> &mut VuRegistry {
        &mut self.registry
    }

    /// Decode one Ethernet frame.
    ///
    /// # Errors
    ///
    /// Non-AVTP frames, unknown subtypes and any PDU decoding error.
    pub fn decode(&self, data: &[u8]) -> Result<Frame, PduError> {
        let mut des = Deserializer::new(data);
        let ethernet: EthernetHeader = des.unpack()?;
        if ethernet.ether_type != AVTP_ETHER_TYPE {
            return Err(PduError::InvalidEtherType(ethernet.ether_type));
        }

        let header = AvtpControlHeader::deserialize(&mut des)?;
        let pdu = match header.subtype {
            AVTP_SUBTYPE_ADP => Pdu::Adp(Adpdu::deserialize(&header, &mut des, self.policy)?),
            AVTP_SUBTYPE_AECP => Pdu::Aecp(Aecpdu::deserialize(
                &header,
                &mut des,
                &self.registry,
                self.policy,
            )?),
            AVTP_SUBTYPE_ACMP => Pdu::Acmp(Acmpdu::deserialize(&header, &mut des, self.policy)?),
            other => return Err(PduError::UnknownSubtype(other)),
        };

        Ok(Frame {
            dest_address: ethernet.dest_address,
            src_address: ethernet.src_address,
            pdu,
        })
    }
}
