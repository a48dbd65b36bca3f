//! Vendor-unique AECPDU framing and the per-protocol delegate registry.
//!
//! A vendor-unique PDU carries a 6-byte protocol identifier right after the
//! common AECP header. The registry maps identifiers to delegates that
//! decode the rest. Milan (MVU) is registered by default; frames with an
//! unregistered identifier are rejected.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use super::aecpdu::{AecpCommonHeader, Aecpdu};
use super::defines::{
    AECP_MAXIMUM_SEND_LENGTH, AECPDU_COMMON_HEADER_LENGTH, AecpMessageType, MVU_PROTOCOL_ID,
    VU_PROTOCOL_ID_LENGTH,
};
use super::error::PduError;
use super::mvu_aecpdu::MvuDelegate;
use super::serialization::Serializer;
use crate::types::UniqueIdentifier;

/// 48-bit vendor-unique protocol identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VuProtocolIdentifier(u64);

impl VuProtocolIdentifier {
    /// Milan vendor-unique protocol (Avnu OUI-36 `00-1B-C5-0A-C` + 0x100)
    pub const MILAN: Self = Self(MVU_PROTOCOL_ID);

    /// Wrap a value, keeping the low 48 bits
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value & 0x0000_FFFF_FFFF_FFFF)
    }

    /// Raw value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Decode from wire order
    #[must_use]
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        let mut wide = [0u8; 8];
        wide[2..].copy_from_slice(&bytes);
        Self(u64::from_be_bytes(wide))
    }

    /// Encode in wire order
    #[must_use]
    pub fn to_bytes(self) -> [u8; 6] {
        let wide = self.0.to_be_bytes();
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&wide[2..]);
        bytes
    }
}

impl fmt::Display for VuProtocolIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:012X}", self.0)
    }
}

impl fmt::Debug for VuProtocolIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VuProtocolIdentifier({self})")
    }
}

/// Decoder and timing policy for one vendor-unique protocol
pub trait VuDelegate: Send + Sync + fmt::Debug {
    /// Identifier this delegate handles
    fn protocol_id(&self) -> VuProtocolIdentifier;

    /// Decode the bytes following the protocol identifier.
    ///
    /// # Errors
    ///
    /// Any protocol-specific length or format error.
    fn deserialize(&self, common: AecpCommonHeader, data: &[u8]) -> Result<Aecpdu, PduError>;

    /// How long a controller waits for a response
    fn command_timeout(&self) -> Duration;

    /// Whether `response` answers `command` at the sub-protocol level
    ///
    /// Called after addressing and sequence ID already matched.
    fn is_expected_response(&self, _command: &Aecpdu, _response: &Aecpdu) -> bool {
        true
    }
}

/// Registry of vendor-unique delegates, keyed by protocol identifier
#[derive(Clone)]
pub struct VuRegistry {
    delegates: HashMap<VuProtocolIdentifier, Arc<dyn VuDelegate>>,
}

impl Default for VuRegistry {
    /// Registry with the Milan delegate
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(MvuDelegate));
        registry
    }
}

impl fmt::Debug for VuRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.delegates.keys()).finish()
    }
}

impl VuRegistry {
    /// Registry without any delegate
    #[must_use]
    pub fn empty() -> Self {
        Self {
            delegates: HashMap::new(),
        }
    }

    /// Register a delegate, returning the one it replaces
    pub fn register(&mut self, delegate: Arc<dyn VuDelegate>) -> Option<Arc<dyn VuDelegate>> {
        self.delegates.insert(delegate.protocol_id(), delegate)
    }

    /// Remove the delegate for `protocol_id`
    pub fn unregister(&mut self, protocol_id: VuProtocolIdentifier) -> Option<Arc<dyn VuDelegate>> {
        self.delegates.remove(&protocol_id)
    }

    /// Delegate for `protocol_id`
    #[must_use]
    pub fn get(&self, protocol_id: VuProtocolIdentifier) -> Option<Arc<dyn VuDelegate>> {
        self.delegates.get(&protocol_id).cloned()
    }

    /// Whether `protocol_id` is registered
    #[must_use]
    pub fn contains(&self, protocol_id: VuProtocolIdentifier) -> bool {
        self.delegates.contains_key(&protocol_id)
    }
}

/// Vendor-unique PDU whose payload is kept opaque
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VuAecpdu {
    /// Common AECP fields
    pub common: AecpCommonHeader,
    /// Vendor protocol
    pub protocol_id: VuProtocolIdentifier,
    payload: Bytes,
}

impl VuAecpdu {
    /// Largest payload after the protocol identifier
    pub const MAXIMUM_PAYLOAD_LENGTH: usize =
        AECP_MAXIMUM_SEND_LENGTH - AECPDU_COMMON_HEADER_LENGTH - VU_PROTOCOL_ID_LENGTH;

    /// Command for `protocol_id` addressed to `target`.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if `payload` does not fit one PDU.
    pub fn command(
        protocol_id: VuProtocolIdentifier,
        target: UniqueIdentifier,
        controller: UniqueIdentifier,
        payload: &[u8],
    ) -> Result<Self, PduError> {
        let mut common = AecpCommonHeader::new(AecpMessageType::VENDOR_UNIQUE_COMMAND);
        common.target_entity_id = target;
        common.controller_entity_id = controller;
        let mut pdu = Self {
            common,
            protocol_id,
            payload: Bytes::new(),
        };
        pdu.set_payload(payload)?;
        Ok(pdu)
    }

    /// Opaque payload
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replace the payload.
    ///
    /// # Errors
    ///
    /// `PayloadTooLarge` if `payload` does not fit one PDU.
    pub fn set_payload(&mut self, payload: &[u8]) -> Result<(), PduError> {
        if payload.len() > Self::MAXIMUM_PAYLOAD_LENGTH {
            return Err(PduError::PayloadTooLarge {
                length: payload.len(),
                maximum: Self::MAXIMUM_PAYLOAD_LENGTH,
            });
        }
        self.payload = Bytes::copy_from_slice(payload);
        Ok(())
    }

    pub(crate) fn serialize<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), PduError> {
        self.common
            .serialize(ser, VU_PROTOCOL_ID_LENGTH + self.payload.len())?;
        ser.write_bytes(&self.protocol_id.to_bytes())?
            .write_bytes(&self.payload)?;
        Ok(())
    }
}

/// Delegate keeping payloads opaque, for protocols without a typed codec
#[derive(Debug, Clone, Copy)]
pub struct OpaqueVuDelegate {
    protocol_id: VuProtocolIdentifier,
    timeout: Duration,
}

impl OpaqueVuDelegate {
    /// Delegate for `protocol_id` with the given command timeout
    #[must_use]
    pub fn new(protocol_id: VuProtocolIdentifier, timeout: Duration) -> Self {
        Self {
            protocol_id,
            timeout,
        }
    }
}

impl VuDelegate for OpaqueVuDelegate {
    fn protocol_id(&self) -> VuProtocolIdentifier {
        self.protocol_id
    }

    fn deserialize(&self, common: AecpCommonHeader, data: &[u8]) -> Result<Aecpdu, PduError> {
        Ok(Aecpdu::Vu(VuAecpdu {
            common,
            protocol_id: self.protocol_id,
            payload: Bytes::copy_from_slice(data),
        }))
    }

    fn command_timeout(&self) -> Duration {
        self.timeout
    }
}
