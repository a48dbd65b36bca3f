//! Entity descriptions shared by local and discovered entities
//!
//! An [`Entity`] is what ADP advertises: the identity and capabilities of an
//! end station plus one [`InterfaceInformation`] per AVB interface it is
//! reachable on.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{AvdeccError, Result};
use crate::protocol::Adpdu;
use crate::protocol::defines::{ADP_MAX_VALID_TIME, ADP_MIN_VALID_TIME, AdpMessageType};
use crate::types::{MacAddress, UniqueIdentifier};

pub use crate::protocol::defines::{
    ControllerCapabilities, EntityCapabilities, ListenerCapabilities, TalkerCapabilities,
};

#[cfg(test)]
mod tests;

/// AVB interface index used when an entity does not report one
pub const GLOBAL_AVB_INTERFACE_INDEX: u16 = 0xFFFF;

/// Index of an AVB_INTERFACE descriptor
pub type AvbInterfaceIndex = u16;

/// Identity and capabilities common to every interface of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonInformation {
    /// Entity ID
    pub entity_id: UniqueIdentifier,
    /// Entity model ID
    pub entity_model_id: UniqueIdentifier,
    /// Entity capabilities (validity bits are derived on send)
    pub entity_capabilities: EntityCapabilities,
    /// Number of talker stream sources
    pub talker_stream_sources: u16,
    /// Talker capabilities
    pub talker_capabilities: TalkerCapabilities,
    /// Number of listener stream sinks
    pub listener_stream_sinks: u16,
    /// Listener capabilities
    pub listener_capabilities: ListenerCapabilities,
    /// Controller capabilities
    pub controller_capabilities: ControllerCapabilities,
    /// CONTROL descriptor used for identification
    pub identify_control_index: Option<u16>,
    /// Association ID
    pub association_id: Option<UniqueIdentifier>,
}

impl CommonInformation {
    /// Common information of a controller-only entity
    #[must_use]
    pub fn controller(entity_id: UniqueIdentifier) -> Self {
        Self {
            entity_id,
            entity_model_id: UniqueIdentifier::NULL,
            entity_capabilities: EntityCapabilities::NONE,
            talker_stream_sources: 0,
            talker_capabilities: TalkerCapabilities::NONE,
            listener_stream_sinks: 0,
            listener_capabilities: ListenerCapabilities::NONE,
            controller_capabilities: ControllerCapabilities::IMPLEMENTED,
            identify_control_index: None,
            association_id: None,
        }
    }

    /// True if `other` differs in a field an entity never changes while online
    fn immutable_fields_differ(&self, other: &Self) -> bool {
        self.entity_model_id != other.entity_model_id
            || self.talker_stream_sources != other.talker_stream_sources
            || self.talker_capabilities != other.talker_capabilities
            || self.listener_stream_sinks != other.listener_stream_sinks
            || self.listener_capabilities != other.listener_capabilities
            || self.controller_capabilities != other.controller_capabilities
            || self.identify_control_index != other.identify_control_index
    }
}

/// Per-interface advertisement state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInformation {
    /// Source address of the advertisements
    pub mac_address: MacAddress,
    /// Validity period in 2-second units
    pub valid_time: u8,
    /// Incremented on every advertisement
    pub available_index: u32,
    /// gPTP grandmaster, when gPTP is supported
    pub gptp_grandmaster_id: Option<UniqueIdentifier>,
    /// gPTP domain, when gPTP is supported
    pub gptp_domain_number: Option<u8>,
}

impl InterfaceInformation {
    /// Interface with the default valid time and no gPTP information
    #[must_use]
    pub fn new(mac_address: MacAddress) -> Self {
        Self {
            mac_address,
            valid_time: crate::protocol::defines::ADP_DEFAULT_VALID_TIME,
            available_index: 0,
            gptp_grandmaster_id: None,
            gptp_domain_number: None,
        }
    }

    /// Validity period in milliseconds
    #[must_use]
    pub fn valid_time_millis(&self) -> u64 {
        u64::from(self.valid_time) * 2000
    }
}

/// An entity as advertised over ADP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    common: CommonInformation,
    interfaces: BTreeMap<AvbInterfaceIndex, InterfaceInformation>,
}

impl Entity {
    /// Create an entity.
    ///
    /// # Errors
    ///
    /// Fails with [`AvdeccError::InvalidParameter`] when the entity ID is not
    /// valid, when there is no interface, or when an interface valid time is
    /// outside `1..=31`.
    pub fn new(
        common: CommonInformation,
        interfaces: BTreeMap<AvbInterfaceIndex, InterfaceInformation>,
    ) -> Result<Self> {
        if !common.entity_id.is_valid() {
            return Err(invalid("entity_id", "must be a valid unique identifier"));
        }
        if interfaces.is_empty() {
            return Err(invalid("interfaces", "at least one interface is required"));
        }
        if let Some((index, _)) = interfaces
            .iter()
            .find(|(_, info)| !(ADP_MIN_VALID_TIME..=ADP_MAX_VALID_TIME).contains(&info.valid_time))
        {
            return Err(invalid(
                "valid_time",
                &format!("interface {index}: must be between {ADP_MIN_VALID_TIME} and {ADP_MAX_VALID_TIME}"),
            ));
        }
        Ok(Self { common, interfaces })
    }

    /// Single-interface entity reported on [`GLOBAL_AVB_INTERFACE_INDEX`]
    ///
    /// # Errors
    ///
    /// Same conditions as [`Entity::new`].
    pub fn with_interface(common: CommonInformation, interface: InterfaceInformation) -> Result<Self> {
        Self::new(
            common,
            BTreeMap::from([(GLOBAL_AVB_INTERFACE_INDEX, interface)]),
        )
    }

    /// Entity ID
    #[must_use]
    pub fn entity_id(&self) -> UniqueIdentifier {
        self.common.entity_id
    }

    /// Common information
    #[must_use]
    pub fn common(&self) -> &CommonInformation {
        &self.common
    }

    /// Mutable common information
    pub fn common_mut(&mut self) -> &mut CommonInformation {
        &mut self.common
    }

    /// Interfaces keyed by AVB interface index
    #[must_use]
    pub fn interfaces(&self) -> &BTreeMap<AvbInterfaceIndex, InterfaceInformation> {
        &self.interfaces
    }

    /// Interface by index
    #[must_use]
    pub fn interface(&self, index: AvbInterfaceIndex) -> Option<&InterfaceInformation> {
        self.interfaces.get(&index)
    }

    /// Mutable interface by index
    pub fn interface_mut(&mut self, index: AvbInterfaceIndex) -> Option<&mut InterfaceInformation> {
        self.interfaces.get_mut(&index)
    }

    /// Address of the first interface, used as the AECP destination
    #[must_use]
    pub fn mac_address(&self) -> Option<MacAddress> {
        self.interfaces.values().next().map(|info| info.mac_address)
    }

    /// Available index reported by the first interface
    #[must_use]
    pub fn available_index(&self) -> u32 {
        self.interfaces
            .values()
            .next()
            .map_or(0, |info| info.available_index)
    }

    pub(crate) fn insert_interface(&mut self, index: AvbInterfaceIndex, info: InterfaceInformation) {
        self.interfaces.insert(index, info);
    }

    pub(crate) fn remove_interface(&mut self, index: AvbInterfaceIndex) -> Option<InterfaceInformation> {
        self.interfaces.remove(&index)
    }

    /// Advertisement for one interface.
    ///
    /// The validity bits of `entity_capabilities` are set from the optional
    /// fields, so callers never have to keep them in sync.
    #[must_use]
    pub fn to_adpdu(
        &self,
        message_type: AdpMessageType,
        index: AvbInterfaceIndex,
        info: &InterfaceInformation,
    ) -> Adpdu {
        let common = &self.common;
        let mut caps = common
            .entity_capabilities
            .without(EntityCapabilities::AEM_IDENTIFY_CONTROL_INDEX_VALID)
            .without(EntityCapabilities::ASSOCIATION_ID_VALID)
            .without(EntityCapabilities::AEM_INTERFACE_INDEX_VALID)
            .without(EntityCapabilities::GPTP_SUPPORTED);
        caps.set(
            EntityCapabilities::AEM_IDENTIFY_CONTROL_INDEX_VALID,
            common.identify_control_index.is_some(),
        );
        caps.set(
            EntityCapabilities::ASSOCIATION_ID_VALID,
            common.association_id.is_some(),
        );
        caps.set(
            EntityCapabilities::AEM_INTERFACE_INDEX_VALID,
            index != GLOBAL_AVB_INTERFACE_INDEX,
        );
        caps.set(
            EntityCapabilities::GPTP_SUPPORTED,
            info.gptp_grandmaster_id.is_some(),
        );

        Adpdu {
            message_type,
            valid_time: info.valid_time,
            entity_id: common.entity_id,
            entity_model_id: common.entity_model_id,
            entity_capabilities: caps,
            talker_stream_sources: common.talker_stream_sources,
            talker_capabilities: common.talker_capabilities,
            listener_stream_sinks: common.listener_stream_sinks,
            listener_capabilities: common.listener_capabilities,
            controller_capabilities: common.controller_capabilities,
            available_index: info.available_index,
            gptp_grandmaster_id: info.gptp_grandmaster_id.unwrap_or(UniqueIdentifier::NULL),
            gptp_domain_number: info.gptp_domain_number.unwrap_or(0),
            identify_control_index: common.identify_control_index.unwrap_or(0),
            interface_index: if index == GLOBAL_AVB_INTERFACE_INDEX {
                0
            } else {
                index
            },
            association_id: common.association_id.unwrap_or(UniqueIdentifier::NULL),
        }
    }

    /// Decode an EntityAvailable received from `source`.
    ///
    /// Optional fields are only taken when their validity bit is set.
    #[must_use]
    pub fn from_adpdu(adpdu: &Adpdu, source: MacAddress) -> (Self, AvbInterfaceIndex) {
        let caps = adpdu.entity_capabilities;
        let common = CommonInformation {
            entity_id: adpdu.entity_id,
            entity_model_id: adpdu.entity_model_id,
            entity_capabilities: caps,
            talker_stream_sources: adpdu.talker_stream_sources,
            talker_capabilities: adpdu.talker_capabilities,
            listener_stream_sinks: adpdu.listener_stream_sinks,
            listener_capabilities: adpdu.listener_capabilities,
            controller_capabilities: adpdu.controller_capabilities,
            identify_control_index: caps
                .contains(EntityCapabilities::AEM_IDENTIFY_CONTROL_INDEX_VALID)
                .then_some(adpdu.identify_control_index),
            association_id: caps
                .contains(EntityCapabilities::ASSOCIATION_ID_VALID)
                .then_some(adpdu.association_id),
        };
        let gptp = caps.contains(EntityCapabilities::GPTP_SUPPORTED);
        let info = InterfaceInformation {
            mac_address: source,
            valid_time: adpdu.valid_time,
            available_index: adpdu.available_index,
            gptp_grandmaster_id: gptp.then_some(adpdu.gptp_grandmaster_id),
            gptp_domain_number: gptp.then_some(adpdu.gptp_domain_number),
        };
        let index = if caps.contains(EntityCapabilities::AEM_INTERFACE_INDEX_VALID) {
            adpdu.interface_index
        } else {
            GLOBAL_AVB_INTERFACE_INDEX
        };
        (
            Self {
                common,
                interfaces: BTreeMap::from([(index, info)]),
            },
            index,
        )
    }

    pub(crate) fn immutable_fields_differ(&self, other: &CommonInformation) -> bool {
        self.common.immutable_fields_differ(other)
    }

    pub(crate) fn set_common(&mut self, common: CommonInformation) {
        self.common = common;
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} interface{})",
            self.common.entity_id,
            self.interfaces.len(),
            if self.interfaces.len() == 1 { "" } else { "s" }
        )
    }
}

/// A stream of an entity, as used by ACMP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamIdentification {
    /// Talker or listener entity
    pub entity_id: UniqueIdentifier,
    /// Stream index on that entity
    pub stream_index: u16,
}

impl StreamIdentification {
    /// Stream `stream_index` of `entity_id`
    #[must_use]
    pub const fn new(entity_id: UniqueIdentifier, stream_index: u16) -> Self {
        Self {
            entity_id,
            stream_index,
        }
    }
}

fn invalid(name: &str, message: &str) -> AvdeccError {
    AvdeccError::InvalidParameter {
        name: name.to_string(),
        message: message.to_string(),
    }
}
