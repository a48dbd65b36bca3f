//! ADP observation of remote entities

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use tokio::time::Instant;

use crate::entity::{AvbInterfaceIndex, Entity, EntityCapabilities, InterfaceInformation};
use crate::interface::InterfaceError;
use crate::protocol::Adpdu;
use crate::protocol::defines::AdpMessageType;
use crate::types::{MacAddress, UniqueIdentifier};

/// Change in the discovered entities table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// First advertisement from an entity
    Online(Entity),
    /// Advertised fields changed, or an interface appeared or expired
    Updated(Entity),
    /// Departed, expired or forgotten
    Offline(UniqueIdentifier),
}

struct RemoteEntity {
    entity: Entity,
    expiries: BTreeMap<AvbInterfaceIndex, Instant>,
}

/// Table of remote entities seen on the link
pub struct DiscoveryStateMachine {
    remotes: HashMap<UniqueIdentifier, RemoteEntity>,
    locals: HashSet<UniqueIdentifier>,
    discovery_delay: Duration,
    next_discovery: Option<Instant>,
}

impl DiscoveryStateMachine {
    /// Create a machine sending a global Discover every `discovery_delay`
    /// (`Duration::ZERO` disables it)
    #[must_use]
    pub fn new(discovery_delay: Duration) -> Self {
        Self {
            remotes: HashMap::new(),
            locals: HashSet::new(),
            discovery_delay,
            next_discovery: None,
        }
    }

    /// Ignore advertisements for `entity_id` from now on
    pub fn register_local_entity(&mut self, entity_id: UniqueIdentifier) {
        self.locals.insert(entity_id);
    }

    /// Forget that `entity_id` is local
    pub fn unregister_local_entity(&mut self, entity_id: UniqueIdentifier) {
        self.locals.remove(&entity_id);
    }

    /// Whether `entity_id` is in the discovered table
    #[must_use]
    pub fn contains(&self, entity_id: UniqueIdentifier) -> bool {
        self.remotes.contains_key(&entity_id)
    }

    /// Discovered entity
    #[must_use]
    pub fn entity(&self, entity_id: UniqueIdentifier) -> Option<&Entity> {
        self.remotes.get(&entity_id).map(|remote| &remote.entity)
    }

    /// Every discovered entity
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.remotes.values().map(|remote| &remote.entity)
    }

    /// AECP destination of a discovered entity
    #[must_use]
    pub fn mac_address(&self, entity_id: UniqueIdentifier) -> Option<MacAddress> {
        self.entity(entity_id).and_then(Entity::mac_address)
    }

    /// Process an ADPDU received from `source`
    pub fn handle_adpdu(&mut self, adpdu: &Adpdu, source: MacAddress, now: Instant) -> Vec<DiscoveryEvent> {
        if self.locals.contains(&adpdu.entity_id) {
            return Vec::new();
        }
        match adpdu.message_type {
            AdpMessageType::ENTITY_AVAILABLE => self.handle_available(adpdu, source, now),
            AdpMessageType::ENTITY_DEPARTING => self.handle_departing(adpdu, source),
            _ => Vec::new(),
        }
    }

    fn handle_available(&mut self, adpdu: &Adpdu, source: MacAddress, now: Instant) -> Vec<DiscoveryEvent> {
        if adpdu
            .entity_capabilities
            .contains(EntityCapabilities::ENTITY_NOT_READY)
        {
            tracing::trace!("Ignoring not ready entity {}", adpdu.entity_id);
            return Vec::new();
        }

        let (incoming, index) = Entity::from_adpdu(adpdu, source);
        let Some(info) = incoming.interface(index).cloned() else {
            return Vec::new();
        };
        let entity_id = incoming.entity_id();
        let expiry = now + Duration::from_millis(info.valid_time_millis());

        let Some(remote) = self.remotes.get_mut(&entity_id) else {
            tracing::info!("Entity {} online", entity_id);
            self.remotes.insert(
                entity_id,
                RemoteEntity {
                    entity: incoming.clone(),
                    expiries: BTreeMap::from([(index, expiry)]),
                },
            );
            return vec![DiscoveryEvent::Online(incoming)];
        };

        let previous = remote.entity.interface(index).cloned();
        let mac_changed = previous
            .as_ref()
            .is_some_and(|old| old.mac_address != info.mac_address);
        if mac_changed || remote.entity.immutable_fields_differ(incoming.common()) {
            tracing::info!("Entity {} changed identity, simulating offline/online", entity_id);
            self.remotes.insert(
                entity_id,
                RemoteEntity {
                    entity: incoming.clone(),
                    expiries: BTreeMap::from([(index, expiry)]),
                },
            );
            return vec![DiscoveryEvent::Offline(entity_id), DiscoveryEvent::Online(incoming)];
        }

        remote.expiries.insert(index, expiry);
        let common_changed = remote.entity.common() != incoming.common();
        if common_changed {
            remote.entity.set_common(incoming.common().clone());
        }

        let interface_changed = match previous {
            None => {
                remote.entity.insert_interface(index, info);
                true
            }
            Some(old) => {
                let newer = info.available_index > old.available_index;
                let fields_changed = old.gptp_grandmaster_id != info.gptp_grandmaster_id
                    || old.gptp_domain_number != info.gptp_domain_number
                    || old.valid_time != info.valid_time;
                if newer || fields_changed {
                    let available_index = old.available_index.max(info.available_index);
                    remote.entity.insert_interface(
                        index,
                        InterfaceInformation {
                            available_index,
                            ..info
                        },
                    );
                }
                newer || fields_changed
            }
        };

        if common_changed || interface_changed {
            tracing::trace!("Entity {} updated", entity_id);
            vec![DiscoveryEvent::Updated(remote.entity.clone())]
        } else {
            Vec::new()
        }
    }

    fn handle_departing(&mut self, adpdu: &Adpdu, source: MacAddress) -> Vec<DiscoveryEvent> {
        let (departing, index) = Entity::from_adpdu(adpdu, source);
        let entity_id = departing.entity_id();
        let Some(remote) = self.remotes.get_mut(&entity_id) else {
            return Vec::new();
        };
        remote.entity.remove_interface(index);
        remote.expiries.remove(&index);
        if remote.expiries.is_empty() {
            self.remotes.remove(&entity_id);
            tracing::info!("Entity {} departed", entity_id);
            vec![DiscoveryEvent::Offline(entity_id)]
        } else {
            vec![DiscoveryEvent::Updated(remote.entity.clone())]
        }
    }

    /// Expire interfaces whose validity ran out
    pub fn check_expiry(&mut self, now: Instant) -> Vec<DiscoveryEvent> {
        let mut events = Vec::new();
        let mut offline = Vec::new();
        for (entity_id, remote) in &mut self.remotes {
            let expired: Vec<AvbInterfaceIndex> = remote
                .expiries
                .iter()
                .filter(|(_, expiry)| **expiry <= now)
                .map(|(index, _)| *index)
                .collect();
            if expired.is_empty() {
                continue;
            }
            for index in &expired {
                remote.expiries.remove(index);
                remote.entity.remove_interface(*index);
            }
            if remote.expiries.is_empty() {
                offline.push(*entity_id);
            } else {
                events.push(DiscoveryEvent::Updated(remote.entity.clone()));
            }
        }
        for entity_id in offline {
            self.remotes.remove(&entity_id);
            tracing::info!("Entity {} timed out", entity_id);
            events.push(DiscoveryEvent::Offline(entity_id));
        }
        events
    }

    /// Remove an entity without waiting for it to expire.
    ///
    /// # Errors
    ///
    /// Fails with [`InterfaceError::UnknownRemoteEntity`] if it is not known.
    pub fn forget(&mut self, entity_id: UniqueIdentifier) -> Result<DiscoveryEvent, InterfaceError> {
        self.remotes
            .remove(&entity_id)
            .map(|_| DiscoveryEvent::Offline(entity_id))
            .ok_or(InterfaceError::UnknownRemoteEntity)
    }

    /// Forget every entity, returning the offline events
    pub fn clear(&mut self) -> Vec<DiscoveryEvent> {
        self.remotes
            .drain()
            .map(|(entity_id, _)| DiscoveryEvent::Offline(entity_id))
            .collect()
    }

    /// Whether the periodic global Discover is due. Returns true at most
    /// once per `discovery_delay`.
    pub fn poll_discovery(&mut self, now: Instant) -> bool {
        if self.discovery_delay.is_zero() {
            return false;
        }
        match self.next_discovery {
            Some(next) if next > now => false,
            _ => {
                self.next_discovery = Some(now + self.discovery_delay);
                true
            }
        }
    }
}
