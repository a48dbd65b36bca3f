//! ADP advertising of local entities

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use super::Outbound;
use crate::entity::{AvbInterfaceIndex, Entity};
use crate::protocol::defines::AdpMessageType;
use crate::types::UniqueIdentifier;

struct AdvertisedEntity {
    entity: Entity,
    next_advertise: BTreeMap<AvbInterfaceIndex, Instant>,
}

/// Sends EntityAvailable for every enabled local entity on every interface,
/// and answers matching Discover requests
#[derive(Default)]
pub struct AdvertiseStateMachine {
    entities: HashMap<UniqueIdentifier, AdvertisedEntity>,
}

impl AdvertiseStateMachine {
    /// Empty machine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start advertising `entity`. The first EntityAvailable goes out on the
    /// next tick. Enabling an entity again replaces its snapshot.
    pub fn enable(&mut self, entity: Entity, now: Instant) {
        let next_advertise = entity.interfaces().keys().map(|index| (*index, now)).collect();
        tracing::info!("Advertising {}", entity);
        self.entities.insert(
            entity.entity_id(),
            AdvertisedEntity {
                entity,
                next_advertise,
            },
        );
    }

    /// Stop advertising and send EntityDeparting on every interface.
    ///
    /// Returns false if the entity was not advertised.
    pub fn disable(&mut self, entity_id: UniqueIdentifier, out: &mut impl Outbound) -> bool {
        let Some(advertised) = self.entities.remove(&entity_id) else {
            return false;
        };
        let entity = &advertised.entity;
        for (index, info) in entity.interfaces() {
            let pdu = entity.to_adpdu(AdpMessageType::ENTITY_DEPARTING, *index, info);
            if let Err(e) = out.send_adpdu(info.mac_address, &pdu) {
                tracing::warn!("Failed to send EntityDeparting for {}: {}", entity_id, e);
            }
        }
        tracing::info!("Stopped advertising {}", entity_id);
        true
    }

    /// Whether `entity_id` is being advertised
    #[must_use]
    pub fn is_advertising(&self, entity_id: UniqueIdentifier) -> bool {
        self.entities.contains_key(&entity_id)
    }

    /// Current snapshot, with the live available index
    #[must_use]
    pub fn entity(&self, entity_id: UniqueIdentifier) -> Option<&Entity> {
        self.entities.get(&entity_id).map(|advertised| &advertised.entity)
    }

    /// Replace the snapshot and mark it dirty so it is re-advertised on the
    /// next tick. Available indices already sent are kept.
    ///
    /// Returns false if the entity was not advertised.
    pub fn update(&mut self, mut entity: Entity, now: Instant) -> bool {
        let Some(advertised) = self.entities.get_mut(&entity.entity_id()) else {
            return false;
        };
        let previous = &advertised.entity;
        let indices: Vec<AvbInterfaceIndex> = entity.interfaces().keys().copied().collect();
        for index in &indices {
            if let (Some(old), Some(new)) = (previous.interface(*index), entity.interface_mut(*index)) {
                new.available_index = new.available_index.max(old.available_index);
            }
        }
        advertised.next_advertise = indices.into_iter().map(|index| (index, now)).collect();
        advertised.entity = entity;
        true
    }

    /// React to an ENTITY_DISCOVER for `target` (null means every entity)
    pub fn handle_discover(&mut self, target: UniqueIdentifier, now: Instant) {
        for (entity_id, advertised) in &mut self.entities {
            if !target.is_null() && target != *entity_id {
                continue;
            }
            for (index, next) in &mut advertised.next_advertise {
                let Some(info) = advertised.entity.interface(*index) else {
                    continue;
                };
                let delayed = now + random_delay(info.valid_time);
                if delayed < *next {
                    *next = delayed;
                }
            }
            tracing::trace!("Discover for {} answered", entity_id);
        }
    }

    /// Send every advertisement that is due
    pub fn tick(&mut self, now: Instant, out: &mut impl Outbound) {
        for advertised in self.entities.values_mut() {
            let due: Vec<AvbInterfaceIndex> = advertised
                .next_advertise
                .iter()
                .filter(|(_, next)| **next <= now)
                .map(|(index, _)| *index)
                .collect();

            for index in due {
                let entity = &mut advertised.entity;
                let Some(info) = entity.interface(index).cloned() else {
                    advertised.next_advertise.remove(&index);
                    continue;
                };
                let pdu = entity.to_adpdu(AdpMessageType::ENTITY_AVAILABLE, index, &info);
                if let Err(e) = out.send_adpdu(info.mac_address, &pdu) {
                    tracing::warn!("Failed to advertise {}: {}", entity.entity_id(), e);
                }
                if let Some(info) = entity.interface_mut(index) {
                    info.available_index = info.available_index.wrapping_add(1);
                }
                advertised
                    .next_advertise
                    .insert(index, now + advertise_delay(info.valid_time));
            }
        }
    }
}

/// Period between two advertisements of an interface
pub(crate) fn advertise_delay(valid_time: u8) -> Duration {
    let half_validity = u64::from(valid_time) * 1000 / 2;
    Duration::from_millis(half_validity.max(1000)) + random_delay(valid_time)
}

/// Random jitter up to a fifth of the validity period
pub(crate) fn random_delay(valid_time: u8) -> Duration {
    let max = (u64::from(valid_time) * 2000 / 5).max(1);
    Duration::from_millis(rand::thread_rng().gen_range(0..max))
}
