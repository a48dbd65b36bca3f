//! Responder role: answering AEM commands from an entity model
//!
//! An [`AemHandler`] answers the read-only part of AEM from an
//! [`EntityTree`](crate::model::EntityTree) and hands everything else to an
//! optional [`AemCommandDispatcher`].

mod dispatcher;
mod handler;

#[cfg(test)]
mod tests;

pub use dispatcher::{AemCommandDispatcher, AemResponse};
pub use handler::{AemHandler, UnsolicitedSubscriber};

use crate::entity::Entity;
use crate::error::Result;
use crate::interface::LocalEntityHandle;
use crate::protocol::defines::AemCommandType;
use crate::types::{MacAddress, UniqueIdentifier};

/// Local entity answering AEM commands.
///
/// Created with
/// [`ProtocolInterface::create_responder_entity`](crate::ProtocolInterface::create_responder_entity).
pub struct ResponderEntity {
    handle: LocalEntityHandle,
}

impl ResponderEntity {
    pub(crate) fn new(handle: LocalEntityHandle) -> Self {
        Self { handle }
    }

    /// Entity ID of this responder
    #[must_use]
    pub fn entity_id(&self) -> UniqueIdentifier {
        self.handle.entity_id()
    }

    /// Link address of the interface
    #[must_use]
    pub fn mac_address(&self) -> MacAddress {
        self.handle.mac_address()
    }

    /// Start advertising.
    ///
    /// # Errors
    ///
    /// [`InterfaceError::DuplicateLocalEntityId`](crate::interface::InterfaceError::DuplicateLocalEntityId)
    /// if the entity ID was already discovered on the link.
    pub async fn enable_advertising(&self) -> Result<()> {
        self.handle.enable_advertising().await
    }

    /// Send ENTITY_DEPARTING and stop advertising
    ///
    /// # Errors
    ///
    /// Fails once the interface is gone.
    pub async fn disable_advertising(&self) -> Result<()> {
        self.handle.disable_advertising().await
    }

    /// Replace the advertised information
    ///
    /// # Errors
    ///
    /// Fails if `entity` carries another entity ID.
    pub async fn update_entity(&self, entity: Entity) -> Result<()> {
        self.handle.update_entity(entity).await
    }

    /// Current local entity information
    ///
    /// # Errors
    ///
    /// Fails once the interface is gone.
    pub async fn entity(&self) -> Result<Option<Entity>> {
        self.handle.entity().await
    }

    /// Send an unsolicited response to every registered controller,
    /// returning how many were notified.
    ///
    /// # Errors
    ///
    /// Fails if `payload` does not fit an AEM response.
    pub async fn send_unsolicited_notification(
        &self,
        command_type: AemCommandType,
        payload: Vec<u8>,
    ) -> Result<usize> {
        self.handle.send_unsolicited(command_type, payload).await
    }

    /// Tear down, returning the number of aborted commands
    pub async fn shutdown(self) -> usize {
        self.handle.shutdown().await
    }
}

impl std::fmt::Debug for ResponderEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponderEntity")
            .field("entity_id", &self.entity_id())
            .finish_non_exhaustive()
    }
}
