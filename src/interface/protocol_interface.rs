//! Public handle on one bound network interface

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::executor::{Executor, Request};
use super::{EventBus, InterfaceError, ProtocolEvent, Transport};
use crate::controller::{ControllerDelegate, ControllerEntity};
use crate::entity::{AvbInterfaceIndex, CommonInformation, Entity, InterfaceInformation};
use crate::error::Result;
use crate::model::EntityTree;
use crate::protocol::defines::AemCommandType;
use crate::protocol::{Acmpdu, Aecpdu, VuRegistry};
use crate::responder::{AemHandler, ResponderEntity};
use crate::state_machine::{AcmpResultHandler, AecpResultHandler, invoke_protected};
use crate::types::{MacAddress, ProtocolConfig, UniqueIdentifier};

/// Send `request` built around a reply channel and wait for the answer
async fn call<T>(
    requests: &mpsc::UnboundedSender<Request>,
    request: impl FnOnce(oneshot::Sender<T>) -> Request,
) -> std::result::Result<T, InterfaceError> {
    let (tx, rx) = oneshot::channel();
    requests
        .send(request(tx))
        .map_err(|_| InterfaceError::InterfaceNotRunning)?;
    rx.await.map_err(|_| InterfaceError::InterfaceNotRunning)
}

/// AVDECC protocol engine bound to one [`Transport`].
///
/// Runs a single executor task that owns discovery, advertising and command
/// correlation for every local entity created on it. Dropping the interface
/// stops the task; pending commands complete with
/// [`InterfaceError::Aborted`].
pub struct ProtocolInterface {
    mac_address: MacAddress,
    requests: mpsc::UnboundedSender<Request>,
    shutdown_tx: watch::Sender<bool>,
    events: EventBus,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ProtocolInterface {
    /// Start an interface on `transport` with the Milan vendor-unique
    /// protocol registered.
    ///
    /// # Errors
    ///
    /// Returns [`InterfaceError::InternalError`] outside a tokio runtime.
    pub fn new(transport: Arc<dyn Transport>, config: ProtocolConfig) -> Result<Self> {
        Self::with_registry(transport, config, VuRegistry::default())
    }

    /// Start an interface with a custom vendor-unique protocol registry
    ///
    /// # Errors
    ///
    /// Returns [`InterfaceError::InternalError`] outside a tokio runtime.
    pub fn with_registry(
        transport: Arc<dyn Transport>,
        config: ProtocolConfig,
        registry: VuRegistry,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| InterfaceError::InternalError(e.to_string()))?;
        let (requests, requests_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let events = EventBus::new(config.event_capacity);
        let mac_address = transport.mac_address();

        let executor = Executor::new(transport, &config, registry, events.clone());
        let task = runtime.spawn(executor.run(requests_rx, shutdown_rx));

        Ok(Self {
            mac_address,
            requests,
            shutdown_tx,
            events,
            task: Mutex::new(Some(task)),
        })
    }

    /// Link address of the transport
    #[must_use]
    pub fn mac_address(&self) -> MacAddress {
        self.mac_address
    }

    /// Event bus of this interface
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to interface events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProtocolEvent> {
        self.events.subscribe()
    }

    /// Create a controller entity.
    ///
    /// # Errors
    ///
    /// - [`AvdeccError::InvalidEntityModel`](crate::AvdeccError::InvalidEntityModel)
    ///   if `tree` fails validation
    /// - [`AvdeccError::InvalidParameter`](crate::AvdeccError::InvalidParameter)
    ///   for an invalid entity ID or interface set
    /// - [`InterfaceError::DuplicateLocalEntityId`] if the ID is already in use
    pub async fn create_controller_entity(
        &self,
        common: CommonInformation,
        interfaces: BTreeMap<AvbInterfaceIndex, InterfaceInformation>,
        tree: Option<EntityTree>,
        delegate: Option<Arc<dyn ControllerDelegate>>,
    ) -> Result<ControllerEntity> {
        let handler = AemHandler::new(tree)?;
        let entity = Entity::new(common, interfaces)?;
        let handle = self.register(entity, handler, delegate).await?;
        Ok(ControllerEntity::new(handle))
    }

    /// Create an entity answering AEM commands through `handler`
    ///
    /// # Errors
    ///
    /// - [`AvdeccError::InvalidParameter`](crate::AvdeccError::InvalidParameter)
    ///   for an invalid entity ID or interface set
    /// - [`InterfaceError::DuplicateLocalEntityId`] if the ID is already in use
    pub async fn create_responder_entity(
        &self,
        common: CommonInformation,
        interfaces: BTreeMap<AvbInterfaceIndex, InterfaceInformation>,
        handler: AemHandler,
    ) -> Result<ResponderEntity> {
        let entity = Entity::new(common, interfaces)?;
        let handle = self.register(entity, handler, None).await?;
        Ok(ResponderEntity::new(handle))
    }

    async fn register(
        &self,
        entity: Entity,
        handler: AemHandler,
        delegate: Option<Arc<dyn ControllerDelegate>>,
    ) -> Result<LocalEntityHandle> {
        let entity_id = entity.entity_id();
        call(&self.requests, |reply| Request::RegisterLocalEntity {
            entity,
            handler,
            delegate,
            reply,
        })
        .await??;
        Ok(LocalEntityHandle {
            entity_id,
            mac_address: self.mac_address,
            requests: self.requests.clone(),
            released: false,
        })
    }

    /// Send a global ENTITY_DISCOVER
    ///
    /// # Errors
    ///
    /// Returns the transport failure.
    pub async fn discover_remote_entities(&self) -> Result<()> {
        self.discover_remote_entity(UniqueIdentifier::NULL).await
    }

    /// Send an ENTITY_DISCOVER targeted at `entity_id`
    ///
    /// # Errors
    ///
    /// Returns the transport failure.
    pub async fn discover_remote_entity(&self, entity_id: UniqueIdentifier) -> Result<()> {
        call(&self.requests, |reply| Request::Discover {
            target: entity_id,
            reply,
        })
        .await??;
        Ok(())
    }

    /// Drop a discovered entity, emitting its offline event
    ///
    /// # Errors
    ///
    /// [`InterfaceError::UnknownRemoteEntity`] if it is not known.
    pub async fn forget_remote_entity(&self, entity_id: UniqueIdentifier) -> Result<()> {
        call(&self.requests, |reply| Request::ForgetRemoteEntity { entity_id, reply }).await??;
        Ok(())
    }

    /// Snapshot of the discovered entities
    ///
    /// # Errors
    ///
    /// [`InterfaceError::InterfaceNotRunning`] after shutdown.
    pub async fn remote_entities(&self) -> Result<Vec<Entity>> {
        Ok(call(&self.requests, |reply| Request::RemoteEntities { reply }).await?)
    }

    /// Discovered entity with `entity_id`
    ///
    /// # Errors
    ///
    /// [`InterfaceError::InterfaceNotRunning`] after shutdown.
    pub async fn remote_entity(&self, entity_id: UniqueIdentifier) -> Result<Option<Entity>> {
        let entities = self.remote_entities().await?;
        Ok(entities.into_iter().find(|e| e.entity_id() == entity_id))
    }

    /// Stop the executor and wait for it.
    ///
    /// Local entities send ENTITY_DEPARTING and every pending command
    /// completes with [`InterfaceError::Aborted`] before this returns.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!("Protocol interface task failed: {}", e);
            }
        }
    }
}

impl Drop for ProtocolInterface {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Registration of one local entity on the executor.
///
/// Dropping it runs the teardown sequence without waiting.
pub(crate) struct LocalEntityHandle {
    entity_id: UniqueIdentifier,
    mac_address: MacAddress,
    requests: mpsc::UnboundedSender<Request>,
    released: bool,
}

impl LocalEntityHandle {
    pub(crate) fn entity_id(&self) -> UniqueIdentifier {
        self.entity_id
    }

    pub(crate) fn mac_address(&self) -> MacAddress {
        self.mac_address
    }

    pub(crate) fn send_aecp(
        &self,
        command: Aecpdu,
        destination: Option<MacAddress>,
        handler: AecpResultHandler,
    ) {
        let request = Request::SendAecp {
            command,
            destination,
            handler,
        };
        if let Err(mpsc::error::SendError(Request::SendAecp { handler, .. })) =
            self.requests.send(request)
        {
            invoke_protected(
                "AECP result handler",
                handler,
                Err(InterfaceError::InterfaceNotRunning),
            );
        }
    }

    pub(crate) fn send_acmp(&self, command: Acmpdu, handler: AcmpResultHandler) {
        let request = Request::SendAcmp { command, handler };
        if let Err(mpsc::error::SendError(Request::SendAcmp { handler, .. })) =
            self.requests.send(request)
        {
            invoke_protected(
                "ACMP result handler",
                handler,
                Err(InterfaceError::InterfaceNotRunning),
            );
        }
    }

    pub(crate) async fn enable_advertising(&self) -> Result<()> {
        let entity_id = self.entity_id;
        call(&self.requests, |reply| Request::EnableAdvertising { entity_id, reply }).await??;
        Ok(())
    }

    pub(crate) async fn disable_advertising(&self) -> Result<()> {
        let entity_id = self.entity_id;
        call(&self.requests, |reply| Request::DisableAdvertising { entity_id, reply }).await??;
        Ok(())
    }

    pub(crate) async fn update_entity(&self, entity: Entity) -> Result<()> {
        if entity.entity_id() != self.entity_id {
            return Err(crate::AvdeccError::InvalidParameter {
                name: "entity".to_string(),
                message: format!("{} is not {}", entity.entity_id(), self.entity_id),
            });
        }
        call(&self.requests, |reply| Request::UpdateEntity { entity, reply }).await??;
        Ok(())
    }

    pub(crate) async fn entity(&self) -> Result<Option<Entity>> {
        let entity_id = self.entity_id;
        Ok(call(&self.requests, |reply| Request::LocalEntity { entity_id, reply }).await?)
    }

    pub(crate) async fn send_unsolicited(
        &self,
        command_type: AemCommandType,
        payload: Vec<u8>,
    ) -> Result<usize> {
        let entity_id = self.entity_id;
        let sent = call(&self.requests, |reply| Request::SendUnsolicited {
            entity_id,
            command_type,
            payload,
            reply,
        })
        .await??;
        Ok(sent)
    }

    /// Tear down and wait; returns the number of aborted commands
    pub(crate) async fn shutdown(mut self) -> usize {
        self.released = true;
        let entity_id = self.entity_id;
        call(&self.requests, |reply| Request::UnregisterLocalEntity {
            entity_id,
            reply: Some(reply),
        })
        .await
        .unwrap_or(0)
    }
}

impl Drop for LocalEntityHandle {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.requests.send(Request::UnregisterLocalEntity {
                entity_id: self.entity_id,
                reply: None,
            });
        }
    }
}
