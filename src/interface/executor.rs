//! The per-interface executor task
//!
//! One task owns the state machines and the local entity table. Inbound
//! frames, timer ticks and requests from entity handles are serialized
//! through its `select!` loop, so none of that state needs a lock.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};

use super::{EventBus, InterfaceError, ProtocolEvent, Transport};
use crate::controller::ControllerDelegate;
use crate::controller::delegate::{dispatch_acmp_sniffed, dispatch_unsolicited};
use crate::entity::Entity;
use crate::protocol::defines::{
    ADP_MULTICAST_MAC, AdpMessageType, AemAecpStatus, AemCommandType,
};
use crate::protocol::{
    Acmpdu, Adpdu, AemAecpdu, Aecpdu, FrameDecoder, Pdu, PduError, VuRegistry, encode_frame,
};
use crate::responder::AemHandler;
use crate::state_machine::{
    AcmpResultHandler, AdvertiseStateMachine, AecpResultHandler, CommandStateMachine,
    DiscoveryEvent, DiscoveryStateMachine, Outbound, invoke_protected,
};
use crate::types::{MacAddress, ProtocolConfig, UniqueIdentifier};

type Reply<T> = oneshot::Sender<T>;

/// Work marshaled onto the executor
pub(crate) enum Request {
    RegisterLocalEntity {
        entity: Entity,
        handler: AemHandler,
        delegate: Option<Arc<dyn ControllerDelegate>>,
        reply: Reply<Result<(), InterfaceError>>,
    },
    UnregisterLocalEntity {
        entity_id: UniqueIdentifier,
        reply: Option<Reply<usize>>,
    },
    EnableAdvertising {
        entity_id: UniqueIdentifier,
        reply: Reply<Result<(), InterfaceError>>,
    },
    DisableAdvertising {
        entity_id: UniqueIdentifier,
        reply: Reply<Result<(), InterfaceError>>,
    },
    UpdateEntity {
        entity: Entity,
        reply: Reply<Result<(), InterfaceError>>,
    },
    LocalEntity {
        entity_id: UniqueIdentifier,
        reply: Reply<Option<Entity>>,
    },
    SendAecp {
        command: Aecpdu,
        destination: Option<MacAddress>,
        handler: AecpResultHandler,
    },
    SendAcmp {
        command: Acmpdu,
        handler: AcmpResultHandler,
    },
    SendUnsolicited {
        entity_id: UniqueIdentifier,
        command_type: AemCommandType,
        payload: Vec<u8>,
        reply: Reply<Result<usize, InterfaceError>>,
    },
    Discover {
        target: UniqueIdentifier,
        reply: Reply<Result<(), InterfaceError>>,
    },
    ForgetRemoteEntity {
        entity_id: UniqueIdentifier,
        reply: Reply<Result<(), InterfaceError>>,
    },
    RemoteEntities {
        reply: Reply<Vec<Entity>>,
    },
}

/// Frame sink used by the state machines.
///
/// Frames for our own address or a multicast group are also queued for
/// local delivery, the way a real NIC hands them to every local listener.
struct Wire {
    transport: Arc<dyn Transport>,
    mac_address: MacAddress,
    loopback: VecDeque<Bytes>,
}

impl Wire {
    fn send(
        &mut self,
        destination: MacAddress,
        source: MacAddress,
        pdu: Pdu,
    ) -> Result<(), InterfaceError> {
        let frame = encode_frame(destination, source, &pdu)
            .map_err(|e| InterfaceError::InternalError(e.to_string()))?;
        if destination.is_multicast() || destination == self.mac_address {
            self.loopback.push_back(frame.clone());
        }
        self.transport.send(frame)
    }
}

impl Outbound for Wire {
    fn send_adpdu(&mut self, source: MacAddress, pdu: &Adpdu) -> Result<(), InterfaceError> {
        self.send(ADP_MULTICAST_MAC, source, Pdu::Adp(pdu.clone()))
    }

    fn send_aecpdu(&mut self, destination: MacAddress, pdu: &Aecpdu) -> Result<(), InterfaceError> {
        let source = self.mac_address;
        self.send(destination, source, Pdu::Aecp(pdu.clone()))
    }

    fn send_acmpdu(&mut self, pdu: &Acmpdu) -> Result<(), InterfaceError> {
        let source = self.mac_address;
        self.send(ADP_MULTICAST_MAC, source, Pdu::Acmp(pdu.clone()))
    }
}

struct LocalEntityRecord {
    entity: Entity,
    handler: AemHandler,
    delegate: Option<Arc<dyn ControllerDelegate>>,
    unsolicited_sequence_id: u16,
}

pub(crate) struct Executor {
    wire: Wire,
    decoder: FrameDecoder,
    events: EventBus,
    tick_interval: std::time::Duration,
    advertise: AdvertiseStateMachine,
    discovery: DiscoveryStateMachine,
    commands: CommandStateMachine,
    locals: HashMap<UniqueIdentifier, LocalEntityRecord>,
}

impl Executor {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        config: &ProtocolConfig,
        registry: VuRegistry,
        events: EventBus,
    ) -> Self {
        let mac_address = transport.mac_address();
        Self {
            wire: Wire {
                transport,
                mac_address,
                loopback: VecDeque::new(),
            },
            decoder: FrameDecoder::new(config.payload_policy, registry.clone()),
            events,
            tick_interval: config.tick_interval,
            advertise: AdvertiseStateMachine::new(),
            discovery: DiscoveryStateMachine::new(config.discovery_delay),
            commands: CommandStateMachine::new(config.max_inflight_aecp, registry),
            locals: HashMap::new(),
        }
    }

    pub(crate) async fn run(
        mut self,
        mut requests: mpsc::UnboundedReceiver<Request>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let transport = self.wire.transport.clone();
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut receiving = true;

        tracing::info!("Protocol interface {} started", self.wire.mac_address);

        loop {
            tokio::select! {
                result = transport.recv(), if receiving => match result {
                    Ok(frame) => self.handle_frame(&frame, Instant::now()),
                    Err(e) => {
                        tracing::warn!("Transport receive failed, no longer receiving: {}", e);
                        receiving = false;
                        self.notify_controllers(|d| d.on_transport_error());
                        self.events.emit(ProtocolEvent::TransportError {
                            message: e.to_string(),
                        });
                    }
                },
                _ = ticker.tick() => self.on_tick(Instant::now()),
                request = requests.recv() => match request {
                    Some(request) => self.handle_request(request, Instant::now()),
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
            self.process_loopback(Instant::now());
            self.flush_statistics();
        }

        self.drain_requests(&mut requests);
        self.teardown();
        tracing::info!("Protocol interface {} stopped", self.wire.mac_address);
    }

    /// Fail commands still queued behind the shutdown signal
    fn drain_requests(&mut self, requests: &mut mpsc::UnboundedReceiver<Request>) {
        requests.close();
        let mut aborted = 0;
        while let Ok(request) = requests.try_recv() {
            match request {
                Request::SendAecp { handler, .. } => {
                    invoke_protected("AECP result handler", handler, Err(InterfaceError::Aborted));
                    aborted += 1;
                }
                Request::SendAcmp { handler, .. } => {
                    invoke_protected("ACMP result handler", handler, Err(InterfaceError::Aborted));
                    aborted += 1;
                }
                request @ Request::UnregisterLocalEntity { .. } => {
                    self.handle_request(request, Instant::now());
                }
                // dropping the reply sender reports InterfaceNotRunning
                _ => {}
            }
        }
        if aborted > 0 {
            tracing::debug!("Aborted {} queued commands at shutdown", aborted);
        }
    }

    fn teardown(&mut self) {
        let ids: Vec<_> = self.locals.keys().copied().collect();
        for entity_id in ids {
            self.unregister_local_entity(entity_id);
        }
        let aborted = self.commands.clear();
        if aborted > 0 {
            tracing::debug!("Aborted {} orphaned commands", aborted);
        }
        self.discovery.clear();
        self.flush_statistics();
    }

    fn process_loopback(&mut self, now: Instant) {
        while let Some(frame) = self.wire.loopback.pop_front() {
            self.handle_frame(&frame, now);
        }
    }

    fn flush_statistics(&mut self) {
        for statistic in self.commands.take_statistics() {
            self.events.emit(ProtocolEvent::Statistic(statistic));
        }
    }

    fn on_tick(&mut self, now: Instant) {
        self.commands.check_timeouts(now, &mut self.wire);
        self.advertise.tick(now, &mut self.wire);
        let events = self.discovery.check_expiry(now);
        self.dispatch_discovery(events);
        if self.discovery.poll_discovery(now) {
            if let Err(e) = self.send_discover(UniqueIdentifier::NULL) {
                tracing::warn!("Periodic discovery failed: {}", e);
            }
        }
    }

    fn send_discover(&mut self, target: UniqueIdentifier) -> Result<(), InterfaceError> {
        tracing::debug!("Sending ENTITY_DISCOVER for {}", target);
        let source = self.wire.mac_address;
        self.wire.send_adpdu(source, &Adpdu::discover(target))
    }

    // ===== Inbound =====

    fn handle_frame(&mut self, data: &[u8], now: Instant) {
        let frame = match self.decoder.decode(data) {
            Ok(frame) => frame,
            Err(PduError::InvalidEtherType(_)) => return,
            Err(error) => {
                let source = source_address(data);
                tracing::debug!("Dropping malformed frame from {}: {}", source, error);
                self.events
                    .emit(ProtocolEvent::MalformedFrame { source, error });
                return;
            }
        };
        if !(frame.dest_address.is_multicast() || frame.dest_address == self.wire.mac_address) {
            return;
        }
        let source = frame.src_address;

        match frame.pdu {
            Pdu::Adp(adpdu) => {
                if adpdu.message_type == AdpMessageType::ENTITY_DISCOVER {
                    tracing::trace!("ENTITY_DISCOVER for {} from {}", adpdu.entity_id, source);
                    self.advertise.handle_discover(adpdu.entity_id, now);
                } else {
                    let events = self.discovery.handle_adpdu(&adpdu, source, now);
                    self.dispatch_discovery(events);
                }
            }
            Pdu::Aecp(aecpdu) if aecpdu.is_command() => self.handle_aecp_command(&aecpdu, source),
            Pdu::Aecp(aecpdu) => self.handle_aecp_response(aecpdu, source, now),
            Pdu::Acmp(acmpdu) => {
                if !acmpdu.is_command() {
                    self.notify_controllers(|d| dispatch_acmp_sniffed(d, &acmpdu));
                    self.commands.handle_acmp_response(&acmpdu);
                    self.events
                        .emit(ProtocolEvent::AcmpResponseSniffed { acmpdu });
                }
            }
        }
    }

    fn handle_aecp_command(&mut self, command: &Aecpdu, source: MacAddress) {
        let target = command.target_entity_id();
        let Some(record) = self.locals.get_mut(&target) else {
            return;
        };
        let entity = self.advertise.entity(target).unwrap_or(&record.entity);
        let Some(response) = record.handler.handle(entity, command, source) else {
            return;
        };
        if let Err(e) = self.wire.send_aecpdu(source, &response) {
            tracing::warn!("Could not answer {}: {}", source, e);
        }
    }

    fn handle_aecp_response(&mut self, response: Aecpdu, source: MacAddress, now: Instant) {
        if let Aecpdu::Aem(aem) = &response {
            if aem.command_type == AemCommandType::IDENTIFY_NOTIFICATION {
                tracing::debug!("IDENTIFY notification from {}", aem.common.target_entity_id);
                self.events
                    .emit(ProtocolEvent::IdentifyNotification { aecpdu: response });
                return;
            }
        }
        if response.is_unsolicited() {
            let controller = response.controller_entity_id();
            let Some(record) = self.locals.get(&controller) else {
                tracing::trace!("Unsolicited response for unknown controller {}", controller);
                return;
            };
            if let Some(delegate) = record.delegate.as_deref() {
                notify(delegate, |d| dispatch_unsolicited(d, &response));
            }
            self.events
                .emit(ProtocolEvent::UnsolicitedResponse { aecpdu: response });
            return;
        }
        self.commands
            .handle_aecp_response(&response, source, now, &mut self.wire);
    }

    fn dispatch_discovery(&mut self, events: Vec<DiscoveryEvent>) {
        for event in events {
            match event {
                DiscoveryEvent::Online(entity) => {
                    tracing::info!("Remote entity {} online", entity.entity_id());
                    self.notify_controllers(|d| d.on_entity_online(&entity));
                    self.events.emit(ProtocolEvent::RemoteEntityOnline { entity });
                }
                DiscoveryEvent::Updated(entity) => {
                    tracing::debug!("Remote entity {} updated", entity.entity_id());
                    self.notify_controllers(|d| d.on_entity_update(&entity));
                    self.events
                        .emit(ProtocolEvent::RemoteEntityUpdated { entity });
                }
                DiscoveryEvent::Offline(entity_id) => {
                    tracing::info!("Remote entity {} offline", entity_id);
                    self.notify_controllers(|d| d.on_entity_offline(entity_id));
                    self.events
                        .emit(ProtocolEvent::RemoteEntityOffline { entity_id });
                }
            }
        }
    }

    fn notify_controllers(&self, notification: impl Fn(&dyn ControllerDelegate)) {
        for delegate in self.locals.values().filter_map(|r| r.delegate.as_deref()) {
            notify(delegate, &notification);
        }
    }

    // ===== Requests =====

    fn handle_request(&mut self, request: Request, now: Instant) {
        match request {
            Request::RegisterLocalEntity {
                entity,
                handler,
                delegate,
                reply,
            } => {
                let _ = reply.send(self.register_local_entity(entity, handler, delegate));
            }
            Request::UnregisterLocalEntity { entity_id, reply } => {
                let aborted = self.unregister_local_entity(entity_id);
                if let Some(reply) = reply {
                    let _ = reply.send(aborted);
                }
            }
            Request::EnableAdvertising { entity_id, reply } => {
                let _ = reply.send(self.enable_advertising(entity_id, now));
            }
            Request::DisableAdvertising { entity_id, reply } => {
                let result = if self.locals.contains_key(&entity_id) {
                    if self.advertise.disable(entity_id, &mut self.wire) {
                        tracing::info!("Stopped advertising {}", entity_id);
                    }
                    Ok(())
                } else {
                    Err(InterfaceError::UnknownLocalEntity)
                };
                let _ = reply.send(result);
            }
            Request::UpdateEntity { entity, reply } => {
                let result = match self.locals.get_mut(&entity.entity_id()) {
                    Some(record) => {
                        record.entity = entity.clone();
                        self.advertise.update(entity, now);
                        Ok(())
                    }
                    None => Err(InterfaceError::UnknownLocalEntity),
                };
                let _ = reply.send(result);
            }
            Request::LocalEntity { entity_id, reply } => {
                let entity = self.advertise.entity(entity_id).cloned().or_else(|| {
                    self.locals
                        .get(&entity_id)
                        .map(|record| record.entity.clone())
                });
                let _ = reply.send(entity);
            }
            Request::SendAecp {
                command,
                destination,
                handler,
            } => self.send_aecp(command, destination, handler, now),
            Request::SendAcmp { command, handler } => {
                self.commands
                    .send_acmp_command(command, handler, now, &mut self.wire);
            }
            Request::SendUnsolicited {
                entity_id,
                command_type,
                payload,
                reply,
            } => {
                let _ = reply.send(self.send_unsolicited(entity_id, command_type, &payload));
            }
            Request::Discover { target, reply } => {
                let _ = reply.send(self.send_discover(target));
            }
            Request::ForgetRemoteEntity { entity_id, reply } => {
                let result = self
                    .discovery
                    .forget(entity_id)
                    .map(|event| self.dispatch_discovery(vec![event]));
                let _ = reply.send(result);
            }
            Request::RemoteEntities { reply } => {
                let _ = reply.send(self.discovery.entities().cloned().collect());
            }
        }
    }

    fn register_local_entity(
        &mut self,
        entity: Entity,
        handler: AemHandler,
        delegate: Option<Arc<dyn ControllerDelegate>>,
    ) -> Result<(), InterfaceError> {
        let entity_id = entity.entity_id();
        if self.locals.contains_key(&entity_id) || self.discovery.contains(entity_id) {
            return Err(InterfaceError::DuplicateLocalEntityId);
        }
        self.commands.register_local_entity(entity_id)?;
        self.discovery.register_local_entity(entity_id);
        self.locals.insert(
            entity_id,
            LocalEntityRecord {
                entity,
                handler,
                delegate,
                unsolicited_sequence_id: 0,
            },
        );
        tracing::info!("Local entity {} online", entity_id);
        self.events
            .emit(ProtocolEvent::LocalEntityOnline { entity_id });
        Ok(())
    }

    /// Departing first, then unregister, then abort whatever is left
    fn unregister_local_entity(&mut self, entity_id: UniqueIdentifier) -> usize {
        self.advertise.disable(entity_id, &mut self.wire);
        if self.locals.remove(&entity_id).is_none() {
            return 0;
        }
        self.discovery.unregister_local_entity(entity_id);
        let aborted = self.commands.unregister_local_entity(entity_id);
        tracing::info!(
            "Local entity {} offline ({} pending commands aborted)",
            entity_id,
            aborted
        );
        self.events
            .emit(ProtocolEvent::LocalEntityOffline { entity_id });
        aborted
    }

    fn enable_advertising(
        &mut self,
        entity_id: UniqueIdentifier,
        now: Instant,
    ) -> Result<(), InterfaceError> {
        let record = self
            .locals
            .get(&entity_id)
            .ok_or(InterfaceError::UnknownLocalEntity)?;
        if self.discovery.contains(entity_id) {
            return Err(InterfaceError::DuplicateLocalEntityId);
        }
        if !self.advertise.is_advertising(entity_id) {
            self.advertise.enable(record.entity.clone(), now);
            self.advertise.tick(now, &mut self.wire);
        }
        Ok(())
    }

    fn send_aecp(
        &mut self,
        command: Aecpdu,
        destination: Option<MacAddress>,
        handler: AecpResultHandler,
        now: Instant,
    ) {
        let target = command.target_entity_id();
        let destination = destination.or_else(|| {
            if self.locals.contains_key(&target) {
                Some(self.wire.mac_address)
            } else {
                self.discovery.mac_address(target)
            }
        });
        match destination {
            Some(destination) => {
                self.commands
                    .send_aecp_command(command, destination, handler, now, &mut self.wire);
            }
            None => {
                tracing::debug!("No address known for {}", target);
                invoke_protected(
                    "AECP result handler",
                    handler,
                    Err(InterfaceError::UnknownRemoteEntity),
                );
            }
        }
    }

    fn send_unsolicited(
        &mut self,
        entity_id: UniqueIdentifier,
        command_type: AemCommandType,
        payload: &[u8],
    ) -> Result<usize, InterfaceError> {
        let record = self
            .locals
            .get_mut(&entity_id)
            .ok_or(InterfaceError::UnknownLocalEntity)?;
        let mut sent = 0;
        for subscriber in record.handler.subscribers() {
            let mut notification = AemAecpdu::new(true);
            notification.unsolicited = true;
            notification.command_type = command_type;
            notification.common.target_entity_id = entity_id;
            notification.common.controller_entity_id = subscriber.controller_entity_id;
            notification.common.sequence_id = record.unsolicited_sequence_id;
            notification.set_status(AemAecpStatus::SUCCESS);
            notification
                .set_payload(payload)
                .map_err(|e| InterfaceError::InternalError(e.to_string()))?;
            record.unsolicited_sequence_id = record.unsolicited_sequence_id.wrapping_add(1);

            match self
                .wire
                .send_aecpdu(subscriber.mac_address, &Aecpdu::Aem(notification))
            {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(
                    "Unsolicited {} to {} failed: {}",
                    command_type,
                    subscriber.controller_entity_id,
                    e
                ),
            }
        }
        Ok(sent)
    }
}

fn notify(delegate: &dyn ControllerDelegate, notification: impl FnOnce(&dyn ControllerDelegate)) {
    invoke_protected("controller delegate", notification, delegate);
}

fn source_address(data: &[u8]) -> MacAddress {
    let mut octets = [0u8; 6];
    if let Some(source) = data.get(6..12) {
        octets.copy_from_slice(source);
    }
    MacAddress::new(octets)
}
