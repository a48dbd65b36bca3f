//! AECP and ACMP command/response correlation
//!
//! Every local entity owns its own AECP and ACMP sequence counters. AECP
//! commands are limited to a configurable number in flight per target; the
//! rest wait in a FIFO queue and are sent as slots free up. Each AECP command
//! is retried once with the same sequence ID before it times out. ACMP
//! commands are never retried.

use std::collections::{HashMap, VecDeque};
use std::collections::hash_map::Entry;
use std::time::Duration;

use tokio::time::Instant;

use super::{Outbound, invoke_protected};
use crate::interface::InterfaceError;
use crate::protocol::defines::{AA_COMMAND_TIMEOUT, AEM_COMMAND_TIMEOUT, AcmpMessageType, AemAecpStatus};
use crate::protocol::{Acmpdu, Aecpdu, VuRegistry};
use crate::types::{MacAddress, UniqueIdentifier};

/// Completion handler of an AECP command
pub type AecpResultHandler = Box<dyn FnOnce(Result<Aecpdu, InterfaceError>) + Send>;

/// Completion handler of an ACMP command
pub type AcmpResultHandler = Box<dyn FnOnce(Result<Acmpdu, InterfaceError>) + Send>;

/// Counters surfaced by the correlation engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatistic {
    /// An AECP command was sent a second time
    AecpRetry {
        /// Command target
        entity_id: UniqueIdentifier,
    },
    /// An AECP command got no response after its retry
    AecpTimeout {
        /// Command target
        entity_id: UniqueIdentifier,
    },
    /// An AECP response matched no in-flight command
    AecpUnexpectedResponse {
        /// Responding entity
        entity_id: UniqueIdentifier,
    },
    /// Time between the last send of a command and its response
    AecpResponseTime {
        /// Command target
        entity_id: UniqueIdentifier,
        /// Round trip
        elapsed: Duration,
    },
    /// An ACMP command got no response
    AcmpTimeout {
        /// Talker or listener the command was addressed to
        entity_id: UniqueIdentifier,
    },
    /// An ACMP response matched no in-flight command
    AcmpUnexpectedResponse {
        /// Talker or listener that responded
        entity_id: UniqueIdentifier,
    },
}

struct AecpCommand {
    destination: MacAddress,
    command: Aecpdu,
    timeout: Duration,
    sent_at: Instant,
    deadline: Instant,
    retried: bool,
    handler: AecpResultHandler,
}

struct AcmpCommand {
    command: Acmpdu,
    deadline: Instant,
    handler: AcmpResultHandler,
}

#[derive(Default)]
struct LocalEntityCommands {
    next_aecp_sequence_id: u16,
    next_acmp_sequence_id: u16,
    inflight_aecp: HashMap<UniqueIdentifier, Vec<AecpCommand>>,
    queued_aecp: HashMap<UniqueIdentifier, VecDeque<AecpCommand>>,
    inflight_acmp: Vec<AcmpCommand>,
}

impl LocalEntityCommands {
    fn aecp_sequence_in_use(&self, sequence_id: u16) -> bool {
        self.inflight_aecp
            .values()
            .flatten()
            .chain(self.queued_aecp.values().flatten())
            .any(|pending| pending.command.sequence_id() == sequence_id)
    }

    fn allocate_aecp_sequence_id(&mut self) -> Option<u16> {
        for _ in 0..=u16::MAX {
            let candidate = self.next_aecp_sequence_id;
            self.next_aecp_sequence_id = candidate.wrapping_add(1);
            if !self.aecp_sequence_in_use(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn allocate_acmp_sequence_id(&mut self) -> Option<u16> {
        for _ in 0..=u16::MAX {
            let candidate = self.next_acmp_sequence_id;
            self.next_acmp_sequence_id = candidate.wrapping_add(1);
            if !self
                .inflight_acmp
                .iter()
                .any(|pending| pending.command.sequence_id == candidate)
            {
                return Some(candidate);
            }
        }
        None
    }

    fn pending_count(&self) -> usize {
        self.inflight_aecp.values().map(Vec::len).sum::<usize>()
            + self.queued_aecp.values().map(VecDeque::len).sum::<usize>()
            + self.inflight_acmp.len()
    }

    /// Move queued commands for `target` in flight while slots are free
    fn check_queue(
        &mut self,
        target: UniqueIdentifier,
        max_inflight: usize,
        now: Instant,
        out: &mut impl Outbound,
    ) {
        loop {
            let inflight = self.inflight_aecp.get(&target).map_or(0, Vec::len);
            if inflight >= max_inflight {
                break;
            }
            let Some(queue) = self.queued_aecp.get_mut(&target) else {
                break;
            };
            let Some(mut pending) = queue.pop_front() else {
                break;
            };
            if queue.is_empty() {
                self.queued_aecp.remove(&target);
            }

            match out.send_aecpdu(pending.destination, &pending.command) {
                Ok(()) => {
                    pending.sent_at = now;
                    pending.deadline = now + pending.timeout;
                    self.inflight_aecp.entry(target).or_default().push(pending);
                }
                Err(e) => {
                    tracing::debug!("Failed to send AECP command to {}: {}", target, e);
                    invoke_protected("AECP result handler", pending.handler, Err(e));
                }
            }
        }
    }
}

/// Command/response correlation for every local entity of an interface
pub struct CommandStateMachine {
    locals: HashMap<UniqueIdentifier, LocalEntityCommands>,
    max_inflight_aecp: usize,
    registry: VuRegistry,
    statistics: Vec<CommandStatistic>,
}

impl CommandStateMachine {
    /// Create a machine allowing `max_inflight_aecp` commands per target
    #[must_use]
    pub fn new(max_inflight_aecp: usize, registry: VuRegistry) -> Self {
        Self {
            locals: HashMap::new(),
            max_inflight_aecp: max_inflight_aecp.max(1),
            registry,
            statistics: Vec::new(),
        }
    }

    /// Start tracking commands sent by `entity_id`.
    ///
    /// # Errors
    ///
    /// Fails with [`InterfaceError::DuplicateLocalEntityId`] if the entity is
    /// already registered.
    pub fn register_local_entity(&mut self, entity_id: UniqueIdentifier) -> Result<(), InterfaceError> {
        match self.locals.entry(entity_id) {
            Entry::Occupied(_) => Err(InterfaceError::DuplicateLocalEntityId),
            Entry::Vacant(slot) => {
                slot.insert(LocalEntityCommands::default());
                Ok(())
            }
        }
    }

    /// Stop tracking `entity_id`, completing all its pending commands with
    /// [`InterfaceError::Aborted`]. Returns how many were aborted.
    pub fn unregister_local_entity(&mut self, entity_id: UniqueIdentifier) -> usize {
        let Some(local) = self.locals.remove(&entity_id) else {
            return 0;
        };
        let mut aborted = 0;
        for pending in local
            .inflight_aecp
            .into_values()
            .flatten()
            .chain(local.queued_aecp.into_values().flatten())
        {
            invoke_protected("AECP result handler", pending.handler, Err(InterfaceError::Aborted));
            aborted += 1;
        }
        for pending in local.inflight_acmp {
            invoke_protected("ACMP result handler", pending.handler, Err(InterfaceError::Aborted));
            aborted += 1;
        }
        if aborted > 0 {
            tracing::debug!("Aborted {} pending commands of {}", aborted, entity_id);
        }
        aborted
    }

    /// Unregister every local entity. Returns how many commands were aborted.
    pub fn clear(&mut self) -> usize {
        let ids: Vec<_> = self.locals.keys().copied().collect();
        ids.into_iter()
            .map(|id| self.unregister_local_entity(id))
            .sum()
    }

    /// Whether `entity_id` is a registered local entity
    #[must_use]
    pub fn is_local_entity(&self, entity_id: UniqueIdentifier) -> bool {
        self.locals.contains_key(&entity_id)
    }

    /// In-flight AECP commands from `local` to `target`
    #[must_use]
    pub fn inflight_aecp_count(&self, local: UniqueIdentifier, target: UniqueIdentifier) -> usize {
        self.locals
            .get(&local)
            .and_then(|l| l.inflight_aecp.get(&target))
            .map_or(0, Vec::len)
    }

    /// Queued AECP commands from `local` to `target`
    #[must_use]
    pub fn queued_aecp_count(&self, local: UniqueIdentifier, target: UniqueIdentifier) -> usize {
        self.locals
            .get(&local)
            .and_then(|l| l.queued_aecp.get(&target))
            .map_or(0, VecDeque::len)
    }

    /// Commands of any kind still waiting for a terminal notification
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.locals.values().map(LocalEntityCommands::pending_count).sum()
    }

    /// Drain the statistics gathered since the last call
    pub fn take_statistics(&mut self) -> Vec<CommandStatistic> {
        std::mem::take(&mut self.statistics)
    }

    /// Queue an AECP command from its controller entity.
    ///
    /// A sequence ID is assigned here. The handler is always called exactly
    /// once: with the response, or with the reason no response will come.
    pub fn send_aecp_command(
        &mut self,
        mut command: Aecpdu,
        destination: MacAddress,
        handler: AecpResultHandler,
        now: Instant,
        out: &mut impl Outbound,
    ) {
        let timeout = command_timeout(&self.registry, &command);
        let max_inflight = self.max_inflight_aecp;
        let Some(local) = self.locals.get_mut(&command.controller_entity_id()) else {
            invoke_protected("AECP result handler", handler, Err(InterfaceError::UnknownLocalEntity));
            return;
        };
        if !command.is_command() {
            invoke_protected("AECP result handler", handler, Err(InterfaceError::MessageNotSupported));
            return;
        }
        let Some(sequence_id) = local.allocate_aecp_sequence_id() else {
            invoke_protected(
                "AECP result handler",
                handler,
                Err(InterfaceError::InternalError("no free AECP sequence ID".to_string())),
            );
            return;
        };
        command.common_mut().sequence_id = sequence_id;

        let target = command.target_entity_id();
        tracing::trace!(
            "Queueing {} #{} for {}",
            command.message_type(),
            sequence_id,
            target
        );
        local.queued_aecp.entry(target).or_default().push_back(AecpCommand {
            destination,
            command,
            timeout,
            sent_at: now,
            deadline: now,
            retried: false,
            handler,
        });
        local.check_queue(target, max_inflight, now, out);
    }

    /// Send an ACMP command from its controller entity
    pub fn send_acmp_command(
        &mut self,
        mut command: Acmpdu,
        handler: AcmpResultHandler,
        now: Instant,
        out: &mut impl Outbound,
    ) {
        let Some(local) = self.locals.get_mut(&command.controller_entity_id) else {
            invoke_protected("ACMP result handler", handler, Err(InterfaceError::UnknownLocalEntity));
            return;
        };
        if !command.is_command() {
            invoke_protected("ACMP result handler", handler, Err(InterfaceError::MessageNotSupported));
            return;
        }
        let Some(sequence_id) = local.allocate_acmp_sequence_id() else {
            invoke_protected(
                "ACMP result handler",
                handler,
                Err(InterfaceError::InternalError("no free ACMP sequence ID".to_string())),
            );
            return;
        };
        command.sequence_id = sequence_id;

        match out.send_acmpdu(&command) {
            Ok(()) => {
                let deadline = now + command.message_type.timeout();
                local.inflight_acmp.push(AcmpCommand {
                    command,
                    deadline,
                    handler,
                });
            }
            Err(e) => invoke_protected("ACMP result handler", handler, Err(e)),
        }
    }

    /// Match an AECP response coming from `source`.
    ///
    /// Returns true if it completed (or re-armed) an in-flight command.
    /// Unsolicited responses are not handled here.
    pub fn handle_aecp_response(
        &mut self,
        response: &Aecpdu,
        source: MacAddress,
        now: Instant,
        out: &mut impl Outbound,
    ) -> bool {
        let target = response.target_entity_id();
        let sequence_id = response.sequence_id();
        let max_inflight = self.max_inflight_aecp;
        let Some(local) = self.locals.get_mut(&response.controller_entity_id()) else {
            return false;
        };

        let position = local.inflight_aecp.get(&target).and_then(|list| {
            list.iter().position(|pending| {
                pending.command.sequence_id() == sequence_id
                    && (pending.destination == source || pending.destination.is_multicast())
            })
        });
        let (Some(position), Some(list)) = (position, local.inflight_aecp.get_mut(&target)) else {
            tracing::debug!(
                "Unexpected {} #{} from {} ({})",
                response.message_type(),
                sequence_id,
                target,
                source
            );
            self.statistics
                .push(CommandStatistic::AecpUnexpectedResponse { entity_id: target });
            return false;
        };

        if let Aecpdu::Aem(aem) = response {
            if aem.status() == AemAecpStatus::IN_PROGRESS {
                let pending = &mut list[position];
                pending.deadline = now + pending.timeout;
                tracing::trace!("{} #{} in progress", target, sequence_id);
                return true;
            }
        }

        let pending = list.remove(position);
        if list.is_empty() {
            local.inflight_aecp.remove(&target);
        }

        let result = if is_expected_response(&self.registry, &pending.command, response) {
            self.statistics.push(CommandStatistic::AecpResponseTime {
                entity_id: target,
                elapsed: now.saturating_duration_since(pending.sent_at),
            });
            Ok(response.clone())
        } else {
            tracing::warn!(
                "{} answered #{} with a mismatched {}",
                target,
                sequence_id,
                response.message_type()
            );
            Err(InterfaceError::BaseProtocolViolation)
        };
        invoke_protected("AECP result handler", pending.handler, result);
        local.check_queue(target, max_inflight, now, out);
        true
    }

    /// Match an ACMP response. Returns true if it completed a command.
    pub fn handle_acmp_response(&mut self, response: &Acmpdu) -> bool {
        let Some(local) = self.locals.get_mut(&response.controller_entity_id) else {
            return false;
        };
        let Some(position) = local
            .inflight_acmp
            .iter()
            .position(|pending| pending.command.sequence_id == response.sequence_id)
        else {
            tracing::debug!(
                "Unexpected {} #{}",
                response.message_type,
                response.sequence_id
            );
            self.statistics.push(CommandStatistic::AcmpUnexpectedResponse {
                entity_id: acmp_target(response),
            });
            return false;
        };

        if local.inflight_acmp[position].command.message_type.response_type() != response.message_type {
            // Talker/listener exchange triggered by our command
            tracing::trace!("Ignoring {} #{}", response.message_type, response.sequence_id);
            return false;
        }

        let pending = local.inflight_acmp.swap_remove(position);
        invoke_protected("ACMP result handler", pending.handler, Ok(response.clone()));
        true
    }

    /// Retry or expire every command whose deadline has passed
    pub fn check_timeouts(&mut self, now: Instant, out: &mut impl Outbound) {
        let max_inflight = self.max_inflight_aecp;
        for local in self.locals.values_mut() {
            let targets: Vec<UniqueIdentifier> = local.inflight_aecp.keys().copied().collect();
            for target in targets {
                let Some(list) = local.inflight_aecp.get_mut(&target) else {
                    continue;
                };
                let mut expired = Vec::new();
                let mut index = 0;
                while index < list.len() {
                    if list[index].deadline > now {
                        index += 1;
                        continue;
                    }
                    let pending = &mut list[index];
                    if pending.retried {
                        self.statistics
                            .push(CommandStatistic::AecpTimeout { entity_id: target });
                        expired.push((list.remove(index), InterfaceError::Timeout));
                        continue;
                    }

                    pending.retried = true;
                    match out.send_aecpdu(pending.destination, &pending.command) {
                        Ok(()) => {
                            tracing::debug!(
                                "Retrying {} #{} to {}",
                                pending.command.message_type(),
                                pending.command.sequence_id(),
                                target
                            );
                            pending.sent_at = now;
                            pending.deadline = now + pending.timeout;
                            self.statistics
                                .push(CommandStatistic::AecpRetry { entity_id: target });
                            index += 1;
                        }
                        Err(e) => expired.push((list.remove(index), e)),
                    }
                }
                if list.is_empty() {
                    local.inflight_aecp.remove(&target);
                }
                for (pending, error) in expired {
                    invoke_protected("AECP result handler", pending.handler, Err(error));
                }
                local.check_queue(target, max_inflight, now, out);
            }

            let mut index = 0;
            while index < local.inflight_acmp.len() {
                if local.inflight_acmp[index].deadline > now {
                    index += 1;
                    continue;
                }
                let pending = local.inflight_acmp.swap_remove(index);
                self.statistics.push(CommandStatistic::AcmpTimeout {
                    entity_id: acmp_target(&pending.command),
                });
                invoke_protected("ACMP result handler", pending.handler, Err(InterfaceError::Timeout));
            }
        }
    }
}

fn command_timeout(registry: &VuRegistry, command: &Aecpdu) -> Duration {
    match command {
        Aecpdu::Aem(_) => AEM_COMMAND_TIMEOUT,
        Aecpdu::Aa(_) => AA_COMMAND_TIMEOUT,
        Aecpdu::Mvu(_) | Aecpdu::Vu(_) => command
            .vendor_protocol_id()
            .and_then(|id| registry.get(id))
            .map_or(AEM_COMMAND_TIMEOUT, |delegate| delegate.command_timeout()),
    }
}

/// Whether `response` is the kind of answer `command` calls for
fn is_expected_response(registry: &VuRegistry, command: &Aecpdu, response: &Aecpdu) -> bool {
    if response.message_type() != command.message_type().response_type() {
        return false;
    }
    match (command, response) {
        (Aecpdu::Aem(command), Aecpdu::Aem(response)) => command.command_type == response.command_type,
        (Aecpdu::Aa(_), Aecpdu::Aa(_)) => true,
        _ => match (command.vendor_protocol_id(), response.vendor_protocol_id()) {
            (Some(expected), Some(actual)) if expected == actual => registry
                .get(expected)
                .is_none_or(|delegate| delegate.is_expected_response(command, response)),
            _ => false,
        },
    }
}

/// Entity an ACMP message is addressed to
fn acmp_target(pdu: &Acmpdu) -> UniqueIdentifier {
    let command_type = AcmpMessageType::from(pdu.message_type.value() & !1);
    if matches!(
        command_type,
        AcmpMessageType::CONNECT_RX_COMMAND
            | AcmpMessageType::DISCONNECT_RX_COMMAND
            | AcmpMessageType::GET_RX_STATE_COMMAND
    ) {
        pdu.listener_entity_id
    } else {
        pdu.talker_entity_id
    }
}
