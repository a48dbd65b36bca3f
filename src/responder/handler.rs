//! Built-in AEM responder

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::dispatcher::AemCommandDispatcher;
use crate::entity::Entity;
use crate::error::Result;
use crate::model::{Descriptor, EntityDescriptor, EntityTree, MilanInfo};
use crate::protocol::defines::{
    AaAecpStatus, AemAecpStatus, AemCommandType, DescriptorType, MvuAecpStatus, MvuCommandType,
};
use crate::protocol::payloads::{aem, descriptors, mvu};
use crate::protocol::{AemAecpdu, Aecpdu, MvuAecpdu, PduError, Serializer};
use crate::types::{MacAddress, UniqueIdentifier};

/// Status plus payload; `None` reflects the command payload
type Outcome = (AemAecpStatus, Option<Vec<u8>>);

fn reflect(status: AemAecpStatus) -> Outcome {
    (status, None)
}

fn answer<const N: usize>(payload: std::result::Result<Serializer<N>, PduError>) -> Outcome {
    match payload {
        Ok(ser) => (AemAecpStatus::SUCCESS, Some(ser.data().to_vec())),
        Err(e) => {
            tracing::warn!("Could not build AEM response: {}", e);
            reflect(AemAecpStatus::ENTITY_MISBEHAVING)
        }
    }
}

/// A controller registered for unsolicited notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsolicitedSubscriber {
    /// Registered controller
    pub controller_entity_id: UniqueIdentifier,
    /// Address notifications are sent to
    pub mac_address: MacAddress,
}

/// Answers AECP commands addressed to a local entity.
///
/// Enumeration commands are served from the [`EntityTree`]; everything else
/// is forwarded to the optional [`AemCommandDispatcher`].
pub struct AemHandler {
    tree: Option<EntityTree>,
    milan_info: Option<MilanInfo>,
    dispatcher: Option<Arc<dyn AemCommandDispatcher>>,
    subscribers: Vec<UnsolicitedSubscriber>,
}

impl AemHandler {
    /// Create a handler, validating `tree` when one is given.
    ///
    /// # Errors
    ///
    /// [`AvdeccError::InvalidEntityModel`](crate::AvdeccError::InvalidEntityModel)
    /// when the tree fails validation.
    pub fn new(tree: Option<EntityTree>) -> Result<Self> {
        if let Some(tree) = &tree {
            tree.validate()?;
        }
        Ok(Self {
            tree,
            milan_info: None,
            dispatcher: None,
            subscribers: Vec::new(),
        })
    }

    /// Forward uncovered commands to `dispatcher`
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn AemCommandDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Answer GET_MILAN_INFO with `info`
    #[must_use]
    pub fn with_milan_info(mut self, info: MilanInfo) -> Self {
        self.milan_info = Some(info);
        self
    }

    /// Entity model, if any
    #[must_use]
    pub fn tree(&self) -> Option<&EntityTree> {
        self.tree.as_ref()
    }

    /// Controllers registered for unsolicited notifications
    #[must_use]
    pub fn subscribers(&self) -> &[UnsolicitedSubscriber] {
        &self.subscribers
    }

    /// Build the response to `command`, received from `source`.
    ///
    /// Returns `None` when `command` is not a command.
    pub fn handle(
        &mut self,
        entity: &Entity,
        command: &Aecpdu,
        source: MacAddress,
    ) -> Option<Aecpdu> {
        let mut response = command.response_copy()?;
        match (command, &mut response) {
            (Aecpdu::Aem(command), Aecpdu::Aem(response)) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    self.handle_aem(entity, command, source)
                }));
                let (status, payload) = outcome.unwrap_or_else(|_| {
                    tracing::error!(
                        "AEM handler panicked answering {} for {}",
                        command.command_type,
                        entity.entity_id()
                    );
                    reflect(AemAecpStatus::ENTITY_MISBEHAVING)
                });
                response.set_status(status);
                if let Some(payload) = payload {
                    if let Err(e) = response.set_payload(&payload) {
                        tracing::warn!("AEM response payload rejected: {}", e);
                        response.set_status(AemAecpStatus::ENTITY_MISBEHAVING);
                    }
                }
            }
            (Aecpdu::Mvu(command), Aecpdu::Mvu(response)) => {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| self.handle_mvu(command, response)));
                if outcome.is_err() {
                    tracing::error!(
                        "MVU handler panicked answering {} for {}",
                        command.command_type,
                        entity.entity_id()
                    );
                    response.set_status(MvuAecpStatus::ENTITY_MISBEHAVING);
                }
            }
            (_, Aecpdu::Aa(response)) => response.set_status(AaAecpStatus::NOT_IMPLEMENTED),
            (_, other) => other.common_mut().status = AemAecpStatus::NOT_IMPLEMENTED.value(),
        }
        Some(response)
    }

    fn handle_aem(&mut self, entity: &Entity, command: &AemAecpdu, source: MacAddress) -> Outcome {
        let payload = command.payload();
        tracing::trace!(
            "{} received {} from {}",
            entity.entity_id(),
            command.command_type,
            command.common.controller_entity_id
        );
        let handled = match command.command_type {
            AemCommandType::ENTITY_AVAILABLE | AemCommandType::CONTROLLER_AVAILABLE => {
                Some(reflect(AemAecpStatus::SUCCESS))
            }
            AemCommandType::REGISTER_UNSOLICITED_NOTIFICATION => {
                self.register(command.common.controller_entity_id, source);
                Some(reflect(AemAecpStatus::SUCCESS))
            }
            AemCommandType::DEREGISTER_UNSOLICITED_NOTIFICATION => {
                let controller = command.common.controller_entity_id;
                self.subscribers
                    .retain(|s| s.controller_entity_id != controller);
                Some(reflect(AemAecpStatus::SUCCESS))
            }
            AemCommandType::READ_DESCRIPTOR => {
                self.tree.as_ref().map(|tree| read_descriptor(tree, entity, payload))
            }
            AemCommandType::GET_CONFIGURATION => self
                .tree
                .as_ref()
                .map(|tree| answer(aem::serialize_configuration(tree.current_configuration))),
            AemCommandType::GET_NAME => self.tree.as_ref().map(|tree| get_name(tree, payload)),
            AemCommandType::GET_STREAM_FORMAT => {
                self.tree.as_ref().map(|tree| get_stream_format(tree, payload))
            }
            AemCommandType::GET_SAMPLING_RATE => {
                self.tree.as_ref().map(|tree| get_sampling_rate(tree, payload))
            }
            AemCommandType::GET_CLOCK_SOURCE => {
                self.tree.as_ref().map(|tree| get_clock_source(tree, payload))
            }
            _ => None,
        };
        handled.unwrap_or_else(|| self.dispatch(entity, command))
    }

    fn dispatch(&self, entity: &Entity, command: &AemAecpdu) -> Outcome {
        self.dispatcher
            .as_ref()
            .and_then(|dispatcher| dispatcher.handle_aem_command(entity, command))
            .map_or_else(
                || reflect(AemAecpStatus::NOT_IMPLEMENTED),
                |response| (response.status, response.payload),
            )
    }

    fn register(&mut self, controller_entity_id: UniqueIdentifier, mac_address: MacAddress) {
        let subscriber = UnsolicitedSubscriber {
            controller_entity_id,
            mac_address,
        };
        match self
            .subscribers
            .iter_mut()
            .find(|s| s.controller_entity_id == controller_entity_id)
        {
            Some(existing) => *existing = subscriber,
            None => self.subscribers.push(subscriber),
        }
    }

    fn handle_mvu(&self, command: &MvuAecpdu, response: &mut MvuAecpdu) {
        let info = match (command.command_type, &self.milan_info) {
            (MvuCommandType::GET_MILAN_INFO, Some(info)) => info,
            _ => {
                response.set_status(MvuAecpStatus::NOT_IMPLEMENTED);
                return;
            }
        };
        if mvu::deserialize_get_milan_info_command(command.payload()).is_err() {
            response.set_status(MvuAecpStatus::BAD_ARGUMENTS);
            return;
        }
        let written = mvu::serialize_get_milan_info_response(info)
            .and_then(|ser| response.set_payload(ser.data()));
        response.set_status(milan_info_status(written));
    }
}

pub(super) fn milan_info_status(written: std::result::Result<(), PduError>) -> MvuAecpStatus {
    match written {
        Ok(()) => MvuAecpStatus::SUCCESS,
        Err(e) => {
            tracing::warn!("Could not build GET_MILAN_INFO response: {}", e);
            MvuAecpStatus::ENTITY_MISBEHAVING
        }
    }
}

/// ENTITY descriptor from the live entity and the tree
fn entity_descriptor(tree: &EntityTree, entity: &Entity) -> EntityDescriptor {
    let common = entity.common();
    EntityDescriptor {
        entity_id: common.entity_id,
        entity_model_id: common.entity_model_id,
        entity_capabilities: common.entity_capabilities,
        talker_stream_sources: common.talker_stream_sources,
        talker_capabilities: common.talker_capabilities,
        listener_stream_sinks: common.listener_stream_sinks,
        listener_capabilities: common.listener_capabilities,
        controller_capabilities: common.controller_capabilities,
        available_index: entity.available_index(),
        association_id: common.association_id.unwrap_or(UniqueIdentifier::NULL),
        entity_name: tree.entity_name,
        vendor_name_string: tree.vendor_name_string,
        model_name_string: tree.model_name_string,
        firmware_version: tree.firmware_version,
        group_name: tree.group_name,
        serial_number: tree.serial_number,
        configurations_count: tree.configurations_count(),
        current_configuration: tree.current_configuration,
    }
}

fn read_descriptor(tree: &EntityTree, entity: &Entity, payload: &[u8]) -> Outcome {
    let Ok((configuration_index, descriptor_type, descriptor_index)) =
        descriptors::deserialize_read_descriptor_command(payload)
    else {
        return reflect(AemAecpStatus::BAD_ARGUMENTS);
    };
    let descriptor = if descriptor_type == DescriptorType::ENTITY {
        if configuration_index != 0 || descriptor_index != 0 {
            return reflect(AemAecpStatus::BAD_ARGUMENTS);
        }
        Some(Descriptor::Entity(entity_descriptor(tree, entity)))
    } else {
        tree.descriptor(configuration_index, descriptor_type, descriptor_index)
    };
    match descriptor {
        Some(descriptor) => answer(descriptors::serialize_read_descriptor_response(
            configuration_index,
            descriptor_index,
            &descriptor,
        )),
        None => reflect(AemAecpStatus::NO_SUCH_DESCRIPTOR),
    }
}

fn get_name(tree: &EntityTree, payload: &[u8]) -> Outcome {
    let Ok((descriptor_type, descriptor_index, name_index, configuration_index)) =
        aem::deserialize_get_name_command(payload)
    else {
        return reflect(AemAecpStatus::BAD_ARGUMENTS);
    };
    let name = if descriptor_type == DescriptorType::ENTITY {
        if descriptor_index != 0 {
            return reflect(AemAecpStatus::NO_SUCH_DESCRIPTOR);
        }
        match name_index {
            0 => tree.entity_name,
            1 => tree.group_name,
            _ => return reflect(AemAecpStatus::BAD_ARGUMENTS),
        }
    } else {
        let Some(descriptor) = tree.descriptor(configuration_index, descriptor_type, descriptor_index)
        else {
            return reflect(AemAecpStatus::NO_SUCH_DESCRIPTOR);
        };
        match (name_index, descriptor.object_name()) {
            (0, Some(name)) => *name,
            _ => return reflect(AemAecpStatus::BAD_ARGUMENTS),
        }
    };
    answer(aem::serialize_name(
        descriptor_type,
        descriptor_index,
        name_index,
        configuration_index,
        &name,
    ))
}

fn get_stream_format(tree: &EntityTree, payload: &[u8]) -> Outcome {
    let Ok((descriptor_type, descriptor_index)) = aem::deserialize_descriptor_reference(payload)
    else {
        return reflect(AemAecpStatus::BAD_ARGUMENTS);
    };
    match tree.descriptor(tree.current_configuration, descriptor_type, descriptor_index) {
        Some(Descriptor::StreamInput(stream) | Descriptor::StreamOutput(stream)) => answer(
            aem::serialize_stream_format(descriptor_type, descriptor_index, stream.current_format),
        ),
        Some(_) => reflect(AemAecpStatus::BAD_ARGUMENTS),
        None => reflect(AemAecpStatus::NO_SUCH_DESCRIPTOR),
    }
}

fn get_sampling_rate(tree: &EntityTree, payload: &[u8]) -> Outcome {
    let Ok((descriptor_type, descriptor_index)) = aem::deserialize_descriptor_reference(payload)
    else {
        return reflect(AemAecpStatus::BAD_ARGUMENTS);
    };
    match tree.descriptor(tree.current_configuration, descriptor_type, descriptor_index) {
        Some(Descriptor::AudioUnit(unit)) => answer(aem::serialize_sampling_rate(
            descriptor_type,
            descriptor_index,
            unit.current_sampling_rate,
        )),
        Some(_) => reflect(AemAecpStatus::BAD_ARGUMENTS),
        None => reflect(AemAecpStatus::NO_SUCH_DESCRIPTOR),
    }
}

fn get_clock_source(tree: &EntityTree, payload: &[u8]) -> Outcome {
    let Ok((descriptor_type, descriptor_index)) = aem::deserialize_descriptor_reference(payload)
    else {
        return reflect(AemAecpStatus::BAD_ARGUMENTS);
    };
    match tree.descriptor(tree.current_configuration, descriptor_type, descriptor_index) {
        Some(Descriptor::ClockDomain(domain)) => answer(aem::serialize_clock_source(
            descriptor_type,
            descriptor_index,
            domain.clock_source_index,
        )),
        Some(_) => reflect(AemAecpStatus::BAD_ARGUMENTS),
        None => reflect(AemAecpStatus::NO_SUCH_DESCRIPTOR),
    }
}
