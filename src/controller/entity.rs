//! Typed controller commands
//!
//! Every operation takes a completion closure that is invoked exactly once
//! on the interface executor, with a status and, where the command returns
//! data, the decoded value. The value is `None` when the command failed
//! before a response could be decoded.

use super::StreamConnectionState;
use super::status::{AaCommandStatus, AemCommandStatus, ControlStatus, MvuCommandStatus};
use crate::entity::{Entity, StreamIdentification};
use crate::error::Result;
use crate::interface::{InterfaceError, LocalEntityHandle};
use crate::model::{
    AsPath, AudioMapping, AvbInfo, ClockSourceIndex, ConfigurationIndex, Descriptor,
    DescriptorCounters, DescriptorIndex, EntityDescriptor, MapIndex, MemoryObjectOperationType,
    MilanInfo, OperationId, SamplingRate, StreamFormat, StreamInfo,
};
use crate::protocol::defines::{
    AcmpMessageType, AcquireFlags, AemCommandType, DescriptorType, LockFlags, MvuCommandType,
};
use crate::protocol::payloads::aem::{self, AudioMapResponse};
use crate::protocol::payloads::{descriptors, mvu};
use crate::protocol::{AaAecpdu, Acmpdu, AemAecpdu, Aecpdu, MvuAecpdu, PduError, Serializer, Tlv};
use crate::state_machine::invoke_protected;
use crate::types::{AvdeccFixedString, MacAddress, UniqueIdentifier};

fn bytes<const N: usize>(
    ser: std::result::Result<Serializer<N>, PduError>,
) -> std::result::Result<Vec<u8>, PduError> {
    ser.map(|ser| ser.data().to_vec())
}

fn no_payload() -> std::result::Result<Vec<u8>, PduError> {
    Ok(Vec::new())
}

fn reference(
    descriptor_type: DescriptorType,
    descriptor_index: DescriptorIndex,
) -> std::result::Result<Vec<u8>, PduError> {
    bytes(aem::serialize_descriptor_reference(
        descriptor_type,
        descriptor_index,
    ))
}

/// Typed read of one descriptor kind, narrowing [`Descriptor`] to `$ty`
macro_rules! descriptor_reads {
    ($( $(#[$meta:meta])* $method:ident => $dt:ident, $variant:ident($ty:ty); )*) => {
        $(
            $(#[$meta])*
            pub fn $method(
                &self,
                target: UniqueIdentifier,
                configuration_index: ConfigurationIndex,
                descriptor_index: DescriptorIndex,
                handler: impl FnOnce(AemCommandStatus, Option<$ty>) + Send + 'static,
            ) {
                self.read_descriptor(
                    target,
                    configuration_index,
                    DescriptorType::$dt,
                    descriptor_index,
                    move |status, descriptor| match descriptor {
                        Some(Descriptor::$variant(descriptor)) => handler(status, Some(descriptor)),
                        Some(_) => handler(AemCommandStatus::PROTOCOL_ERROR, None),
                        None => handler(status, None),
                    },
                );
            }
        )*
    };
}

/// GET_NAME/SET_NAME pair for the object name of a descriptor kind
macro_rules! object_names {
    ($( $get:ident, $set:ident => $dt:ident, $what:literal; )*) => {
        $(
            #[doc = concat!("Get the name of ", $what)]
            pub fn $get(
                &self,
                target: UniqueIdentifier,
                configuration_index: ConfigurationIndex,
                descriptor_index: DescriptorIndex,
                handler: impl FnOnce(AemCommandStatus, Option<AvdeccFixedString>) + Send + 'static,
            ) {
                self.get_name(
                    target,
                    DescriptorType::$dt,
                    descriptor_index,
                    0,
                    configuration_index,
                    handler,
                );
            }

            #[doc = concat!("Set the name of ", $what)]
            pub fn $set(
                &self,
                target: UniqueIdentifier,
                configuration_index: ConfigurationIndex,
                descriptor_index: DescriptorIndex,
                name: &AvdeccFixedString,
                handler: impl FnOnce(AemCommandStatus) + Send + 'static,
            ) {
                self.set_name(
                    target,
                    DescriptorType::$dt,
                    descriptor_index,
                    0,
                    configuration_index,
                    name,
                    handler,
                );
            }
        )*
    };
}

/// Local entity acting as an AVDECC controller.
///
/// Created with
/// [`ProtocolInterface::create_controller_entity`](crate::ProtocolInterface::create_controller_entity).
/// Dropping it sends ENTITY_DEPARTING when advertising and completes every
/// pending command with [`AemCommandStatus::ABORTED`].
pub struct ControllerEntity {
    handle: LocalEntityHandle,
}

impl ControllerEntity {
    pub(crate) fn new(handle: LocalEntityHandle) -> Self {
        Self { handle }
    }

    /// Entity ID of this controller
    #[must_use]
    pub fn entity_id(&self) -> UniqueIdentifier {
        self.handle.entity_id()
    }

    /// Link address the controller sends from
    #[must_use]
    pub fn mac_address(&self) -> MacAddress {
        self.handle.mac_address()
    }

    /// Start advertising this controller.
    ///
    /// # Errors
    ///
    /// [`InterfaceError::DuplicateLocalEntityId`] if the entity ID was
    /// already discovered on the link.
    pub async fn enable_entity_advertising(&self) -> Result<()> {
        self.handle.enable_advertising().await
    }

    /// Send ENTITY_DEPARTING and stop advertising
    ///
    /// # Errors
    ///
    /// [`InterfaceError::InterfaceNotRunning`] after shutdown.
    pub async fn disable_entity_advertising(&self) -> Result<()> {
        self.handle.disable_advertising().await
    }

    /// Replace the advertised information; a changed advertisement goes out
    /// on the next tick.
    ///
    /// # Errors
    ///
    /// [`AvdeccError::InvalidParameter`](crate::AvdeccError::InvalidParameter)
    /// if `entity` carries another entity ID.
    pub async fn update_entity(&self, entity: Entity) -> Result<()> {
        self.handle.update_entity(entity).await
    }

    /// Current local entity information
    ///
    /// # Errors
    ///
    /// [`InterfaceError::InterfaceNotRunning`] after shutdown.
    pub async fn entity(&self) -> Result<Option<Entity>> {
        self.handle.entity().await
    }

    /// Tear down, returning the number of commands aborted
    pub async fn shutdown(self) -> usize {
        self.handle.shutdown().await
    }

    /// Send a prebuilt AECP command.
    ///
    /// `destination` overrides the address resolved from discovery.
    pub fn send_aecp_command(
        &self,
        command: Aecpdu,
        destination: Option<MacAddress>,
        handler: impl FnOnce(std::result::Result<Aecpdu, InterfaceError>) + Send + 'static,
    ) {
        self.handle.send_aecp(command, destination, Box::new(handler));
    }

    /// Send a prebuilt ACMP command
    pub fn send_acmp_command(
        &self,
        command: Acmpdu,
        handler: impl FnOnce(std::result::Result<Acmpdu, InterfaceError>) + Send + 'static,
    ) {
        self.handle.send_acmp(command, Box::new(handler));
    }

    fn send_aem<T, D, H>(
        &self,
        target: UniqueIdentifier,
        command_type: AemCommandType,
        payload: std::result::Result<Vec<u8>, PduError>,
        decode: D,
        handler: H,
    ) where
        T: 'static,
        D: FnOnce(&AemAecpdu) -> std::result::Result<T, PduError> + Send + 'static,
        H: FnOnce(AemCommandStatus, Option<T>) + Send + 'static,
    {
        let command = payload.and_then(|payload| {
            AemAecpdu::command(target, self.entity_id(), command_type, &payload)
        });
        let command = match command {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("Cannot build {} for {}: {}", command_type, target, e);
                invoke_protected(
                    "AEM result handler",
                    |status| handler(status, None),
                    AemCommandStatus::PROTOCOL_ERROR,
                );
                return;
            }
        };

        self.handle.send_aecp(
            Aecpdu::Aem(command),
            None,
            Box::new(move |result| {
                let (status, value) = match result {
                    Ok(Aecpdu::Aem(response)) => {
                        let status = AemCommandStatus::from(response.status());
                        match decode(&response) {
                            Ok(value) => (status, Some(value)),
                            Err(e) if status.is_success() => {
                                tracing::debug!(
                                    "Undecodable {} response from {}: {}",
                                    command_type,
                                    target,
                                    e
                                );
                                (AemCommandStatus::PROTOCOL_ERROR, None)
                            }
                            Err(_) => (status, None),
                        }
                    }
                    Ok(_) => (AemCommandStatus::BASE_PROTOCOL_VIOLATION, None),
                    Err(e) => (AemCommandStatus::from(e), None),
                };
                handler(status, value);
            }),
        );
    }

    fn send_aem_status(
        &self,
        target: UniqueIdentifier,
        command_type: AemCommandType,
        payload: std::result::Result<Vec<u8>, PduError>,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem(
            target,
            command_type,
            payload,
            |_| Ok(()),
            move |status, _: Option<()>| handler(status),
        );
    }

    // Entity ownership

    /// Acquire `target` (or one of its descriptors); the handler receives
    /// the current owner
    pub fn acquire_entity(
        &self,
        target: UniqueIdentifier,
        persistent: bool,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        let flags = if persistent {
            AcquireFlags::PERSISTENT
        } else {
            AcquireFlags::NONE
        };
        self.acquire(target, flags, descriptor_type, descriptor_index, handler);
    }

    /// Release an acquired entity
    pub fn release_entity(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        self.acquire(
            target,
            AcquireFlags::RELEASE,
            descriptor_type,
            descriptor_index,
            handler,
        );
    }

    fn acquire(
        &self,
        target: UniqueIdentifier,
        flags: AcquireFlags,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        let payload = bytes(aem::serialize_acquire_entity(
            flags,
            UniqueIdentifier::NULL,
            descriptor_type,
            descriptor_index,
        ));
        self.send_aem(
            target,
            AemCommandType::ACQUIRE_ENTITY,
            payload,
            |response| aem::deserialize_acquire_entity(response.payload()).map(|r| r.1),
            handler,
        );
    }

    /// Lock `target`; the handler receives the locking controller
    pub fn lock_entity(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        self.lock(
            target,
            LockFlags::NONE,
            descriptor_type,
            descriptor_index,
            handler,
        );
    }

    /// Unlock a locked entity
    pub fn unlock_entity(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        self.lock(
            target,
            LockFlags::UNLOCK,
            descriptor_type,
            descriptor_index,
            handler,
        );
    }

    fn lock(
        &self,
        target: UniqueIdentifier,
        flags: LockFlags,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        let payload = bytes(aem::serialize_lock_entity(
            flags,
            UniqueIdentifier::NULL,
            descriptor_type,
            descriptor_index,
        ));
        self.send_aem(
            target,
            AemCommandType::LOCK_ENTITY,
            payload,
            |response| aem::deserialize_lock_entity(response.payload()).map(|r| r.1),
            handler,
        );
    }

    /// Ask whether `target` is available
    pub fn query_entity_available(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(target, AemCommandType::ENTITY_AVAILABLE, no_payload(), handler);
    }

    /// Ask whether the controller `target` is available
    pub fn query_controller_available(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::CONTROLLER_AVAILABLE,
            no_payload(),
            handler,
        );
    }

    /// Subscribe to unsolicited notifications from `target`
    pub fn register_unsolicited_notifications(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::REGISTER_UNSOLICITED_NOTIFICATION,
            no_payload(),
            handler,
        );
    }

    /// Cancel the subscription to `target`
    pub fn unregister_unsolicited_notifications(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::DEREGISTER_UNSOLICITED_NOTIFICATION,
            no_payload(),
            handler,
        );
    }

    // Descriptors

    /// Read any descriptor.
    ///
    /// A response carrying another descriptor than the one requested
    /// completes with [`AemCommandStatus::PROTOCOL_ERROR`].
    pub fn read_descriptor(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<Descriptor>) + Send + 'static,
    ) {
        let payload = bytes(descriptors::serialize_read_descriptor_command(
            configuration_index,
            descriptor_type,
            descriptor_index,
        ));
        self.send_aem(
            target,
            AemCommandType::READ_DESCRIPTOR,
            payload,
            |response| {
                descriptors::deserialize_read_descriptor_response(
                    response.payload(),
                    response.status(),
                )
            },
            move |status, response| {
                let descriptor = response.and_then(|r| r.descriptor);
                match descriptor {
                    Some(d) if d.descriptor_type() != descriptor_type => {
                        handler(AemCommandStatus::PROTOCOL_ERROR, None);
                    }
                    descriptor => handler(status, descriptor),
                }
            },
        );
    }

    /// Read the ENTITY descriptor of `target`
    pub fn read_entity_descriptor(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus, Option<EntityDescriptor>) + Send + 'static,
    ) {
        self.read_descriptor(
            target,
            0,
            DescriptorType::ENTITY,
            0,
            move |status, descriptor| match descriptor {
                Some(Descriptor::Entity(descriptor)) => handler(status, Some(descriptor)),
                Some(_) => handler(AemCommandStatus::PROTOCOL_ERROR, None),
                None => handler(status, None),
            },
        );
    }

    descriptor_reads! {
        /// Read a CONFIGURATION descriptor
        read_configuration_descriptor => CONFIGURATION, Configuration(crate::model::ConfigurationDescriptor);
        /// Read an AUDIO_UNIT descriptor
        read_audio_unit_descriptor => AUDIO_UNIT, AudioUnit(crate::model::AudioUnitDescriptor);
        /// Read a STREAM_INPUT descriptor
        read_stream_input_descriptor => STREAM_INPUT, StreamInput(crate::model::StreamDescriptor);
        /// Read a STREAM_OUTPUT descriptor
        read_stream_output_descriptor => STREAM_OUTPUT, StreamOutput(crate::model::StreamDescriptor);
        /// Read a JACK_INPUT descriptor
        read_jack_input_descriptor => JACK_INPUT, JackInput(crate::model::JackDescriptor);
        /// Read a JACK_OUTPUT descriptor
        read_jack_output_descriptor => JACK_OUTPUT, JackOutput(crate::model::JackDescriptor);
        /// Read an AVB_INTERFACE descriptor
        read_avb_interface_descriptor => AVB_INTERFACE, AvbInterface(crate::model::AvbInterfaceDescriptor);
        /// Read a CLOCK_SOURCE descriptor
        read_clock_source_descriptor => CLOCK_SOURCE, ClockSource(crate::model::ClockSourceDescriptor);
        /// Read a MEMORY_OBJECT descriptor
        read_memory_object_descriptor => MEMORY_OBJECT, MemoryObject(crate::model::MemoryObjectDescriptor);
        /// Read a LOCALE descriptor
        read_locale_descriptor => LOCALE, Locale(crate::model::LocaleDescriptor);
        /// Read a STRINGS descriptor
        read_strings_descriptor => STRINGS, Strings(crate::model::StringsDescriptor);
        /// Read a STREAM_PORT_INPUT descriptor
        read_stream_port_input_descriptor => STREAM_PORT_INPUT, StreamPortInput(crate::model::StreamPortDescriptor);
        /// Read a STREAM_PORT_OUTPUT descriptor
        read_stream_port_output_descriptor => STREAM_PORT_OUTPUT, StreamPortOutput(crate::model::StreamPortDescriptor);
        /// Read an AUDIO_CLUSTER descriptor
        read_audio_cluster_descriptor => AUDIO_CLUSTER, AudioCluster(crate::model::AudioClusterDescriptor);
        /// Read an AUDIO_MAP descriptor
        read_audio_map_descriptor => AUDIO_MAP, AudioMap(crate::model::AudioMapDescriptor);
        /// Read a CLOCK_DOMAIN descriptor
        read_clock_domain_descriptor => CLOCK_DOMAIN, ClockDomain(crate::model::ClockDomainDescriptor);
    }

    // Configuration

    /// Switch `target` to another configuration
    pub fn set_configuration(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        handler: impl FnOnce(AemCommandStatus, Option<ConfigurationIndex>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_CONFIGURATION,
            bytes(aem::serialize_configuration(configuration_index)),
            |response| aem::deserialize_configuration(response.payload()),
            handler,
        );
    }

    /// Current configuration of `target`
    pub fn get_configuration(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus, Option<ConfigurationIndex>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_CONFIGURATION,
            no_payload(),
            |response| aem::deserialize_configuration(response.payload()),
            handler,
        );
    }

    // Streams

    /// Set the format of a stream input
    pub fn set_stream_input_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        format: StreamFormat,
        handler: impl FnOnce(AemCommandStatus, Option<StreamFormat>) + Send + 'static,
    ) {
        self.set_stream_format(target, DescriptorType::STREAM_INPUT, stream_index, format, handler);
    }

    /// Set the format of a stream output
    pub fn set_stream_output_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        format: StreamFormat,
        handler: impl FnOnce(AemCommandStatus, Option<StreamFormat>) + Send + 'static,
    ) {
        self.set_stream_format(target, DescriptorType::STREAM_OUTPUT, stream_index, format, handler);
    }

    fn set_stream_format(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        stream_index: DescriptorIndex,
        format: StreamFormat,
        handler: impl FnOnce(AemCommandStatus, Option<StreamFormat>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_STREAM_FORMAT,
            bytes(aem::serialize_stream_format(descriptor_type, stream_index, format)),
            |response| aem::deserialize_stream_format(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Format of a stream input
    pub fn get_stream_input_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<StreamFormat>) + Send + 'static,
    ) {
        self.get_stream_format(target, DescriptorType::STREAM_INPUT, stream_index, handler);
    }

    /// Format of a stream output
    pub fn get_stream_output_format(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<StreamFormat>) + Send + 'static,
    ) {
        self.get_stream_format(target, DescriptorType::STREAM_OUTPUT, stream_index, handler);
    }

    fn get_stream_format(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<StreamFormat>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_STREAM_FORMAT,
            reference(descriptor_type, stream_index),
            |response| aem::deserialize_stream_format(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Stream info of a stream input
    pub fn get_stream_input_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<StreamInfo>) + Send + 'static,
    ) {
        self.get_stream_info(target, DescriptorType::STREAM_INPUT, stream_index, handler);
    }

    /// Stream info of a stream output
    pub fn get_stream_output_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<StreamInfo>) + Send + 'static,
    ) {
        self.get_stream_info(target, DescriptorType::STREAM_OUTPUT, stream_index, handler);
    }

    fn get_stream_info(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<StreamInfo>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_STREAM_INFO,
            reference(descriptor_type, stream_index),
            |response| aem::deserialize_stream_info(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Change the stream info of a stream input
    pub fn set_stream_input_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        info: &StreamInfo,
        handler: impl FnOnce(AemCommandStatus, Option<StreamInfo>) + Send + 'static,
    ) {
        self.set_stream_info(target, DescriptorType::STREAM_INPUT, stream_index, info, handler);
    }

    /// Change the stream info of a stream output
    pub fn set_stream_output_info(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        info: &StreamInfo,
        handler: impl FnOnce(AemCommandStatus, Option<StreamInfo>) + Send + 'static,
    ) {
        self.set_stream_info(target, DescriptorType::STREAM_OUTPUT, stream_index, info, handler);
    }

    fn set_stream_info(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        stream_index: DescriptorIndex,
        info: &StreamInfo,
        handler: impl FnOnce(AemCommandStatus, Option<StreamInfo>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_STREAM_INFO,
            bytes(aem::serialize_stream_info(descriptor_type, stream_index, info)),
            |response| aem::deserialize_stream_info(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Start a stream input
    pub fn start_stream_input(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::START_STREAMING,
            reference(DescriptorType::STREAM_INPUT, stream_index),
            handler,
        );
    }

    /// Start a stream output
    pub fn start_stream_output(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::START_STREAMING,
            reference(DescriptorType::STREAM_OUTPUT, stream_index),
            handler,
        );
    }

    /// Stop a stream input
    pub fn stop_stream_input(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::STOP_STREAMING,
            reference(DescriptorType::STREAM_INPUT, stream_index),
            handler,
        );
    }

    /// Stop a stream output
    pub fn stop_stream_output(
        &self,
        target: UniqueIdentifier,
        stream_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::STOP_STREAMING,
            reference(DescriptorType::STREAM_OUTPUT, stream_index),
            handler,
        );
    }

    // Names

    /// GET_NAME for any descriptor
    pub fn get_name(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        name_index: u16,
        configuration_index: ConfigurationIndex,
        handler: impl FnOnce(AemCommandStatus, Option<AvdeccFixedString>) + Send + 'static,
    ) {
        let payload = bytes(aem::serialize_get_name_command(
            descriptor_type,
            descriptor_index,
            name_index,
            configuration_index,
        ));
        self.send_aem(
            target,
            AemCommandType::GET_NAME,
            payload,
            |response| aem::deserialize_name(response.payload()).map(|r| r.4),
            handler,
        );
    }

    /// SET_NAME for any descriptor
    #[allow(clippy::too_many_arguments)]
    pub fn set_name(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        name_index: u16,
        configuration_index: ConfigurationIndex,
        name: &AvdeccFixedString,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        let payload = bytes(aem::serialize_name(
            descriptor_type,
            descriptor_index,
            name_index,
            configuration_index,
            name,
        ));
        self.send_aem_status(target, AemCommandType::SET_NAME, payload, handler);
    }

    /// Entity name of `target`
    pub fn get_entity_name(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus, Option<AvdeccFixedString>) + Send + 'static,
    ) {
        self.get_name(target, DescriptorType::ENTITY, 0, 0, 0, handler);
    }

    /// Rename `target`
    pub fn set_entity_name(
        &self,
        target: UniqueIdentifier,
        name: &AvdeccFixedString,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.set_name(target, DescriptorType::ENTITY, 0, 0, 0, name, handler);
    }

    /// Group name of `target`
    pub fn get_entity_group_name(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus, Option<AvdeccFixedString>) + Send + 'static,
    ) {
        self.get_name(target, DescriptorType::ENTITY, 0, 1, 0, handler);
    }

    /// Change the group name of `target`
    pub fn set_entity_group_name(
        &self,
        target: UniqueIdentifier,
        name: &AvdeccFixedString,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.set_name(target, DescriptorType::ENTITY, 0, 1, 0, name, handler);
    }

    /// Name of a configuration
    pub fn get_configuration_name(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        handler: impl FnOnce(AemCommandStatus, Option<AvdeccFixedString>) + Send + 'static,
    ) {
        self.get_name(
            target,
            DescriptorType::CONFIGURATION,
            configuration_index,
            0,
            0,
            handler,
        );
    }

    /// Rename a configuration
    pub fn set_configuration_name(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        name: &AvdeccFixedString,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.set_name(
            target,
            DescriptorType::CONFIGURATION,
            configuration_index,
            0,
            0,
            name,
            handler,
        );
    }

    object_names! {
        get_stream_input_name, set_stream_input_name => STREAM_INPUT, "a stream input";
        get_stream_output_name, set_stream_output_name => STREAM_OUTPUT, "a stream output";
        get_avb_interface_name, set_avb_interface_name => AVB_INTERFACE, "an AVB interface";
        get_clock_source_name, set_clock_source_name => CLOCK_SOURCE, "a clock source";
        get_audio_cluster_name, set_audio_cluster_name => AUDIO_CLUSTER, "an audio cluster";
        get_clock_domain_name, set_clock_domain_name => CLOCK_DOMAIN, "a clock domain";
    }

    // Audio and clocking

    /// Set the sampling rate of an audio unit
    pub fn set_audio_unit_sampling_rate(
        &self,
        target: UniqueIdentifier,
        audio_unit_index: DescriptorIndex,
        sampling_rate: SamplingRate,
        handler: impl FnOnce(AemCommandStatus, Option<SamplingRate>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_SAMPLING_RATE,
            bytes(aem::serialize_sampling_rate(
                DescriptorType::AUDIO_UNIT,
                audio_unit_index,
                sampling_rate,
            )),
            |response| aem::deserialize_sampling_rate(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Sampling rate of an audio unit
    pub fn get_audio_unit_sampling_rate(
        &self,
        target: UniqueIdentifier,
        audio_unit_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<SamplingRate>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_SAMPLING_RATE,
            reference(DescriptorType::AUDIO_UNIT, audio_unit_index),
            |response| aem::deserialize_sampling_rate(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Select the clock source of a clock domain
    pub fn set_clock_source(
        &self,
        target: UniqueIdentifier,
        clock_domain_index: DescriptorIndex,
        clock_source_index: ClockSourceIndex,
        handler: impl FnOnce(AemCommandStatus, Option<ClockSourceIndex>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_CLOCK_SOURCE,
            bytes(aem::serialize_clock_source(
                DescriptorType::CLOCK_DOMAIN,
                clock_domain_index,
                clock_source_index,
            )),
            |response| aem::deserialize_clock_source(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Clock source of a clock domain
    pub fn get_clock_source(
        &self,
        target: UniqueIdentifier,
        clock_domain_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<ClockSourceIndex>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_CLOCK_SOURCE,
            reference(DescriptorType::CLOCK_DOMAIN, clock_domain_index),
            |response| aem::deserialize_clock_source(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Write the raw values of a control
    pub fn set_control_values(
        &self,
        target: UniqueIdentifier,
        control_index: DescriptorIndex,
        values: &[u8],
        handler: impl FnOnce(AemCommandStatus, Option<Vec<u8>>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_CONTROL,
            bytes(aem::serialize_control(
                DescriptorType::CONTROL,
                control_index,
                values,
            )),
            |response| aem::deserialize_control(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Raw values of a control
    pub fn get_control_values(
        &self,
        target: UniqueIdentifier,
        control_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<Vec<u8>>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_CONTROL,
            reference(DescriptorType::CONTROL, control_index),
            |response| aem::deserialize_control(response.payload()).map(|r| r.2),
            handler,
        );
    }

    // Queries

    /// gPTP and MSRP state of an AVB interface
    pub fn get_avb_info(
        &self,
        target: UniqueIdentifier,
        avb_interface_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<AvbInfo>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_AVB_INFO,
            reference(DescriptorType::AVB_INTERFACE, avb_interface_index),
            |response| aem::deserialize_avb_info_response(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// gPTP path seen by an AVB interface
    pub fn get_as_path(
        &self,
        target: UniqueIdentifier,
        avb_interface_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<AsPath>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_AS_PATH,
            bytes(aem::serialize_get_as_path_command(avb_interface_index)),
            |response| aem::deserialize_as_path_response(response.payload()).map(|r| r.1),
            handler,
        );
    }

    /// Counters of a descriptor
    pub fn get_counters(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<DescriptorCounters>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_COUNTERS,
            reference(descriptor_type, descriptor_index),
            |response| aem::deserialize_counters_response(response.payload()).map(|r| r.2),
            handler,
        );
    }

    // Audio maps

    /// One page of the dynamic map of a stream port input
    pub fn get_stream_port_input_audio_map(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        map_index: MapIndex,
        handler: impl FnOnce(AemCommandStatus, Option<AudioMapResponse>) + Send + 'static,
    ) {
        self.get_audio_map(
            target,
            DescriptorType::STREAM_PORT_INPUT,
            stream_port_index,
            map_index,
            handler,
        );
    }

    /// One page of the dynamic map of a stream port output
    pub fn get_stream_port_output_audio_map(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        map_index: MapIndex,
        handler: impl FnOnce(AemCommandStatus, Option<AudioMapResponse>) + Send + 'static,
    ) {
        self.get_audio_map(
            target,
            DescriptorType::STREAM_PORT_OUTPUT,
            stream_port_index,
            map_index,
            handler,
        );
    }

    fn get_audio_map(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        stream_port_index: DescriptorIndex,
        map_index: MapIndex,
        handler: impl FnOnce(AemCommandStatus, Option<AudioMapResponse>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_AUDIO_MAP,
            bytes(aem::serialize_get_audio_map_command(
                descriptor_type,
                stream_port_index,
                map_index,
            )),
            |response| aem::deserialize_audio_map_response(response.payload()),
            handler,
        );
    }

    /// Add mappings to a stream port input
    pub fn add_stream_port_input_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: impl FnOnce(AemCommandStatus, Option<Vec<AudioMapping>>) + Send + 'static,
    ) {
        self.change_audio_mappings(
            target,
            AemCommandType::ADD_AUDIO_MAPPINGS,
            DescriptorType::STREAM_PORT_INPUT,
            stream_port_index,
            mappings,
            handler,
        );
    }

    /// Add mappings to a stream port output
    pub fn add_stream_port_output_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: impl FnOnce(AemCommandStatus, Option<Vec<AudioMapping>>) + Send + 'static,
    ) {
        self.change_audio_mappings(
            target,
            AemCommandType::ADD_AUDIO_MAPPINGS,
            DescriptorType::STREAM_PORT_OUTPUT,
            stream_port_index,
            mappings,
            handler,
        );
    }

    /// Remove mappings from a stream port input
    pub fn remove_stream_port_input_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: impl FnOnce(AemCommandStatus, Option<Vec<AudioMapping>>) + Send + 'static,
    ) {
        self.change_audio_mappings(
            target,
            AemCommandType::REMOVE_AUDIO_MAPPINGS,
            DescriptorType::STREAM_PORT_INPUT,
            stream_port_index,
            mappings,
            handler,
        );
    }

    /// Remove mappings from a stream port output
    pub fn remove_stream_port_output_audio_mappings(
        &self,
        target: UniqueIdentifier,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: impl FnOnce(AemCommandStatus, Option<Vec<AudioMapping>>) + Send + 'static,
    ) {
        self.change_audio_mappings(
            target,
            AemCommandType::REMOVE_AUDIO_MAPPINGS,
            DescriptorType::STREAM_PORT_OUTPUT,
            stream_port_index,
            mappings,
            handler,
        );
    }

    fn change_audio_mappings(
        &self,
        target: UniqueIdentifier,
        command_type: AemCommandType,
        descriptor_type: DescriptorType,
        stream_port_index: DescriptorIndex,
        mappings: &[AudioMapping],
        handler: impl FnOnce(AemCommandStatus, Option<Vec<AudioMapping>>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            command_type,
            bytes(aem::serialize_audio_mappings(
                descriptor_type,
                stream_port_index,
                mappings,
            )),
            |response| aem::deserialize_audio_mappings(response.payload()).map(|r| r.2),
            handler,
        );
    }

    // Operations

    /// Reboot `target`
    pub fn reboot(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::REBOOT,
            reference(DescriptorType::ENTITY, 0),
            handler,
        );
    }

    /// Start an operation on a memory object; the handler receives the
    /// operation ID assigned by the entity
    pub fn start_memory_object_operation(
        &self,
        target: UniqueIdentifier,
        memory_object_index: DescriptorIndex,
        operation_type: MemoryObjectOperationType,
        buffer: &[u8],
        handler: impl FnOnce(AemCommandStatus, Option<OperationId>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::START_OPERATION,
            bytes(aem::serialize_start_operation(
                DescriptorType::MEMORY_OBJECT,
                memory_object_index,
                0,
                operation_type,
                buffer,
            )),
            |response| aem::deserialize_start_operation(response.payload()).map(|r| r.operation_id),
            handler,
        );
    }

    /// Abort a running operation
    pub fn abort_operation(
        &self,
        target: UniqueIdentifier,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
        operation_id: OperationId,
        handler: impl FnOnce(AemCommandStatus) + Send + 'static,
    ) {
        self.send_aem_status(
            target,
            AemCommandType::ABORT_OPERATION,
            bytes(aem::serialize_abort_operation(
                descriptor_type,
                descriptor_index,
                operation_id,
            )),
            handler,
        );
    }

    /// Set the length of a memory object
    pub fn set_memory_object_length(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        memory_object_index: DescriptorIndex,
        length: u64,
        handler: impl FnOnce(AemCommandStatus, Option<u64>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_MEMORY_OBJECT_LENGTH,
            bytes(aem::serialize_memory_object_length(
                configuration_index,
                memory_object_index,
                length,
            )),
            |response| aem::deserialize_memory_object_length(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Length of a memory object
    pub fn get_memory_object_length(
        &self,
        target: UniqueIdentifier,
        configuration_index: ConfigurationIndex,
        memory_object_index: DescriptorIndex,
        handler: impl FnOnce(AemCommandStatus, Option<u64>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_MEMORY_OBJECT_LENGTH,
            bytes(aem::serialize_get_memory_object_length_command(
                configuration_index,
                memory_object_index,
            )),
            |response| aem::deserialize_memory_object_length(response.payload()).map(|r| r.2),
            handler,
        );
    }

    /// Set the association ID of `target`
    pub fn set_association_id(
        &self,
        target: UniqueIdentifier,
        association_id: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::SET_ASSOCIATION_ID,
            bytes(aem::serialize_association_id(association_id)),
            |response| aem::deserialize_association_id(response.payload()),
            handler,
        );
    }

    /// Association ID of `target`
    pub fn get_association_id(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(AemCommandStatus, Option<UniqueIdentifier>) + Send + 'static,
    ) {
        self.send_aem(
            target,
            AemCommandType::GET_ASSOCIATION_ID,
            no_payload(),
            |response| aem::deserialize_association_id(response.payload()),
            handler,
        );
    }

    // Address access

    /// Run ADDRESS_ACCESS TLVs on `target`; the handler receives the
    /// response TLVs
    pub fn address_access(
        &self,
        target: UniqueIdentifier,
        tlvs: Vec<Tlv>,
        handler: impl FnOnce(AaCommandStatus, Option<Vec<Tlv>>) + Send + 'static,
    ) {
        let command = match AaAecpdu::command(target, self.entity_id(), tlvs) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("Cannot build ADDRESS_ACCESS for {}: {}", target, e);
                invoke_protected(
                    "AA result handler",
                    |status| handler(status, None),
                    AaCommandStatus::PROTOCOL_ERROR,
                );
                return;
            }
        };
        self.handle.send_aecp(
            Aecpdu::Aa(command),
            None,
            Box::new(move |result| match result {
                Ok(Aecpdu::Aa(response)) => handler(
                    AaCommandStatus::from(response.status()),
                    Some(response.tlvs().to_vec()),
                ),
                Ok(_) => handler(AaCommandStatus::BASE_PROTOCOL_VIOLATION, None),
                Err(e) => handler(AaCommandStatus::from(e), None),
            }),
        );
    }

    // Milan

    /// Milan protocol version and features of `target`
    pub fn get_milan_info(
        &self,
        target: UniqueIdentifier,
        handler: impl FnOnce(MvuCommandStatus, Option<MilanInfo>) + Send + 'static,
    ) {
        let command = mvu::serialize_get_milan_info_command().and_then(|payload| {
            MvuAecpdu::command(
                target,
                self.entity_id(),
                MvuCommandType::GET_MILAN_INFO,
                payload.data(),
            )
        });
        let command = match command {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("Cannot build GET_MILAN_INFO for {}: {}", target, e);
                invoke_protected(
                    "MVU result handler",
                    |status| handler(status, None),
                    MvuCommandStatus::PROTOCOL_ERROR,
                );
                return;
            }
        };
        self.handle.send_aecp(
            Aecpdu::Mvu(command),
            None,
            Box::new(move |result| match result {
                Ok(Aecpdu::Mvu(response)) => {
                    let status = MvuCommandStatus::from(response.status());
                    match mvu::deserialize_get_milan_info_response(response.payload()) {
                        Ok(info) => handler(status, Some(info)),
                        Err(_) if status.is_success() => {
                            handler(MvuCommandStatus::PROTOCOL_ERROR, None);
                        }
                        Err(_) => handler(status, None),
                    }
                }
                Ok(_) => handler(MvuCommandStatus::BASE_PROTOCOL_VIOLATION, None),
                Err(e) => handler(MvuCommandStatus::from(e), None),
            }),
        );
    }

    // Connection management

    fn send_acmp(
        &self,
        message_type: AcmpMessageType,
        talker: StreamIdentification,
        listener: StreamIdentification,
        connection_count: u16,
        handler: impl FnOnce(ControlStatus, Option<StreamConnectionState>) + Send + 'static,
    ) {
        let mut command = Acmpdu::command(
            message_type,
            self.entity_id(),
            (talker.entity_id, talker.stream_index),
            (listener.entity_id, listener.stream_index),
        );
        command.connection_count = connection_count;
        self.handle.send_acmp(
            command,
            Box::new(move |result| match result {
                Ok(response) => handler(
                    ControlStatus::from(response.status),
                    Some(StreamConnectionState::from_acmpdu(&response)),
                ),
                Err(e) => handler(ControlStatus::from(e), None),
            }),
        );
    }

    /// Ask `listener` to connect to `talker`
    pub fn connect_stream(
        &self,
        talker: StreamIdentification,
        listener: StreamIdentification,
        handler: impl FnOnce(ControlStatus, Option<StreamConnectionState>) + Send + 'static,
    ) {
        self.send_acmp(AcmpMessageType::CONNECT_RX_COMMAND, talker, listener, 0, handler);
    }

    /// Ask `listener` to disconnect from `talker`
    pub fn disconnect_stream(
        &self,
        talker: StreamIdentification,
        listener: StreamIdentification,
        handler: impl FnOnce(ControlStatus, Option<StreamConnectionState>) + Send + 'static,
    ) {
        self.send_acmp(AcmpMessageType::DISCONNECT_RX_COMMAND, talker, listener, 0, handler);
    }

    /// Ask `talker` to drop `listener`, for listeners that went away
    pub fn disconnect_talker_stream(
        &self,
        talker: StreamIdentification,
        listener: StreamIdentification,
        handler: impl FnOnce(ControlStatus, Option<StreamConnectionState>) + Send + 'static,
    ) {
        self.send_acmp(AcmpMessageType::DISCONNECT_TX_COMMAND, talker, listener, 0, handler);
    }

    /// Connection state of a talker stream
    pub fn get_talker_stream_state(
        &self,
        talker: StreamIdentification,
        handler: impl FnOnce(ControlStatus, Option<StreamConnectionState>) + Send + 'static,
    ) {
        self.send_acmp(
            AcmpMessageType::GET_TX_STATE_COMMAND,
            talker,
            StreamIdentification::default(),
            0,
            handler,
        );
    }

    /// Connection state of a listener stream
    pub fn get_listener_stream_state(
        &self,
        listener: StreamIdentification,
        handler: impl FnOnce(ControlStatus, Option<StreamConnectionState>) + Send + 'static,
    ) {
        self.send_acmp(
            AcmpMessageType::GET_RX_STATE_COMMAND,
            StreamIdentification::default(),
            listener,
            0,
            handler,
        );
    }

    /// Connection number `connection_index` of a talker stream
    pub fn get_talker_stream_connection(
        &self,
        talker: StreamIdentification,
        connection_index: u16,
        handler: impl FnOnce(ControlStatus, Option<StreamConnectionState>) + Send + 'static,
    ) {
        self.send_acmp(
            AcmpMessageType::GET_TX_CONNECTION_COMMAND,
            talker,
            StreamIdentification::default(),
            connection_index,
            handler,
        );
    }
}

impl std::fmt::Debug for ControllerEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerEntity")
            .field("entity_id", &self.entity_id())
            .field("mac_address", &self.mac_address())
            .finish_non_exhaustive()
    }
}
