//! Notifications delivered to a controller entity

use super::StreamConnectionState;
use super::status::ControlStatus;
use crate::entity::Entity;
use crate::model::{
    AudioMapping, AvbInfo, ClockSourceIndex, ConfigurationIndex, DescriptorIndex, OperationId,
    SamplingRate, StreamFormat, StreamInfo,
};
use crate::protocol::defines::{
    AcmpMessageType, AcquireFlags, AemAecpStatus, AemCommandType, DescriptorType, LockFlags,
};
use crate::protocol::payloads::aem;
use crate::protocol::{Acmpdu, AemAecpdu, Aecpdu, PduError};
use crate::types::{AvdeccFixedString, UniqueIdentifier};

/// Declares a trait whose methods all default to doing nothing
macro_rules! delegate_trait {
    (
        $(#[$meta:meta])*
        pub trait $name:ident {
            $(
                $(#[$method_meta:meta])*
                fn $method:ident(&self $(, $arg:ident: $ty:ty)*);
            )*
        }
    ) => {
        $(#[$meta])*
        pub trait $name: Send + Sync {
            $(
                $(#[$method_meta])*
                #[allow(unused_variables)]
                fn $method(&self $(, $arg: $ty)*) {}
            )*
        }
    };
}

delegate_trait! {
    /// Controller notifications.
    ///
    /// Every method has an empty default body; implement the ones you need.
    /// Methods run on the interface executor and must return quickly.
    pub trait ControllerDelegate {
        // Global notifications
        /// The transport stopped receiving
        fn on_transport_error(&self);

        // Discovery notifications
        /// A remote entity came online
        fn on_entity_online(&self, entity: &Entity);
        /// A remote entity advertised new information
        fn on_entity_update(&self, entity: &Entity);
        /// A remote entity went offline
        fn on_entity_offline(&self, entity_id: UniqueIdentifier);

        // Unsolicited AEM notifications
        /// An entity was acquired by `owner_id`
        fn on_entity_acquired(
            &self,
            entity_id: UniqueIdentifier,
            owner_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            descriptor_index: DescriptorIndex
        );
        /// An entity was released
        fn on_entity_released(
            &self,
            entity_id: UniqueIdentifier,
            owner_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            descriptor_index: DescriptorIndex
        );
        /// An entity was locked by `locking_id`
        fn on_entity_locked(
            &self,
            entity_id: UniqueIdentifier,
            locking_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            descriptor_index: DescriptorIndex
        );
        /// An entity was unlocked
        fn on_entity_unlocked(
            &self,
            entity_id: UniqueIdentifier,
            locking_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            descriptor_index: DescriptorIndex
        );
        /// The current configuration changed
        fn on_configuration_changed(
            &self,
            entity_id: UniqueIdentifier,
            configuration_index: ConfigurationIndex
        );
        /// A stream format changed
        fn on_stream_format_changed(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            stream_index: DescriptorIndex,
            stream_format: StreamFormat
        );
        /// An object name changed
        fn on_name_changed(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            descriptor_index: DescriptorIndex,
            name_index: u16,
            configuration_index: ConfigurationIndex,
            name: &AvdeccFixedString
        );
        /// The association ID changed
        fn on_association_id_changed(
            &self,
            entity_id: UniqueIdentifier,
            association_id: UniqueIdentifier
        );
        /// A sampling rate changed
        fn on_sampling_rate_changed(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            descriptor_index: DescriptorIndex,
            sampling_rate: SamplingRate
        );
        /// A clock domain switched clock source
        fn on_clock_source_changed(
            &self,
            entity_id: UniqueIdentifier,
            clock_domain_index: DescriptorIndex,
            clock_source_index: ClockSourceIndex
        );
        /// Stream info changed
        fn on_stream_info_changed(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            stream_index: DescriptorIndex,
            info: &StreamInfo
        );
        /// A stream started
        fn on_stream_started(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            stream_index: DescriptorIndex
        );
        /// A stream stopped
        fn on_stream_stopped(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            stream_index: DescriptorIndex
        );
        /// Mappings were added to a stream port
        fn on_audio_mappings_added(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            stream_port_index: DescriptorIndex,
            mappings: &[AudioMapping]
        );
        /// Mappings were removed from a stream port
        fn on_audio_mappings_removed(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            stream_port_index: DescriptorIndex,
            mappings: &[AudioMapping]
        );
        /// AVB interface information changed
        fn on_avb_info_changed(
            &self,
            entity_id: UniqueIdentifier,
            avb_interface_index: DescriptorIndex,
            info: &AvbInfo
        );
        /// Control values changed
        fn on_control_values_changed(
            &self,
            entity_id: UniqueIdentifier,
            control_index: DescriptorIndex,
            values: &[u8]
        );
        /// A memory object length changed
        fn on_memory_object_length_changed(
            &self,
            entity_id: UniqueIdentifier,
            configuration_index: ConfigurationIndex,
            memory_object_index: DescriptorIndex,
            length: u64
        );
        /// Progress of a memory object operation
        fn on_operation_status(
            &self,
            entity_id: UniqueIdentifier,
            descriptor_type: DescriptorType,
            descriptor_index: DescriptorIndex,
            operation_id: OperationId,
            percent_complete: u16
        );
        /// Any unsolicited response not reported by a dedicated method
        fn on_unsolicited_notification(&self, entity_id: UniqueIdentifier, aecpdu: &Aecpdu);

        // Sniffed ACMP responses
        /// CONNECT_RX_RESPONSE seen
        fn on_controller_connect_response_sniffed(
            &self,
            state: &StreamConnectionState,
            status: ControlStatus
        );
        /// DISCONNECT_RX_RESPONSE seen
        fn on_controller_disconnect_response_sniffed(
            &self,
            state: &StreamConnectionState,
            status: ControlStatus
        );
        /// CONNECT_TX_RESPONSE seen
        fn on_listener_connect_response_sniffed(
            &self,
            state: &StreamConnectionState,
            status: ControlStatus
        );
        /// DISCONNECT_TX_RESPONSE seen
        fn on_listener_disconnect_response_sniffed(
            &self,
            state: &StreamConnectionState,
            status: ControlStatus
        );
        /// GET_TX_STATE_RESPONSE seen
        fn on_get_talker_stream_state_response_sniffed(
            &self,
            state: &StreamConnectionState,
            status: ControlStatus
        );
        /// GET_RX_STATE_RESPONSE seen
        fn on_get_listener_stream_state_response_sniffed(
            &self,
            state: &StreamConnectionState,
            status: ControlStatus
        );
    }
}

/// Route an unsolicited response to the matching delegate method
pub(crate) fn dispatch_unsolicited(delegate: &dyn ControllerDelegate, pdu: &Aecpdu) {
    let entity_id = pdu.target_entity_id();
    let handled = match pdu {
        Aecpdu::Aem(aem) if aem.status() == AemAecpStatus::SUCCESS => {
            dispatch_aem(delegate, entity_id, aem).unwrap_or_else(|e| {
                tracing::debug!(
                    "Undecodable unsolicited {} from {}: {}",
                    aem.command_type,
                    entity_id,
                    e
                );
                false
            })
        }
        _ => false,
    };
    if !handled {
        delegate.on_unsolicited_notification(entity_id, pdu);
    }
}

fn dispatch_aem(
    delegate: &dyn ControllerDelegate,
    entity_id: UniqueIdentifier,
    pdu: &AemAecpdu,
) -> Result<bool, PduError> {
    let payload = pdu.payload();
    match pdu.command_type {
        AemCommandType::ACQUIRE_ENTITY => {
            let (flags, owner_id, descriptor_type, descriptor_index) =
                aem::deserialize_acquire_entity(payload)?;
            if flags.contains(AcquireFlags::RELEASE) {
                delegate.on_entity_released(entity_id, owner_id, descriptor_type, descriptor_index);
            } else {
                delegate.on_entity_acquired(entity_id, owner_id, descriptor_type, descriptor_index);
            }
        }
        AemCommandType::LOCK_ENTITY => {
            let (flags, locking_id, descriptor_type, descriptor_index) =
                aem::deserialize_lock_entity(payload)?;
            if flags.contains(LockFlags::UNLOCK) {
                delegate.on_entity_unlocked(entity_id, locking_id, descriptor_type, descriptor_index);
            } else {
                delegate.on_entity_locked(entity_id, locking_id, descriptor_type, descriptor_index);
            }
        }
        AemCommandType::SET_CONFIGURATION => {
            let configuration_index = aem::deserialize_configuration(payload)?;
            delegate.on_configuration_changed(entity_id, configuration_index);
        }
        AemCommandType::SET_STREAM_FORMAT => {
            let (descriptor_type, index, format) = aem::deserialize_stream_format(payload)?;
            delegate.on_stream_format_changed(entity_id, descriptor_type, index, format);
        }
        AemCommandType::SET_NAME => {
            let (descriptor_type, index, name_index, configuration_index, name) =
                aem::deserialize_name(payload)?;
            delegate.on_name_changed(
                entity_id,
                descriptor_type,
                index,
                name_index,
                configuration_index,
                &name,
            );
        }
        AemCommandType::SET_ASSOCIATION_ID => {
            let association_id = aem::deserialize_association_id(payload)?;
            delegate.on_association_id_changed(entity_id, association_id);
        }
        AemCommandType::SET_SAMPLING_RATE => {
            let (descriptor_type, index, rate) = aem::deserialize_sampling_rate(payload)?;
            delegate.on_sampling_rate_changed(entity_id, descriptor_type, index, rate);
        }
        AemCommandType::SET_CLOCK_SOURCE => {
            let (_, index, clock_source_index) = aem::deserialize_clock_source(payload)?;
            delegate.on_clock_source_changed(entity_id, index, clock_source_index);
        }
        AemCommandType::SET_STREAM_INFO | AemCommandType::GET_STREAM_INFO => {
            let (descriptor_type, index, info) = aem::deserialize_stream_info(payload)?;
            delegate.on_stream_info_changed(entity_id, descriptor_type, index, &info);
        }
        AemCommandType::START_STREAMING => {
            let (descriptor_type, index) = aem::deserialize_descriptor_reference(payload)?;
            delegate.on_stream_started(entity_id, descriptor_type, index);
        }
        AemCommandType::STOP_STREAMING => {
            let (descriptor_type, index) = aem::deserialize_descriptor_reference(payload)?;
            delegate.on_stream_stopped(entity_id, descriptor_type, index);
        }
        AemCommandType::ADD_AUDIO_MAPPINGS => {
            let (descriptor_type, index, mappings) = aem::deserialize_audio_mappings(payload)?;
            delegate.on_audio_mappings_added(entity_id, descriptor_type, index, &mappings);
        }
        AemCommandType::REMOVE_AUDIO_MAPPINGS => {
            let (descriptor_type, index, mappings) = aem::deserialize_audio_mappings(payload)?;
            delegate.on_audio_mappings_removed(entity_id, descriptor_type, index, &mappings);
        }
        AemCommandType::GET_AVB_INFO => {
            let (_, index, info) = aem::deserialize_avb_info_response(payload)?;
            delegate.on_avb_info_changed(entity_id, index, &info);
        }
        AemCommandType::SET_CONTROL | AemCommandType::GET_CONTROL => {
            let (_, index, values) = aem::deserialize_control(payload)?;
            delegate.on_control_values_changed(entity_id, index, &values);
        }
        AemCommandType::SET_MEMORY_OBJECT_LENGTH => {
            let (configuration_index, index, length) =
                aem::deserialize_memory_object_length(payload)?;
            delegate.on_memory_object_length_changed(entity_id, configuration_index, index, length);
        }
        AemCommandType::OPERATION_STATUS => {
            let (descriptor_type, index, operation_id, percent) =
                aem::deserialize_operation_status(payload)?;
            delegate.on_operation_status(entity_id, descriptor_type, index, operation_id, percent);
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// Report an ACMP response seen on the link
pub(crate) fn dispatch_acmp_sniffed(delegate: &dyn ControllerDelegate, pdu: &Acmpdu) {
    let state = StreamConnectionState::from_acmpdu(pdu);
    let status = ControlStatus::from(pdu.status);
    match pdu.message_type {
        AcmpMessageType::CONNECT_RX_RESPONSE => {
            delegate.on_controller_connect_response_sniffed(&state, status);
        }
        AcmpMessageType::DISCONNECT_RX_RESPONSE => {
            delegate.on_controller_disconnect_response_sniffed(&state, status);
        }
        AcmpMessageType::CONNECT_TX_RESPONSE => {
            delegate.on_listener_connect_response_sniffed(&state, status);
        }
        AcmpMessageType::DISCONNECT_TX_RESPONSE => {
            delegate.on_listener_disconnect_response_sniffed(&state, status);
        }
        AcmpMessageType::GET_TX_STATE_RESPONSE => {
            delegate.on_get_talker_stream_state_response_sniffed(&state, status);
        }
        AcmpMessageType::GET_RX_STATE_RESPONSE => {
            delegate.on_get_listener_stream_state_response_sniffed(&state, status);
        }
        _ => {}
    }
}
