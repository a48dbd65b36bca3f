use std::sync::Mutex;

use super::delegate::{dispatch_acmp_sniffed, dispatch_unsolicited};
use super::*;
use crate::interface::InterfaceError;
use crate::model::StreamFormat;
use crate::protocol::defines::{
    AcmpMessageType, AcmpStatus, AcquireFlags, AemAecpStatus, AemCommandType, DescriptorType,
    LockFlags,
};
use crate::protocol::payloads::aem;
use crate::protocol::{Acmpdu, AemAecpdu, Aecpdu};
use crate::testing::entity_id;

#[test]
fn test_wire_status_conversion() {
    assert_eq!(
        AemCommandStatus::from(AemAecpStatus::NO_SUCH_DESCRIPTOR),
        AemCommandStatus::NO_SUCH_DESCRIPTOR
    );
    assert_eq!(
        AemCommandStatus::from(AemAecpStatus::ENTITY_ACQUIRED),
        AemCommandStatus::ACQUIRED_BY_OTHER
    );
    assert_eq!(
        ControlStatus::from(AcmpStatus::NOT_SUPPORTED).value(),
        31
    );
    assert!(AemCommandStatus::SUCCESS.is_success());
    assert!(!AemCommandStatus::TIMED_OUT.is_success());
}

#[test]
fn test_interface_error_mapping() {
    assert_eq!(
        AemCommandStatus::from(InterfaceError::Timeout),
        AemCommandStatus::TIMED_OUT
    );
    assert_eq!(
        AaCommandStatus::from(InterfaceError::UnknownRemoteEntity),
        AaCommandStatus::UNKNOWN_ENTITY
    );
    assert_eq!(
        MvuCommandStatus::from(InterfaceError::Aborted).value(),
        990
    );
    assert_eq!(
        ControlStatus::from(InterfaceError::BaseProtocolViolation),
        ControlStatus::BASE_PROTOCOL_VIOLATION
    );
    assert_eq!(
        AemCommandStatus::from(InterfaceError::TransportError("down".to_string())),
        AemCommandStatus::NETWORK_ERROR
    );
    assert_eq!(
        AemCommandStatus::from(InterfaceError::InternalError("bug".to_string())),
        AemCommandStatus::INTERNAL_ERROR
    );
}

#[test]
fn test_status_display() {
    assert_eq!(AemCommandStatus::SUCCESS.to_string(), "Success");
    assert_eq!(
        AemCommandStatus::BASE_PROTOCOL_VIOLATION.to_string(),
        "Base protocol violation"
    );
    assert_eq!(ControlStatus(15).to_string(), "Unknown status (15)");
    assert_eq!(ControlStatus(15).description(), None);
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl ControllerDelegate for Recorder {
    fn on_entity_acquired(
        &self,
        entity_id: UniqueIdentifier,
        owner_id: UniqueIdentifier,
        _descriptor_type: DescriptorType,
        _descriptor_index: u16,
    ) {
        self.record(format!("acquired {entity_id} by {owner_id}"));
    }

    fn on_entity_released(
        &self,
        entity_id: UniqueIdentifier,
        _owner_id: UniqueIdentifier,
        _descriptor_type: DescriptorType,
        _descriptor_index: u16,
    ) {
        self.record(format!("released {entity_id}"));
    }

    fn on_entity_unlocked(
        &self,
        entity_id: UniqueIdentifier,
        _locking_id: UniqueIdentifier,
        _descriptor_type: DescriptorType,
        _descriptor_index: u16,
    ) {
        self.record(format!("unlocked {entity_id}"));
    }

    fn on_stream_format_changed(
        &self,
        _entity_id: UniqueIdentifier,
        descriptor_type: DescriptorType,
        stream_index: u16,
        stream_format: StreamFormat,
    ) {
        self.record(format!(
            "format {descriptor_type} {stream_index} {:#x}",
            stream_format.0
        ));
    }

    fn on_unsolicited_notification(&self, entity_id: UniqueIdentifier, aecpdu: &Aecpdu) {
        self.record(format!(
            "unsolicited {entity_id} status {}",
            aecpdu.common().status
        ));
    }

    fn on_controller_connect_response_sniffed(
        &self,
        state: &StreamConnectionState,
        status: ControlStatus,
    ) {
        self.record(format!(
            "connect {}:{} -> {}:{} {status}",
            state.talker_stream.entity_id,
            state.talker_stream.stream_index,
            state.listener_stream.entity_id,
            state.listener_stream.stream_index
        ));
    }
}

fn unsolicited(command_type: AemCommandType, payload: &[u8]) -> Aecpdu {
    let command: Aecpdu = AemAecpdu::command(entity_id(1), entity_id(0xC0), command_type, payload)
        .unwrap()
        .into();
    let mut response = command.response_copy().unwrap();
    if let Aecpdu::Aem(aem) = &mut response {
        aem.unsolicited = true;
    }
    response
}

#[test]
fn test_acquire_and_release_notifications() {
    let recorder = Recorder::default();

    let payload = aem::serialize_acquire_entity(
        AcquireFlags::NONE,
        entity_id(0xC1),
        DescriptorType::ENTITY,
        0,
    )
    .unwrap();
    dispatch_unsolicited(
        &recorder,
        &unsolicited(AemCommandType::ACQUIRE_ENTITY, payload.data()),
    );

    let payload = aem::serialize_acquire_entity(
        AcquireFlags::RELEASE,
        entity_id(0xC1),
        DescriptorType::ENTITY,
        0,
    )
    .unwrap();
    dispatch_unsolicited(
        &recorder,
        &unsolicited(AemCommandType::ACQUIRE_ENTITY, payload.data()),
    );

    let payload =
        aem::serialize_lock_entity(LockFlags::UNLOCK, entity_id(0xC1), DescriptorType::ENTITY, 0)
            .unwrap();
    dispatch_unsolicited(
        &recorder,
        &unsolicited(AemCommandType::LOCK_ENTITY, payload.data()),
    );

    assert_eq!(
        recorder.take(),
        vec![
            format!("acquired {} by {}", entity_id(1), entity_id(0xC1)),
            format!("released {}", entity_id(1)),
            format!("unlocked {}", entity_id(1)),
        ]
    );
}

#[test]
fn test_stream_format_notification() {
    let recorder = Recorder::default();
    let payload = aem::serialize_stream_format(
        DescriptorType::STREAM_INPUT,
        1,
        StreamFormat(0x00A0_0208_4000_0800),
    )
    .unwrap();
    dispatch_unsolicited(
        &recorder,
        &unsolicited(AemCommandType::SET_STREAM_FORMAT, payload.data()),
    );
    assert_eq!(
        recorder.take(),
        vec![format!(
            "format {} 1 0xa0020840000800",
            DescriptorType::STREAM_INPUT
        )]
    );
}

#[test]
fn test_undecodable_and_unmapped_notifications_fall_back() {
    let recorder = Recorder::default();

    dispatch_unsolicited(
        &recorder,
        &unsolicited(AemCommandType::SET_STREAM_FORMAT, &[0, 5]),
    );
    dispatch_unsolicited(&recorder, &unsolicited(AemCommandType::REBOOT, &[]));

    let mut failed = unsolicited(AemCommandType::ACQUIRE_ENTITY, &[0; 16]);
    if let Aecpdu::Aem(aem) = &mut failed {
        aem.set_status(AemAecpStatus::ENTITY_ACQUIRED);
    }
    dispatch_unsolicited(&recorder, &failed);

    let calls = recorder.take();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("unsolicited"));
    assert!(calls[1].starts_with("unsolicited"));
    assert_eq!(calls[2], format!("unsolicited {} status 4", entity_id(1)));
}

#[test]
fn test_sniffed_connect_response() {
    let recorder = Recorder::default();
    let command = Acmpdu::command(
        AcmpMessageType::CONNECT_RX_COMMAND,
        entity_id(0xC0),
        (entity_id(1), 0),
        (entity_id(2), 1),
    );
    let mut response = command.response_copy().unwrap();
    response.status = AcmpStatus::SUCCESS;
    response.connection_count = 1;

    dispatch_acmp_sniffed(&recorder, &response);
    // commands are not responses and are never reported
    dispatch_acmp_sniffed(&recorder, &command);

    assert_eq!(
        recorder.take(),
        vec![format!(
            "connect {}:0 -> {}:1 Success",
            entity_id(1),
            entity_id(2)
        )]
    );

    let state = StreamConnectionState::from_acmpdu(&response);
    assert_eq!(state.connection_count, 1);
    assert_eq!(state.listener_stream.stream_index, 1);
}
