use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use super::{RecordingOutbound, collector};
use crate::interface::InterfaceError;
use crate::protocol::defines::{AcmpMessageType, AemAecpStatus, AemCommandType};
use crate::protocol::{Acmpdu, AemAecpdu, Aecpdu, VuRegistry};
use crate::state_machine::{CommandStateMachine, CommandStatistic};
use crate::types::{MacAddress, UniqueIdentifier};

const CONTROLLER: UniqueIdentifier = UniqueIdentifier::new(0x0A0B_0C0D_0E0F_1011);
const TARGET: UniqueIdentifier = UniqueIdentifier::new(0x0001_0203_0405_0607);
const OTHER_TARGET: UniqueIdentifier = UniqueIdentifier::new(0x0001_0203_0405_0608);
const TARGET_MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x07]);

fn machine(max_inflight: usize) -> CommandStateMachine {
    let mut machine = CommandStateMachine::new(max_inflight, VuRegistry::default());
    machine.register_local_entity(CONTROLLER).unwrap();
    machine
}

fn aem_command(target: UniqueIdentifier, command_type: AemCommandType) -> Aecpdu {
    AemAecpdu::command(target, CONTROLLER, command_type, &[]).unwrap().into()
}

fn response_to(command: &Aecpdu) -> Aecpdu {
    command.response_copy().unwrap()
}

#[test]
fn test_duplicate_local_entity_rejected() {
    let mut machine = machine(10);
    assert_eq!(
        machine.register_local_entity(CONTROLLER),
        Err(InterfaceError::DuplicateLocalEntityId)
    );
}

#[test]
fn test_unknown_local_entity() {
    let mut machine = CommandStateMachine::new(10, VuRegistry::default());
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::ENTITY_AVAILABLE),
        TARGET_MAC,
        handler(),
        Instant::now(),
        &mut out,
    );

    assert!(out.aecp.is_empty());
    assert_eq!(
        results.lock().unwrap().as_slice(),
        &[Err(InterfaceError::UnknownLocalEntity)]
    );
}

#[test]
fn test_inflight_sequence_ids_are_distinct() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (_results, handler) = collector::<Aecpdu>();
    let now = Instant::now();

    for _ in 0..8 {
        machine.send_aecp_command(
            aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
            TARGET_MAC,
            handler(),
            now,
            &mut out,
        );
    }

    let ids: HashSet<u16> = out.aecp.iter().map(|(_, pdu)| pdu.sequence_id()).collect();
    assert_eq!(ids.len(), 8);
    assert_eq!(machine.inflight_aecp_count(CONTROLLER, TARGET), 8);
}

#[test]
fn test_response_completes_command() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let now = Instant::now();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
        TARGET_MAC,
        handler(),
        now,
        &mut out,
    );
    let response = response_to(&out.aecp[0].1);
    assert!(machine.handle_aecp_response(&response, TARGET_MAC, now, &mut out));

    assert_eq!(results.lock().unwrap().as_slice(), &[Ok(response.clone())]);
    assert_eq!(machine.pending_count(), 0);
    // A late duplicate matches nothing
    assert!(!machine.handle_aecp_response(&response, TARGET_MAC, now, &mut out));
    assert!(machine
        .take_statistics()
        .contains(&CommandStatistic::AecpUnexpectedResponse { entity_id: TARGET }));
}

#[test]
fn test_retry_reuses_sequence_id_then_times_out() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let start = Instant::now();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::READ_DESCRIPTOR),
        TARGET_MAC,
        handler(),
        start,
        &mut out,
    );

    machine.check_timeouts(start + Duration::from_millis(249), &mut out);
    assert_eq!(out.aecp.len(), 1);

    machine.check_timeouts(start + Duration::from_millis(250), &mut out);
    assert_eq!(out.aecp.len(), 2);
    assert_eq!(out.aecp[0].1, out.aecp[1].1);
    assert!(results.lock().unwrap().is_empty());

    machine.check_timeouts(start + Duration::from_millis(500), &mut out);
    assert_eq!(out.aecp.len(), 2);
    assert_eq!(
        results.lock().unwrap().as_slice(),
        &[Err(InterfaceError::Timeout)]
    );
    assert_eq!(
        machine.take_statistics(),
        vec![
            CommandStatistic::AecpRetry { entity_id: TARGET },
            CommandStatistic::AecpTimeout { entity_id: TARGET },
        ]
    );
}

#[test]
fn test_response_to_retry_completes() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let start = Instant::now();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::GET_NAME),
        TARGET_MAC,
        handler(),
        start,
        &mut out,
    );
    machine.check_timeouts(start + Duration::from_millis(300), &mut out);
    let response = response_to(&out.aecp[1].1);
    assert!(machine.handle_aecp_response(
        &response,
        TARGET_MAC,
        start + Duration::from_millis(320),
        &mut out
    ));

    assert!(results.lock().unwrap()[0].is_ok());
}

#[test]
fn test_mismatched_command_type_is_a_protocol_violation() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let now = Instant::now();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::ACQUIRE_ENTITY),
        TARGET_MAC,
        handler(),
        now,
        &mut out,
    );
    let mut response = response_to(&out.aecp[0].1);
    if let Aecpdu::Aem(aem) = &mut response {
        aem.command_type = AemCommandType::ENTITY_AVAILABLE;
    }

    assert!(machine.handle_aecp_response(&response, TARGET_MAC, now, &mut out));
    assert_eq!(
        results.lock().unwrap().as_slice(),
        &[Err(InterfaceError::BaseProtocolViolation)]
    );
    assert_eq!(machine.pending_count(), 0);
}

#[test]
fn test_response_from_wrong_address_is_ignored() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let now = Instant::now();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
        TARGET_MAC,
        handler(),
        now,
        &mut out,
    );
    let response = response_to(&out.aecp[0].1);
    let spoofed = MacAddress::new([0x02, 0, 0, 0, 0, 0x99]);

    assert!(!machine.handle_aecp_response(&response, spoofed, now, &mut out));
    assert!(results.lock().unwrap().is_empty());
    assert_eq!(machine.inflight_aecp_count(CONTROLLER, TARGET), 1);
}

#[test]
fn test_in_progress_rearms_timer() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let start = Instant::now();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::START_OPERATION),
        TARGET_MAC,
        handler(),
        start,
        &mut out,
    );
    let mut in_progress = response_to(&out.aecp[0].1);
    if let Aecpdu::Aem(aem) = &mut in_progress {
        aem.set_status(AemAecpStatus::IN_PROGRESS);
    }
    let at = start + Duration::from_millis(200);
    assert!(machine.handle_aecp_response(&in_progress, TARGET_MAC, at, &mut out));

    // The original deadline passes without a retry
    machine.check_timeouts(start + Duration::from_millis(300), &mut out);
    assert_eq!(out.aecp.len(), 1);
    assert!(results.lock().unwrap().is_empty());

    let done = response_to(&out.aecp[0].1);
    assert!(machine.handle_aecp_response(&done, TARGET_MAC, at, &mut out));
    assert!(results.lock().unwrap()[0].is_ok());
}

#[test]
fn test_queue_beyond_inflight_limit() {
    let mut machine = machine(2);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let now = Instant::now();

    for _ in 0..4 {
        machine.send_aecp_command(
            aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
            TARGET_MAC,
            handler(),
            now,
            &mut out,
        );
    }
    machine.send_aecp_command(
        aem_command(OTHER_TARGET, AemCommandType::GET_CONFIGURATION),
        TARGET_MAC,
        handler(),
        now,
        &mut out,
    );

    assert_eq!(out.aecp.len(), 3);
    assert_eq!(machine.inflight_aecp_count(CONTROLLER, TARGET), 2);
    assert_eq!(machine.queued_aecp_count(CONTROLLER, TARGET), 2);

    let response = response_to(&out.aecp[0].1);
    machine.handle_aecp_response(&response, TARGET_MAC, now, &mut out);
    assert_eq!(out.aecp.len(), 4);
    assert_eq!(machine.queued_aecp_count(CONTROLLER, TARGET), 1);
    assert_eq!(results.lock().unwrap().len(), 1);
}

#[test]
fn test_sequence_ids_skip_values_in_flight() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (_results, handler) = collector::<Aecpdu>();
    let now = Instant::now();

    // Held in flight with sequence ID 0
    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
        TARGET_MAC,
        handler(),
        now,
        &mut out,
    );
    assert_eq!(out.aecp[0].1.sequence_id(), 0);

    // Cycle through the remainder of the space
    for _ in 0..u16::MAX {
        machine.send_aecp_command(
            aem_command(OTHER_TARGET, AemCommandType::GET_CONFIGURATION),
            TARGET_MAC,
            handler(),
            now,
            &mut out,
        );
        let (_, sent) = out.aecp.pop().unwrap();
        machine.handle_aecp_response(&response_to(&sent), TARGET_MAC, now, &mut out);
    }

    machine.send_aecp_command(
        aem_command(OTHER_TARGET, AemCommandType::GET_CONFIGURATION),
        TARGET_MAC,
        handler(),
        now,
        &mut out,
    );
    assert_eq!(out.aecp.last().unwrap().1.sequence_id(), 1);
}

#[test]
fn test_send_failure_reported_to_handler() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound {
        fail: true,
        ..RecordingOutbound::default()
    };
    let (results, handler) = collector::<Aecpdu>();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
        TARGET_MAC,
        handler(),
        Instant::now(),
        &mut out,
    );

    assert!(matches!(
        results.lock().unwrap().as_slice(),
        [Err(InterfaceError::TransportError(_))]
    ));
    assert_eq!(machine.pending_count(), 0);
}

#[test]
fn test_unregister_aborts_every_pending_command() {
    let mut machine = machine(2);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Aecpdu>();
    let (acmp_results, acmp_handler) = collector::<Acmpdu>();
    let now = Instant::now();

    for _ in 0..5 {
        machine.send_aecp_command(
            aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
            TARGET_MAC,
            handler(),
            now,
            &mut out,
        );
    }
    machine.send_acmp_command(
        Acmpdu::command(
            AcmpMessageType::GET_RX_STATE_COMMAND,
            CONTROLLER,
            (UniqueIdentifier::NULL, 0),
            (TARGET, 0),
        ),
        acmp_handler(),
        now,
        &mut out,
    );

    assert_eq!(machine.unregister_local_entity(CONTROLLER), 6);
    let results = results.lock().unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| *r == Err(InterfaceError::Aborted)));
    assert_eq!(
        acmp_results.lock().unwrap().as_slice(),
        &[Err(InterfaceError::Aborted)]
    );
    assert!(!machine.is_local_entity(CONTROLLER));
}

#[test]
fn test_acmp_ignores_intermediate_response_type() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Acmpdu>();
    let now = Instant::now();

    machine.send_acmp_command(
        Acmpdu::command(
            AcmpMessageType::CONNECT_RX_COMMAND,
            CONTROLLER,
            (OTHER_TARGET, 0),
            (TARGET, 0),
        ),
        handler(),
        now,
        &mut out,
    );
    let command = out.acmp[0].clone();

    let mut talker_side = command.clone();
    talker_side.message_type = AcmpMessageType::CONNECT_TX_RESPONSE;
    assert!(!machine.handle_acmp_response(&talker_side));

    let response = command.response_copy().unwrap();
    assert!(machine.handle_acmp_response(&response));
    assert_eq!(results.lock().unwrap().as_slice(), &[Ok(response)]);
}

#[test]
fn test_acmp_times_out_without_retry() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let (results, handler) = collector::<Acmpdu>();
    let start = Instant::now();

    machine.send_acmp_command(
        Acmpdu::command(
            AcmpMessageType::DISCONNECT_RX_COMMAND,
            CONTROLLER,
            (OTHER_TARGET, 0),
            (TARGET, 1),
        ),
        handler(),
        start,
        &mut out,
    );

    machine.check_timeouts(start + Duration::from_millis(499), &mut out);
    assert!(results.lock().unwrap().is_empty());
    machine.check_timeouts(start + Duration::from_millis(500), &mut out);

    assert_eq!(out.acmp.len(), 1);
    assert_eq!(
        results.lock().unwrap().as_slice(),
        &[Err(InterfaceError::Timeout)]
    );
    assert!(machine
        .take_statistics()
        .contains(&CommandStatistic::AcmpTimeout { entity_id: TARGET }));
}

#[test]
fn test_panicking_handler_is_contained() {
    let mut machine = machine(10);
    let mut out = RecordingOutbound::default();
    let now = Instant::now();

    machine.send_aecp_command(
        aem_command(TARGET, AemCommandType::GET_CONFIGURATION),
        TARGET_MAC,
        Box::new(|_: Result<Aecpdu, InterfaceError>| panic!("handler bug")),
        now,
        &mut out,
    );
    let response = response_to(&out.aecp[0].1);
    assert!(machine.handle_aecp_response(&response, TARGET_MAC, now, &mut out));
    assert_eq!(machine.pending_count(), 0);
}
