use std::time::Duration;

use tokio::time::Instant;

use super::RecordingOutbound;
use crate::entity::{CommonInformation, Entity, InterfaceInformation};
use crate::protocol::defines::AdpMessageType;
use crate::state_machine::AdvertiseStateMachine;
use crate::types::{MacAddress, UniqueIdentifier};

const ENTITY_ID: UniqueIdentifier = UniqueIdentifier::new(0x0011_2233_4455_6677);
const MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x01]);

fn entity(valid_time: u8) -> Entity {
    let mut interface = InterfaceInformation::new(MAC);
    interface.valid_time = valid_time;
    Entity::with_interface(CommonInformation::controller(ENTITY_ID), interface).unwrap()
}

#[test]
fn test_first_advertisement_on_next_tick() {
    let mut machine = AdvertiseStateMachine::new();
    let mut out = RecordingOutbound::default();
    let now = Instant::now();

    machine.enable(entity(31), now);
    machine.tick(now, &mut out);

    assert_eq!(out.adp.len(), 1);
    let (source, pdu) = &out.adp[0];
    assert_eq!(*source, MAC);
    assert_eq!(pdu.message_type, AdpMessageType::ENTITY_AVAILABLE);
    assert_eq!(pdu.available_index, 0);
    assert_eq!(machine.entity(ENTITY_ID).unwrap().available_index(), 1);
}

#[test]
fn test_readvertise_cadence() {
    let mut machine = AdvertiseStateMachine::new();
    let mut out = RecordingOutbound::default();
    let start = Instant::now();

    machine.enable(entity(31), start);
    machine.tick(start, &mut out);

    // Half the 62 s validity, plus at most a fifth of it
    machine.tick(start + Duration::from_millis(15_499), &mut out);
    assert_eq!(out.adp.len(), 1);
    machine.tick(start + Duration::from_millis(15_500 + 12_400), &mut out);
    assert_eq!(out.adp.len(), 2);
    assert_eq!(out.adp[1].1.available_index, 1);
}

#[test]
fn test_short_valid_time_uses_one_second_floor() {
    let mut machine = AdvertiseStateMachine::new();
    let mut out = RecordingOutbound::default();
    let start = Instant::now();

    machine.enable(entity(1), start);
    machine.tick(start, &mut out);
    machine.tick(start + Duration::from_millis(999), &mut out);
    assert_eq!(out.adp.len(), 1);
    machine.tick(start + Duration::from_millis(1400), &mut out);
    assert_eq!(out.adp.len(), 2);
}

#[test]
fn test_discover_brings_advertisement_forward() {
    let mut machine = AdvertiseStateMachine::new();
    let mut out = RecordingOutbound::default();
    let start = Instant::now();

    machine.enable(entity(31), start);
    machine.tick(start, &mut out);

    let discover_at = start + Duration::from_secs(1);
    machine.handle_discover(UniqueIdentifier::new(0x99), discover_at);
    machine.tick(discover_at + Duration::from_millis(12_400), &mut out);
    assert_eq!(out.adp.len(), 1, "targeted at another entity");

    machine.handle_discover(UniqueIdentifier::NULL, discover_at);
    machine.tick(discover_at + Duration::from_millis(12_400), &mut out);
    assert_eq!(out.adp.len(), 2);
}

#[test]
fn test_update_is_sent_on_next_tick() {
    let mut machine = AdvertiseStateMachine::new();
    let mut out = RecordingOutbound::default();
    let start = Instant::now();

    machine.enable(entity(31), start);
    machine.tick(start, &mut out);

    let mut changed = entity(31);
    changed.common_mut().association_id = Some(UniqueIdentifier::new(0x42));
    let later = start + Duration::from_secs(2);
    assert!(machine.update(changed, later));
    machine.tick(later, &mut out);

    assert_eq!(out.adp.len(), 2);
    assert_eq!(out.adp[1].1.association_id, UniqueIdentifier::new(0x42));
    // The index keeps counting from the previous snapshot
    assert_eq!(out.adp[1].1.available_index, 1);
}

#[test]
fn test_disable_sends_departing() {
    let mut machine = AdvertiseStateMachine::new();
    let mut out = RecordingOutbound::default();
    let now = Instant::now();

    machine.enable(entity(31), now);
    assert!(machine.disable(ENTITY_ID, &mut out));
    assert!(!machine.disable(ENTITY_ID, &mut out));

    assert_eq!(out.adp.len(), 1);
    assert_eq!(out.adp[0].1.message_type, AdpMessageType::ENTITY_DEPARTING);
    assert!(!machine.is_advertising(ENTITY_ID));

    machine.tick(now, &mut out);
    assert_eq!(out.adp.len(), 1);
}
