use crate::protocol::defines::{
    AECP_MAXIMUM_RECEIVE_LENGTH, AecpMessageType, AemAecpStatus, AemCommandType, MvuCommandType,
};
use crate::protocol::{AemAecpdu, Aecpdu, FrameDecoder, MvuAecpdu, Pdu, PduError, VuRegistry, encode_frame};
use crate::types::{MacAddress, PayloadPolicy, UniqueIdentifier};

const TARGET: UniqueIdentifier = UniqueIdentifier::new(0x0001_0203_0405_0607);
const CONTROLLER: UniqueIdentifier = UniqueIdentifier::new(0x0A0B_0C0D_0E0F_1011);
const MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x10]);

fn aem_frame(payload: &[u8]) -> Vec<u8> {
    let mut pdu =
        AemAecpdu::command(TARGET, CONTROLLER, AemCommandType::GET_CONFIGURATION, payload)
            .unwrap();
    pdu.common.sequence_id = 0x1234;
    encode_frame(MAC, MAC, &Pdu::Aecp(pdu.into())).unwrap().to_vec()
}

/// Overwrite the 11-bit control data length of an encoded frame
fn set_control_data_length(frame: &mut [u8], length: u16) {
    let word = u16::from_be_bytes([frame[16], frame[17]]);
    let patched = (word & 0xF800) | (length & 0x07FF);
    frame[16..18].copy_from_slice(&patched.to_be_bytes());
}

fn decode_with(policy: PayloadPolicy, frame: &[u8]) -> Result<Pdu, PduError> {
    FrameDecoder::new(policy, VuRegistry::default())
        .decode(frame)
        .map(|frame| frame.pdu)
}

#[test]
fn test_aem_roundtrip() {
    let frame = aem_frame(&[0, 0, 0, 1]);
    // AVTP + common (10) + AEM header (2) + payload (4)
    assert_eq!(frame.len(), 14 + 12 + 10 + 2 + 4);

    match decode_with(PayloadPolicy::Strict, &frame).unwrap() {
        Pdu::Aecp(Aecpdu::Aem(pdu)) => {
            assert_eq!(pdu.common.target_entity_id, TARGET);
            assert_eq!(pdu.common.controller_entity_id, CONTROLLER);
            assert_eq!(pdu.common.sequence_id, 0x1234);
            assert_eq!(pdu.command_type, AemCommandType::GET_CONFIGURATION);
            assert!(!pdu.unsolicited);
            assert_eq!(pdu.payload(), &[0, 0, 0, 1]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_response_copy_only_for_commands() {
    let command: Aecpdu =
        AemAecpdu::command(TARGET, CONTROLLER, AemCommandType::ACQUIRE_ENTITY, &[0; 16])
            .unwrap()
            .into();
    let response = command.response_copy().unwrap();

    assert_eq!(response.message_type(), AecpMessageType::AEM_RESPONSE);
    assert_eq!(response.target_entity_id(), TARGET);
    assert_eq!(response.controller_entity_id(), CONTROLLER);
    assert!(response.response_copy().is_none());
}

#[test]
fn test_unsolicited_flag() {
    let mut pdu = AemAecpdu::new(true);
    pdu.unsolicited = true;
    pdu.command_type = AemCommandType::SET_NAME;
    pdu.set_status(AemAecpStatus::SUCCESS);
    let frame = encode_frame(MAC, MAC, &Pdu::Aecp(pdu.into())).unwrap();

    // High bit of the AEM command type word
    assert_eq!(frame[14 + 12 + 10] & 0x80, 0x80);
    match decode_with(PayloadPolicy::Strict, &frame).unwrap() {
        Pdu::Aecp(pdu) => {
            assert!(pdu.is_unsolicited());
            assert!(!pdu.is_command());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_control_data_length_below_minimum() {
    let mut frame = aem_frame(&[]);
    set_control_data_length(&mut frame, 11);

    assert!(matches!(
        decode_with(PayloadPolicy::Strict, &frame),
        Err(PduError::ControlDataLengthTooSmall {
            declared: 11,
            minimum: 12
        })
    ));
}

#[test]
fn test_control_data_length_past_received_bytes() {
    let mut frame = aem_frame(&[0, 0, 0, 1]);
    set_control_data_length(&mut frame, 40);

    assert!(matches!(
        decode_with(PayloadPolicy::Strict, &frame),
        Err(PduError::ControlDataLengthTooLarge {
            declared: 40,
            available: 16
        })
    ));

    // Tolerant mode clamps to what arrived
    match decode_with(PayloadPolicy::Tolerant, &frame).unwrap() {
        Pdu::Aecp(Aecpdu::Aem(pdu)) => assert_eq!(pdu.payload(), &[0, 0, 0, 1]),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_trailing_ethernet_padding_is_ignored() {
    let mut frame = aem_frame(&[0, 0, 0, 1]);
    frame.extend_from_slice(&[0xEE; 20]);

    match decode_with(PayloadPolicy::Strict, &frame).unwrap() {
        Pdu::Aecp(Aecpdu::Aem(pdu)) => assert_eq!(pdu.payload().len(), 4),
        other => panic!("unexpected {other:?}"),
    }
}

#[cfg(not(feature = "big-payloads"))]
#[test]
fn test_oversized_aecpdu_is_rejected() {
    // A peer announcing more than the 1722.1 maximum
    let oversized = AECP_MAXIMUM_RECEIVE_LENGTH + 8;
    let payload = vec![0u8; oversized - 12];
    let mut frame = aem_frame(&[]);
    frame.extend_from_slice(&payload);
    set_control_data_length(&mut frame, u16::try_from(oversized).unwrap());

    assert!(matches!(
        decode_with(PayloadPolicy::Strict, &frame),
        Err(PduError::PayloadTooLarge { .. })
    ));
    match decode_with(PayloadPolicy::Tolerant, &frame).unwrap() {
        Pdu::Aecp(Aecpdu::Aem(pdu)) => {
            assert_eq!(pdu.payload().len(), AECP_MAXIMUM_RECEIVE_LENGTH - 12);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_mvu_roundtrip() {
    let mut pdu =
        MvuAecpdu::command(TARGET, CONTROLLER, MvuCommandType::GET_MILAN_INFO, &[0, 0]).unwrap();
    pdu.common.sequence_id = 3;
    let frame = encode_frame(MAC, MAC, &Pdu::Aecp(pdu.clone().into())).unwrap();

    // Protocol identifier right after the common header
    assert_eq!(
        &frame[14 + 12 + 10..14 + 12 + 16],
        &[0x00, 0x1B, 0xC5, 0x0A, 0xC1, 0x00]
    );
    assert_eq!(
        decode_with(PayloadPolicy::Strict, &frame).unwrap(),
        Pdu::Aecp(Aecpdu::Mvu(pdu))
    );
}
