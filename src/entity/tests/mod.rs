use super::*;

fn common() -> CommonInformation {
    CommonInformation {
        entity_id: UniqueIdentifier::new(0x0011_2233_4455_6677),
        entity_model_id: UniqueIdentifier::new(0x0011_2233_0000_0001),
        entity_capabilities: EntityCapabilities::AEM_SUPPORTED,
        talker_stream_sources: 2,
        talker_capabilities: TalkerCapabilities::NONE,
        listener_stream_sinks: 2,
        listener_capabilities: ListenerCapabilities::NONE,
        controller_capabilities: ControllerCapabilities::NONE,
        identify_control_index: Some(3),
        association_id: None,
    }
}

const MAC: MacAddress = MacAddress::new([0x02, 0, 0, 0, 0, 0x01]);

#[test]
fn test_entity_requires_interface() {
    let err = Entity::new(common(), BTreeMap::new()).unwrap_err();
    assert!(matches!(err, AvdeccError::InvalidParameter { ref name, .. } if name == "interfaces"));
}

#[test]
fn test_entity_rejects_invalid_id() {
    let mut info = common();
    info.entity_id = UniqueIdentifier::UNINITIALIZED;
    assert!(Entity::with_interface(info, InterfaceInformation::new(MAC)).is_err());
}

#[test]
fn test_entity_rejects_out_of_range_valid_time() {
    let mut interface = InterfaceInformation::new(MAC);
    interface.valid_time = 0;
    assert!(Entity::with_interface(common(), interface.clone()).is_err());

    interface.valid_time = 32;
    assert!(Entity::with_interface(common(), interface).is_err());
}

#[test]
fn test_validity_bits_follow_optional_fields() {
    let mut interface = InterfaceInformation::new(MAC);
    interface.gptp_grandmaster_id = Some(UniqueIdentifier::new(0xAA));
    interface.gptp_domain_number = Some(1);
    let entity = Entity::new(common(), BTreeMap::from([(1, interface.clone())])).unwrap();

    let adpdu = entity.to_adpdu(AdpMessageType::ENTITY_AVAILABLE, 1, &interface);
    let caps = adpdu.entity_capabilities;
    assert!(caps.contains(EntityCapabilities::AEM_SUPPORTED));
    assert!(caps.contains(EntityCapabilities::AEM_IDENTIFY_CONTROL_INDEX_VALID));
    assert!(caps.contains(EntityCapabilities::AEM_INTERFACE_INDEX_VALID));
    assert!(caps.contains(EntityCapabilities::GPTP_SUPPORTED));
    assert!(!caps.contains(EntityCapabilities::ASSOCIATION_ID_VALID));
    assert_eq!(adpdu.identify_control_index, 3);
    assert_eq!(adpdu.interface_index, 1);
    assert_eq!(adpdu.gptp_domain_number, 1);
}

#[test]
fn test_global_interface_index_is_not_advertised() {
    let entity = Entity::with_interface(common(), InterfaceInformation::new(MAC)).unwrap();
    let info = entity.interface(GLOBAL_AVB_INTERFACE_INDEX).unwrap();
    let adpdu = entity.to_adpdu(AdpMessageType::ENTITY_AVAILABLE, GLOBAL_AVB_INTERFACE_INDEX, info);

    assert_eq!(adpdu.interface_index, 0);
    assert!(!adpdu
        .entity_capabilities
        .contains(EntityCapabilities::AEM_INTERFACE_INDEX_VALID));
}

#[test]
fn test_optional_fields_ignored_without_validity_bits() {
    let adpdu = Adpdu {
        entity_id: UniqueIdentifier::new(0x10),
        entity_capabilities: EntityCapabilities::AEM_SUPPORTED,
        gptp_grandmaster_id: UniqueIdentifier::new(0xBEEF),
        identify_control_index: 9,
        interface_index: 4,
        association_id: UniqueIdentifier::new(0x77),
        ..Adpdu::default()
    };

    let (entity, index) = Entity::from_adpdu(&adpdu, MAC);
    assert_eq!(index, GLOBAL_AVB_INTERFACE_INDEX);
    assert_eq!(entity.common().identify_control_index, None);
    assert_eq!(entity.common().association_id, None);
    let info = entity.interface(index).unwrap();
    assert_eq!(info.gptp_grandmaster_id, None);
    assert_eq!(info.mac_address, MAC);
}

#[test]
fn test_from_adpdu_with_validity_bits() {
    let adpdu = Adpdu {
        entity_id: UniqueIdentifier::new(0x10),
        entity_capabilities: EntityCapabilities::GPTP_SUPPORTED
            .with(EntityCapabilities::AEM_INTERFACE_INDEX_VALID)
            .with(EntityCapabilities::ASSOCIATION_ID_VALID),
        gptp_grandmaster_id: UniqueIdentifier::new(0xBEEF),
        gptp_domain_number: 2,
        interface_index: 4,
        association_id: UniqueIdentifier::new(0x77),
        available_index: 12,
        ..Adpdu::default()
    };

    let (entity, index) = Entity::from_adpdu(&adpdu, MAC);
    assert_eq!(index, 4);
    assert_eq!(entity.common().association_id, Some(UniqueIdentifier::new(0x77)));
    assert_eq!(entity.available_index(), 12);
    let info = entity.interface(4).unwrap();
    assert_eq!(info.gptp_grandmaster_id, Some(UniqueIdentifier::new(0xBEEF)));
    assert_eq!(info.gptp_domain_number, Some(2));
}

#[test]
fn test_immutable_field_change_detected() {
    let entity = Entity::with_interface(common(), InterfaceInformation::new(MAC)).unwrap();
    let mut changed = common();
    changed.association_id = Some(UniqueIdentifier::new(1));
    assert!(!entity.immutable_fields_differ(&changed));

    changed.talker_stream_sources = 4;
    assert!(entity.immutable_fields_differ(&changed));
}
