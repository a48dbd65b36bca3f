use super::*;
use std::time::Duration;

// --- config.rs tests ---

#[test]
fn test_config_defaults() {
    let config = ProtocolConfig::default();

    assert_eq!(config.payload_policy, PayloadPolicy::Strict);
    assert_eq!(config.tick_interval, Duration::from_millis(5));
    assert_eq!(config.max_inflight_aecp, 10);
    assert_eq!(config.discovery_delay, Duration::ZERO);
    assert_eq!(config.event_capacity, 100);
}

#[test]
fn test_config_builder() {
    let config = ProtocolConfig::builder()
        .payload_policy(PayloadPolicy::Tolerant)
        .tick_interval(Duration::from_millis(1))
        .max_inflight_aecp(3)
        .discovery_delay(Duration::from_secs(10))
        .event_capacity(16)
        .build();

    assert!(config.payload_policy.is_tolerant());
    assert_eq!(config.tick_interval, Duration::from_millis(1));
    assert_eq!(config.max_inflight_aecp, 3);
    assert_eq!(config.discovery_delay, Duration::from_secs(10));
    assert_eq!(config.event_capacity, 16);
}

#[test]
fn test_config_builder_clamps_zero_limits() {
    let config = ProtocolConfig::builder()
        .max_inflight_aecp(0)
        .event_capacity(0)
        .build();

    assert_eq!(config.max_inflight_aecp, 1);
    assert_eq!(config.event_capacity, 1);
}

// --- unique_identifier.rs tests ---

#[test]
fn test_unique_identifier_sentinels() {
    assert!(!UniqueIdentifier::NULL.is_valid());
    assert!(!UniqueIdentifier::UNINITIALIZED.is_valid());
    assert!(UniqueIdentifier::NULL.is_null());
    assert_eq!(UniqueIdentifier::default(), UniqueIdentifier::UNINITIALIZED);
    assert!(UniqueIdentifier::new(0x0001_0203_0405_0607).is_valid());
}

#[test]
fn test_unique_identifier_vendor_id() {
    let id = UniqueIdentifier::new(0x001B_C50A_C100_0001);
    assert_eq!(id.vendor_id(), 0x001B_C5);
}

#[test]
fn test_unique_identifier_format() {
    let id = UniqueIdentifier::from(0xABu64);
    assert_eq!(id.to_string(), "0x00000000000000AB");
    assert_eq!(u64::from(id), 0xAB);
}

// --- mac_address.rs tests ---

#[test]
fn test_mac_address_parse_and_display() {
    let mac: MacAddress = "91:e0:f0:01:00:00".parse().unwrap();
    assert_eq!(mac.octets(), [0x91, 0xe0, 0xf0, 0x01, 0x00, 0x00]);
    assert_eq!(mac.to_string(), "91:e0:f0:01:00:00");
    assert!(mac.is_multicast());

    let dashed: MacAddress = "00-11-22-33-44-55".parse().unwrap();
    assert!(!dashed.is_multicast());
}

#[test]
fn test_mac_address_parse_invalid() {
    assert!("00:11:22".parse::<MacAddress>().is_err());
    assert!("zz:11:22:33:44:55".parse::<MacAddress>().is_err());
}

#[test]
fn test_mac_address_null() {
    assert!(MacAddress::NULL.is_null());
    assert!(!MacAddress::BROADCAST.is_null());
}

// --- fixed_string.rs tests ---

#[test]
fn test_fixed_string_roundtrip_text() {
    let s = AvdeccFixedString::new("Stage Box");
    assert_eq!(s.len(), 9);
    assert_eq!(s.to_string(), "Stage Box");
    assert!(AvdeccFixedString::default().is_empty());
}

#[test]
fn test_fixed_string_truncates_on_char_boundary() {
    // 63 ASCII bytes followed by a 2-byte character would straddle the limit
    let text = format!("{}é", "a".repeat(63));
    let s = AvdeccFixedString::new(&text);
    assert_eq!(s.len(), 63);
}

#[test]
fn test_fixed_string_full_length_has_no_terminator() {
    let s = AvdeccFixedString::new(&"x".repeat(80));
    assert_eq!(s.len(), 64);
}
