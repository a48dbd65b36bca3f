//! Common test utilities and fixtures
#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use avdecc::entity::CommonInformation;
use avdecc::testing::{common_information, entity_id, interfaces, mac_address, sample_entity_tree};
use avdecc::{
    AemHandler, ControllerEntity, ProtocolConfig, ProtocolEvent, ProtocolInterface,
    ResponderEntity, UniqueIdentifier, VirtualNetwork,
};
use tokio::sync::broadcast;
use tokio_test::assert_ok;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialize test logging (call once per test module)
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive("avdecc=debug".parse().unwrap());

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Controller entity 0xC0 on a station with address 01
pub async fn controller_station(network: &VirtualNetwork) -> (ProtocolInterface, ControllerEntity) {
    let interface = ProtocolInterface::new(
        Arc::new(network.create_transport(mac_address(1))),
        ProtocolConfig::default(),
    )
    .unwrap();
    let controller = interface
        .create_controller_entity(
            CommonInformation::controller(entity_id(0xC0)),
            interfaces(mac_address(1)),
            None,
            None,
        )
        .await
        .unwrap();
    (interface, controller)
}

/// Advertising responder `n` serving the sample model under `name`
pub async fn responder_station(
    network: &VirtualNetwork,
    n: u8,
    name: &str,
) -> (ProtocolInterface, ResponderEntity) {
    let interface = ProtocolInterface::new(
        Arc::new(network.create_transport(mac_address(n))),
        ProtocolConfig::default(),
    )
    .unwrap();
    let mut tree = sample_entity_tree();
    tree.entity_name = avdecc::AvdeccFixedString::new(name);
    let responder = interface
        .create_responder_entity(
            common_information(entity_id(u32::from(n))),
            interfaces(mac_address(n)),
            AemHandler::new(Some(tree)).unwrap(),
        )
        .await
        .unwrap();
    assert_ok!(responder.enable_advertising().await);
    (interface, responder)
}

/// Collect online notifications until every one of `ids` was seen
pub async fn wait_all_online(
    events: &mut broadcast::Receiver<ProtocolEvent>,
    ids: &[UniqueIdentifier],
) {
    let mut missing: Vec<_> = ids.to_vec();
    tokio::time::timeout(Duration::from_secs(5), async {
        while !missing.is_empty() {
            if let Ok(ProtocolEvent::RemoteEntityOnline { entity }) = events.recv().await {
                missing.retain(|id| *id != entity.entity_id());
            }
        }
    })
    .await
    .expect("entities did not come online");
}
