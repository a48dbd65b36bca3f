//! Common test utilities and fixtures
#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use avdecc::entity::CommonInformation;
use avdecc::protocol::{AemAecpdu, Aecpdu, Frame, FrameDecoder, Pdu, encode_frame};
use avdecc::testing::{self, interfaces};
use avdecc::{
    ControllerEntity, Entity, MacAddress, ProtocolConfig, ProtocolEvent, ProtocolInterface,
    Transport, UniqueIdentifier, VirtualNetwork, VirtualTransport,
};
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialize test logging (call once per test module)
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive("avdecc=debug".parse().unwrap());

        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Configuration with a coarse tick so paused-clock tests stay cheap
pub fn test_config() -> ProtocolConfig {
    ProtocolConfig::builder()
        .tick_interval(Duration::from_millis(50))
        .build()
}

/// Interface and controller entity on `network`
pub async fn controller(
    network: &VirtualNetwork,
    mac: MacAddress,
    id: UniqueIdentifier,
) -> (ProtocolInterface, ControllerEntity) {
    let interface =
        ProtocolInterface::new(Arc::new(network.create_transport(mac)), test_config()).unwrap();
    let controller = interface
        .create_controller_entity(CommonInformation::controller(id), interfaces(mac), None, None)
        .await
        .unwrap();
    (interface, controller)
}

/// Wait until `id` is reported online
pub async fn wait_online(events: &mut broadcast::Receiver<ProtocolEvent>, id: UniqueIdentifier) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(ProtocolEvent::RemoteEntityOnline { entity }) = events.recv().await {
                if entity.entity_id() == id {
                    return;
                }
            }
        }
    })
    .await
    .expect("entity did not come online");
}

/// Hand-driven end station speaking raw frames on the virtual network
pub struct RawPeer {
    pub entity: Entity,
    pub transport: VirtualTransport,
    decoder: FrameDecoder,
}

impl RawPeer {
    pub fn new(network: &VirtualNetwork, entity: Entity) -> Self {
        let mac = entity.interfaces().values().next().unwrap().mac_address;
        Self {
            entity,
            transport: network.create_transport(mac),
            decoder: FrameDecoder::default(),
        }
    }

    pub fn mac_address(&self) -> MacAddress {
        self.transport.mac_address()
    }

    pub fn announce(&self) {
        let frame = testing::entity_available_frame(&self.entity).unwrap();
        self.transport.send(frame).unwrap();
    }

    pub fn depart(&self) {
        let frame = testing::entity_departing_frame(&self.entity).unwrap();
        self.transport.send(frame).unwrap();
    }

    /// Next AEM command addressed to this peer, with its sender
    pub async fn next_aem_command(&self) -> (AemAecpdu, MacAddress) {
        loop {
            let bytes = self.transport.recv().await.unwrap();
            let Ok(Frame {
                src_address, pdu, ..
            }) = self.decoder.decode(&bytes)
            else {
                continue;
            };
            if let Pdu::Aecp(Aecpdu::Aem(aem)) = pdu {
                if aem.common.message_type.is_command() {
                    return (aem, src_address);
                }
            }
        }
    }

    pub fn reply(&self, destination: MacAddress, response: Aecpdu) {
        let frame = encode_frame(destination, self.mac_address(), &Pdu::Aecp(response)).unwrap();
        self.transport.send(frame).unwrap();
    }
}

