//! In-memory Ethernet segment for tests and simulations

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use tokio::sync::mpsc;

use super::{InterfaceError, Transport};
use crate::types::MacAddress;

type LinkFilter = Arc<dyn Fn(MacAddress, MacAddress, &[u8]) -> bool + Send + Sync>;

struct Port {
    id: u64,
    mac_address: MacAddress,
    tx: mpsc::UnboundedSender<Bytes>,
}

#[derive(Default)]
struct Segment {
    ports: Vec<Port>,
    loss_rate: f64,
    filter: Option<LinkFilter>,
}

/// A shared segment connecting any number of [`VirtualTransport`]s.
///
/// Multicast frames reach every other port; unicast frames reach the ports
/// owning the destination address. A frame is never looped back to its
/// sending port.
#[derive(Clone, Default)]
pub struct VirtualNetwork {
    segment: Arc<Mutex<Segment>>,
    next_port: Arc<AtomicU64>,
}

impl VirtualNetwork {
    /// Empty segment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn segment(&self) -> MutexGuard<'_, Segment> {
        self.segment.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a new port with address `mac_address`
    #[must_use]
    pub fn create_transport(&self, mac_address: MacAddress) -> VirtualTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_port.fetch_add(1, Ordering::Relaxed);
        self.segment().ports.push(Port {
            id,
            mac_address,
            tx,
        });
        VirtualTransport {
            id,
            mac_address,
            network: self.clone(),
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    /// Drop frames at random with probability `loss_rate` (0.0 to 1.0)
    pub fn set_loss_rate(&self, loss_rate: f64) {
        self.segment().loss_rate = loss_rate.clamp(0.0, 1.0);
    }

    /// Only deliver frames for which `filter(source, destination, frame)`
    /// returns true
    pub fn set_filter<F>(&self, filter: F)
    where
        F: Fn(MacAddress, MacAddress, &[u8]) -> bool + Send + Sync + 'static,
    {
        self.segment().filter = Some(Arc::new(filter));
    }

    /// Remove the delivery filter
    pub fn clear_filter(&self) {
        self.segment().filter = None;
    }

    /// Number of attached ports
    #[must_use]
    pub fn port_count(&self) -> usize {
        self.segment().ports.len()
    }

    fn deliver(&self, from_port: u64, frame: Bytes) -> Result<(), InterfaceError> {
        if frame.len() < 14 {
            return Err(InterfaceError::TransportError(format!(
                "runt frame of {} bytes",
                frame.len()
            )));
        }
        let destination = mac_at(&frame, 0);
        let source = mac_at(&frame, 6);

        let mut segment = self.segment();
        if let Some(filter) = &segment.filter {
            if !filter(source, destination, &frame) {
                tracing::trace!("Filtered frame {} -> {}", source, destination);
                return Ok(());
            }
        }
        if segment.loss_rate > 0.0 && rand::thread_rng().gen_bool(segment.loss_rate) {
            tracing::trace!("Lost frame {} -> {}", source, destination);
            return Ok(());
        }

        segment.ports.retain(|port| {
            if port.id == from_port
                || !(destination.is_multicast() || destination == port.mac_address)
            {
                return true;
            }
            // A closed receiver means its transport is gone
            port.tx.send(frame.clone()).is_ok()
        });
        Ok(())
    }

    fn detach(&self, port_id: u64) {
        self.segment().ports.retain(|port| port.id != port_id);
    }
}

fn mac_at(frame: &[u8], offset: usize) -> MacAddress {
    let mut octets = [0u8; 6];
    octets.copy_from_slice(&frame[offset..offset + 6]);
    MacAddress::new(octets)
}

/// One port of a [`VirtualNetwork`]
pub struct VirtualTransport {
    id: u64,
    mac_address: MacAddress,
    network: VirtualNetwork,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<Bytes>>,
}

#[async_trait]
impl Transport for VirtualTransport {
    fn mac_address(&self) -> MacAddress {
        self.mac_address
    }

    fn send(&self, frame: Bytes) -> Result<(), InterfaceError> {
        self.network.deliver(self.id, frame)
    }

    async fn recv(&self) -> Result<Bytes, InterfaceError> {
        self.rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| InterfaceError::TransportError("virtual port detached".to_string()))
    }
}

impl Drop for VirtualTransport {
    fn drop(&mut self) {
        self.network.detach(self.id);
    }
}
