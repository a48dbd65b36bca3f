//! Network binding and the per-interface executor
//!
//! A [`ProtocolInterface`] drives the protocol over a [`Transport`]. Two
//! transports are provided: [`VirtualNetwork`] for in-process segments and
//! [`UdpTransport`] for Ethernet frames tunnelled over UDP.

mod error;
mod events;
mod executor;
mod protocol_interface;
mod transport;
mod udp;
mod virtual_network;

#[cfg(test)]
mod tests;

pub use error::InterfaceError;
pub use events::{EventBus, EventFilter, ProtocolEvent};
pub use protocol_interface::ProtocolInterface;
pub(crate) use protocol_interface::LocalEntityHandle;
pub use transport::Transport;
pub use udp::UdpTransport;
pub use virtual_network::{VirtualNetwork, VirtualTransport};
