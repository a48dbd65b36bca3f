//! # avdecc
//!
//! An IEEE 1722.1 (AVDECC) protocol engine with Milan extensions.
//!
//! ## Features
//!
//! - ADP discovery and advertising with per-interface validity timers
//! - AECP command correlation with retries and in-flight limits (AEM, AA, MVU, VU)
//! - ACMP connection management commands and sniffing
//! - Typed controller API with status codes translated per protocol
//! - Responder entities answering AEM from a static entity model
//! - In-process virtual network and a UDP tunnel transport
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use avdecc::entity::CommonInformation;
//! use avdecc::testing::{entity_id, interfaces, mac_address};
//! use avdecc::{ProtocolConfig, ProtocolInterface, VirtualNetwork};
//!
//! # async fn example() -> avdecc::Result<()> {
//! let network = VirtualNetwork::new();
//! let interface = ProtocolInterface::new(
//!     Arc::new(network.create_transport(mac_address(1))),
//!     ProtocolConfig::default(),
//! )?;
//!
//! let controller = interface
//!     .create_controller_entity(
//!         CommonInformation::controller(entity_id(0xC0)),
//!         interfaces(mac_address(1)),
//!         None,
//!         None,
//!     )
//!     .await?;
//! interface.discover_remote_entities().await?;
//!
//! controller.read_entity_descriptor(entity_id(2), |status, descriptor| {
//!     println!("{status}: {descriptor:?}");
//! });
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **High-level**: [`ControllerEntity`] and [`ResponderEntity`] - typed commands and answers
//! - **Mid-level**: [`ProtocolInterface`] - one executor per transport running the state machines
//! - **Low-level**: [`protocol`] - frames, PDUs and payload schemas

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

pub mod controller;
pub mod entity;
pub mod interface;
pub mod model;
pub mod protocol;
pub mod responder;
pub mod state_machine;

// Re-exports
pub use controller::{
    AaCommandStatus, AemCommandStatus, ControlStatus, ControllerDelegate, ControllerEntity,
    MvuCommandStatus, StreamConnectionState,
};
pub use entity::{CommonInformation, Entity, InterfaceInformation, StreamIdentification};
pub use error::{AvdeccError, Result};
pub use interface::{
    EventBus, EventFilter, InterfaceError, ProtocolEvent, ProtocolInterface, Transport,
    UdpTransport, VirtualNetwork, VirtualTransport,
};
pub use model::EntityTree;
pub use responder::{AemCommandDispatcher, AemHandler, AemResponse, ResponderEntity};
pub use types::{
    AvdeccFixedString, MacAddress, PayloadPolicy, ProtocolConfig, ProtocolConfigBuilder,
    UniqueIdentifier,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AemCommandStatus, AemHandler, AvdeccError, CommonInformation, ControlStatus,
        ControllerDelegate, ControllerEntity, Entity, EntityTree, InterfaceInformation,
        MacAddress, ProtocolConfig, ProtocolEvent, ProtocolInterface, ResponderEntity,
        UniqueIdentifier, VirtualNetwork,
    };
}
