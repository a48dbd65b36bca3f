//! Protocol state machines
//!
//! The machines are pure: they never read a clock and never touch a socket.
//! The caller passes the current [`Instant`](tokio::time::Instant) in and
//! supplies an [`Outbound`] sink for the frames they produce, so every timer
//! path can be driven deterministically from tests.

pub mod advertise;
pub mod command;
pub mod discovery;

#[cfg(test)]
mod tests;

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::interface::InterfaceError;
use crate::protocol::{Acmpdu, Adpdu, Aecpdu};
use crate::types::MacAddress;

pub use advertise::AdvertiseStateMachine;
pub use command::{AcmpResultHandler, AecpResultHandler, CommandStateMachine, CommandStatistic};
pub use discovery::{DiscoveryEvent, DiscoveryStateMachine};

/// Where the state machines put the frames they want sent
pub trait Outbound {
    /// Send an ADPDU from `source` to the ADP multicast address
    ///
    /// # Errors
    ///
    /// Returns the transport failure.
    fn send_adpdu(&mut self, source: MacAddress, pdu: &Adpdu) -> Result<(), InterfaceError>;

    /// Send an AECPDU to `destination`
    ///
    /// # Errors
    ///
    /// Returns the transport failure.
    fn send_aecpdu(&mut self, destination: MacAddress, pdu: &Aecpdu) -> Result<(), InterfaceError>;

    /// Send an ACMPDU to the ACMP multicast address
    ///
    /// # Errors
    ///
    /// Returns the transport failure.
    fn send_acmpdu(&mut self, pdu: &Acmpdu) -> Result<(), InterfaceError>;
}

/// Run a user callback, logging instead of unwinding into the executor
pub(crate) fn invoke_protected<T>(what: &str, callback: impl FnOnce(T), value: T) {
    if catch_unwind(AssertUnwindSafe(move || callback(value))).is_err() {
        tracing::error!("{} panicked", what);
    }
}
