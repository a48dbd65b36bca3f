use std::sync::{Arc, Mutex};

use super::Outbound;
use crate::interface::InterfaceError;
use crate::protocol::{Acmpdu, Adpdu, Aecpdu};
use crate::types::MacAddress;

mod advertise;
mod command;

/// Records every frame instead of sending it
#[derive(Default)]
struct RecordingOutbound {
    adp: Vec<(MacAddress, Adpdu)>,
    aecp: Vec<(MacAddress, Aecpdu)>,
    acmp: Vec<Acmpdu>,
    fail: bool,
}

impl RecordingOutbound {
    fn check(&self) -> Result<(), InterfaceError> {
        if self.fail {
            Err(InterfaceError::TransportError("link down".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Outbound for RecordingOutbound {
    fn send_adpdu(&mut self, source: MacAddress, pdu: &Adpdu) -> Result<(), InterfaceError> {
        self.check()?;
        self.adp.push((source, pdu.clone()));
        Ok(())
    }

    fn send_aecpdu(&mut self, destination: MacAddress, pdu: &Aecpdu) -> Result<(), InterfaceError> {
        self.check()?;
        self.aecp.push((destination, pdu.clone()));
        Ok(())
    }

    fn send_acmpdu(&mut self, pdu: &Acmpdu) -> Result<(), InterfaceError> {
        self.check()?;
        self.acmp.push(pdu.clone());
        Ok(())
    }
}

/// Shared list the completion handlers push into
type Results<T> = Arc<Mutex<Vec<Result<T, InterfaceError>>>>;

fn collector<T: Send + 'static>() -> (Results<T>, impl Fn() -> Box<dyn FnOnce(Result<T, InterfaceError>) + Send>) {
    let results: Results<T> = Arc::default();
    let shared = results.clone();
    let make = move || {
        let shared = shared.clone();
        Box::new(move |result| shared.lock().unwrap().push(result))
            as Box<dyn FnOnce(Result<T, InterfaceError>) + Send>
    };
    (results, make)
}
