//! Event bus for protocol interface events

use futures::Stream;
use tokio::sync::broadcast;

use crate::entity::Entity;
use crate::protocol::{Acmpdu, Aecpdu, PduError};
use crate::state_machine::CommandStatistic;
use crate::types::{MacAddress, UniqueIdentifier};

/// Protocol interface events
#[derive(Debug, Clone)]
pub enum ProtocolEvent {
    // Remote entities
    /// A remote entity was discovered
    RemoteEntityOnline {
        /// The discovered entity
        entity: Entity,
    },
    /// A remote entity advertised changed fields
    RemoteEntityUpdated {
        /// The entity after the change
        entity: Entity,
    },
    /// A remote entity departed, expired or was forgotten
    RemoteEntityOffline {
        /// ID of the lost entity
        entity_id: UniqueIdentifier,
    },

    // Local entity events
    /// A local entity was registered on the interface
    LocalEntityOnline {
        /// Local entity ID
        entity_id: UniqueIdentifier,
    },
    /// A local entity was removed from the interface
    LocalEntityOffline {
        /// Local entity ID
        entity_id: UniqueIdentifier,
    },

    // Message events
    /// An unsolicited AECP response addressed to a local controller
    UnsolicitedResponse {
        /// The notification
        aecpdu: Aecpdu,
    },
    /// An IDENTIFY notification seen on the link
    IdentifyNotification {
        /// The notification
        aecpdu: Aecpdu,
    },
    /// Any ACMP response seen on the link
    AcmpResponseSniffed {
        /// The response
        acmpdu: Acmpdu,
    },
    /// A frame that could not be decoded
    MalformedFrame {
        /// Sender
        source: MacAddress,
        /// Why it was dropped
        error: PduError,
    },

    // Statistics events
    /// Command correlation counter
    Statistic(CommandStatistic),

    // Failures
    /// Transport failure while receiving
    TransportError {
        /// What the transport reported
        message: String,
    },
}

/// Fan-out of interface events to every subscriber
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ProtocolEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// New receiver seeing events emitted from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProtocolEvent> {
        self.tx.subscribe()
    }

    /// Publish `event` to current subscribers
    pub fn emit(&self, event: ProtocolEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live receivers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Receiver that skips events its predicate rejects
pub struct EventFilter {
    rx: broadcast::Receiver<ProtocolEvent>,
    filter: Box<dyn Fn(&ProtocolEvent) -> bool + Send>,
}

impl EventFilter {
    /// Subscribe to `bus`, keeping events for which `filter` returns true
    pub fn new<F>(bus: &EventBus, filter: F) -> Self
    where
        F: Fn(&ProtocolEvent) -> bool + Send + 'static,
    {
        Self {
            rx: bus.subscribe(),
            filter: Box::new(filter),
        }
    }

    /// Next matching event, or `None` once the bus is gone.
    ///
    /// Lagging is logged and skipped.
    pub async fn recv(&mut self) -> Option<ProtocolEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if (self.filter)(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Event filter lagged by {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Matching events as a stream that ends when the bus is dropped
    pub fn into_stream(self) -> impl Stream<Item = ProtocolEvent> + Send {
        futures::stream::unfold(self, |mut filter| async move {
            let event = filter.recv().await?;
            Some((event, filter))
        })
    }
}

impl EventFilter {
    /// Filter for remote entity discovery events only
    #[must_use]
    pub fn discovery_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| {
            matches!(
                e,
                ProtocolEvent::RemoteEntityOnline { .. }
                    | ProtocolEvent::RemoteEntityUpdated { .. }
                    | ProtocolEvent::RemoteEntityOffline { .. }
            )
        })
    }

    /// Filter for statistics events only
    #[must_use]
    pub fn statistics_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| matches!(e, ProtocolEvent::Statistic(_)))
    }

    /// Transport failures and malformed frames
    #[must_use]
    pub fn error_events(bus: &EventBus) -> Self {
        Self::new(bus, |e| {
            matches!(
                e,
                ProtocolEvent::TransportError { .. } | ProtocolEvent::MalformedFrame { .. }
            )
        })
    }
}
