//! User hook for AEM commands the built-in handler does not answer

use crate::entity::Entity;
use crate::protocol::AemAecpdu;
use crate::protocol::defines::AemAecpStatus;

/// Answer produced by an [`AemCommandDispatcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AemResponse {
    /// Response status
    pub status: AemAecpStatus,
    /// Response payload; `None` reflects the command payload
    pub payload: Option<Vec<u8>>,
}

impl AemResponse {
    /// Successful response carrying `payload`
    #[must_use]
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: AemAecpStatus::SUCCESS,
            payload: Some(payload),
        }
    }

    /// Response reflecting the command payload with `status`
    #[must_use]
    pub fn reflect(status: AemAecpStatus) -> Self {
        Self {
            status,
            payload: None,
        }
    }
}

/// Handles AEM commands addressed to a local entity that are not covered by
/// [`AemHandler`](super::AemHandler).
///
/// Runs on the interface executor, so implementations must return quickly.
pub trait AemCommandDispatcher: Send + Sync {
    /// Answer `command`, or return `None` to reply `NOT_IMPLEMENTED`
    fn handle_aem_command(&self, entity: &Entity, command: &AemAecpdu) -> Option<AemResponse>;
}
