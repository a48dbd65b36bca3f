use thiserror::Error;

/// Errors reported by a [`ProtocolInterface`](super::ProtocolInterface) and
/// delivered to command completion handlers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterfaceError {
    /// The transport failed to send or receive a frame
    #[error("transport error: {0}")]
    TransportError(String),

    /// No response arrived, including after the retry
    #[error("command timed out")]
    Timeout,

    /// The target is not in the discovered entities table
    #[error("unknown remote entity")]
    UnknownRemoteEntity,

    /// The sender is not a registered local entity
    #[error("unknown local entity")]
    UnknownLocalEntity,

    /// The local entity cannot issue this kind of message
    #[error("invalid entity type")]
    InvalidEntityType,

    /// A local or remote entity already uses this entity ID
    #[error("duplicate local entity ID")]
    DuplicateLocalEntityId,

    /// The message kind is not supported by this interface
    #[error("message not supported")]
    MessageNotSupported,

    /// The peer answered with a response that does not match the command
    #[error("base protocol violation")]
    BaseProtocolViolation,

    /// The command was pending when its entity or interface shut down
    #[error("aborted")]
    Aborted,

    /// The interface executor is not running
    #[error("interface not running")]
    InterfaceNotRunning,

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    InternalError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(InterfaceError::Timeout.to_string(), "command timed out");
        assert_eq!(
            InterfaceError::TransportError("link down".to_string()).to_string(),
            "transport error: link down"
        );
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<InterfaceError>();
    }
}
