use std::io;
use thiserror::Error;

use crate::interface::InterfaceError;
use crate::protocol::{PduError, SerializationError};

/// Errors that can occur while building, encoding or exchanging AVDECC messages
#[derive(Debug, Error)]
pub enum AvdeccError {
    // ===== Codec Errors =====
    /// Low-level buffer error
    #[error("serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A PDU could not be encoded or decoded
    #[error("PDU error: {0}")]
    Pdu(#[from] PduError),

    // ===== Interface Errors =====
    /// The protocol interface rejected a request
    #[error("interface error: {0}")]
    Interface(#[from] InterfaceError),

    /// Underlying socket error
    #[error("network error: {0}")]
    NetworkError(#[from] io::Error),

    // ===== Model Errors =====
    /// The entity model tree is inconsistent
    #[error("invalid entity model: {reason}")]
    InvalidEntityModel {
        /// What is wrong with the tree
        reason: String,
    },

    /// A caller supplied value is out of range
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// What is wrong with it
        message: String,
    },
}

impl AvdeccError {
    /// Check if retrying the same operation may succeed
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_)
                | Self::Interface(
                    InterfaceError::Timeout
                        | InterfaceError::TransportError(_)
                        | InterfaceError::UnknownRemoteEntity
                )
        )
    }
}

/// Result type for AVDECC operations
pub type Result<T> = std::result::Result<T, AvdeccError>;
