//! Command status vocabularies reported to completion handlers
//!
//! Each status carries the wire codes of its protocol plus the library codes
//! 990 to 999 for failures detected locally.

use std::fmt;

use crate::interface::InterfaceError;
use crate::protocol::defines::{AaAecpStatus, AcmpStatus, AemAecpStatus, MvuAecpStatus};

macro_rules! command_status {
    (
        $(#[$meta:meta])*
        $name:ident from $wire:ty {
            $( $code:ident = $value:literal => $label:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u16);

        impl $name {
            $(
                #[doc = $label]
                pub const $code: Self = Self($value);
            )*
            /// The local entity went away or the interface shut down
            pub const ABORTED: Self = Self(990);
            /// The response did not match the command that was sent
            pub const BASE_PROTOCOL_VIOLATION: Self = Self(991);
            /// The frame could not be sent or the interface is gone
            pub const NETWORK_ERROR: Self = Self(995);
            /// The command could not be built or the response could not be decoded
            pub const PROTOCOL_ERROR: Self = Self(996);
            /// No response after the retry
            pub const TIMED_OUT: Self = Self(997);
            /// Target or local entity unknown
            pub const UNKNOWN_ENTITY: Self = Self(998);
            /// Unexpected library failure
            pub const INTERNAL_ERROR: Self = Self(999);

            /// Numeric code
            #[must_use]
            pub const fn value(self) -> u16 {
                self.0
            }

            /// Whether the command succeeded
            #[must_use]
            pub const fn is_success(self) -> bool {
                self.0 == 0
            }

            /// Human-readable description, `None` for unknown codes
            #[must_use]
            pub fn description(self) -> Option<&'static str> {
                match self.0 {
                    $( $value => Some($label), )*
                    990 => Some("Aborted"),
                    991 => Some("Base protocol violation"),
                    995 => Some("Network error"),
                    996 => Some("Protocol error"),
                    997 => Some("Timed out"),
                    998 => Some("Unknown entity"),
                    999 => Some("Internal error"),
                    _ => None,
                }
            }
        }

        impl From<$wire> for $name {
            fn from(status: $wire) -> Self {
                Self(u16::from(status.value()))
            }
        }

        impl From<InterfaceError> for $name {
            fn from(error: InterfaceError) -> Self {
                match error {
                    InterfaceError::TransportError(_) | InterfaceError::InterfaceNotRunning => {
                        Self::NETWORK_ERROR
                    }
                    InterfaceError::Timeout => Self::TIMED_OUT,
                    InterfaceError::UnknownRemoteEntity | InterfaceError::UnknownLocalEntity => {
                        Self::UNKNOWN_ENTITY
                    }
                    InterfaceError::BaseProtocolViolation => Self::BASE_PROTOCOL_VIOLATION,
                    InterfaceError::Aborted => Self::ABORTED,
                    InterfaceError::MessageNotSupported => Self::PROTOCOL_ERROR,
                    InterfaceError::InvalidEntityType
                    | InterfaceError::DuplicateLocalEntityId
                    | InterfaceError::InternalError(_) => Self::INTERNAL_ERROR,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.description() {
                    Some(description) => f.write_str(description),
                    None => write!(f, "Unknown status ({})", self.0),
                }
            }
        }
    };
}

command_status! {
    /// Outcome of an AEM command
    AemCommandStatus from AemAecpStatus {
        SUCCESS = 0 => "Success",
        NOT_IMPLEMENTED = 1 => "Not implemented",
        NO_SUCH_DESCRIPTOR = 2 => "No such descriptor",
        LOCKED_BY_OTHER = 3 => "Locked by another controller",
        ACQUIRED_BY_OTHER = 4 => "Acquired by another controller",
        NOT_AUTHENTICATED = 5 => "Not authenticated",
        AUTHENTICATION_DISABLED = 6 => "Authentication disabled",
        BAD_ARGUMENTS = 7 => "Bad arguments",
        NO_RESOURCES = 8 => "No resources",
        IN_PROGRESS = 9 => "In progress",
        ENTITY_MISBEHAVING = 10 => "Entity misbehaving",
        NOT_SUPPORTED = 11 => "Not supported",
        STREAM_IS_RUNNING = 12 => "Stream is running",
    }
}

command_status! {
    /// Outcome of an ADDRESS_ACCESS command
    AaCommandStatus from AaAecpStatus {
        SUCCESS = 0 => "Success",
        NOT_IMPLEMENTED = 1 => "Not implemented",
        ADDRESS_TOO_LOW = 2 => "Address too low",
        ADDRESS_TOO_HIGH = 3 => "Address too high",
        ADDRESS_INVALID = 4 => "Address invalid",
        TLV_INVALID = 5 => "TLV invalid",
        DATA_INVALID = 6 => "Data invalid",
        UNSUPPORTED = 7 => "Unsupported",
    }
}

command_status! {
    /// Outcome of a Milan vendor-unique command
    MvuCommandStatus from MvuAecpStatus {
        SUCCESS = 0 => "Success",
        NOT_IMPLEMENTED = 1 => "Not implemented",
        BAD_ARGUMENTS = 2 => "Bad arguments",
        ENTITY_MISBEHAVING = 10 => "Entity misbehaving",
    }
}

command_status! {
    /// Outcome of an ACMP command
    ControlStatus from AcmpStatus {
        SUCCESS = 0 => "Success",
        LISTENER_UNKNOWN_ID = 1 => "Listener unknown ID",
        TALKER_UNKNOWN_ID = 2 => "Talker unknown ID",
        TALKER_DEST_MAC_FAIL = 3 => "Talker destination MAC failure",
        TALKER_NO_STREAM_INDEX = 4 => "Talker has no such stream",
        TALKER_NO_BANDWIDTH = 5 => "Talker has no bandwidth",
        TALKER_EXCLUSIVE = 6 => "Talker exclusive",
        LISTENER_TALKER_TIMEOUT = 7 => "Listener timed out waiting for talker",
        LISTENER_EXCLUSIVE = 8 => "Listener exclusive",
        STATE_UNAVAILABLE = 9 => "State unavailable",
        NOT_CONNECTED = 10 => "Not connected",
        NO_SUCH_CONNECTION = 11 => "No such connection",
        COULD_NOT_SEND_MESSAGE = 12 => "Could not send message",
        TALKER_MISBEHAVING = 13 => "Talker misbehaving",
        LISTENER_MISBEHAVING = 14 => "Listener misbehaving",
        CONTROLLER_NOT_AUTHORIZED = 16 => "Controller not authorized",
        INCOMPATIBLE_REQUEST = 17 => "Incompatible request",
        NOT_SUPPORTED = 31 => "Not supported",
    }
}
