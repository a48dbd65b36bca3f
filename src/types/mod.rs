//! Core types module

pub mod config;
pub mod fixed_string;
pub mod mac_address;
pub mod unique_identifier;

#[cfg(test)]
mod tests;

pub use config::{PayloadPolicy, ProtocolConfig, ProtocolConfigBuilder};
pub use fixed_string::AvdeccFixedString;
pub use mac_address::{MacAddress, ParseMacAddressError};
pub use unique_identifier::UniqueIdentifier;
