//! 64-bit EUI identifiers used for entities, entity models and associations

use std::fmt;

/// A 64-bit opaque identifier (EUI-64).
///
/// Two values are distinguished: [`UniqueIdentifier::NULL`] (all zeroes) and
/// [`UniqueIdentifier::UNINITIALIZED`] (all ones). Neither is a valid
/// identifier on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueIdentifier(u64);

impl UniqueIdentifier {
    /// The null identifier, also used as the "global" target of ADP Discover.
    pub const NULL: Self = Self(0);

    /// The default value of a freshly constructed identifier.
    pub const UNINITIALIZED: Self = Self(u64::MAX);

    /// Wrap a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw 64-bit value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether this identifier is neither null nor uninitialized.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::NULL.0 && self.0 != Self::UNINITIALIZED.0
    }

    /// Whether this is the null identifier.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    /// The OUI-24 part of the identifier (upper 24 bits).
    #[must_use]
    pub const fn vendor_id(self) -> u32 {
        // Upper 24 bits always fit in a u32
        #[allow(clippy::cast_possible_truncation)]
        let oui = (self.0 >> 40) as u32;
        oui
    }
}

impl Default for UniqueIdentifier {
    fn default() -> Self {
        Self::UNINITIALIZED
    }
}

impl From<u64> for UniqueIdentifier {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UniqueIdentifier> for u64 {
    fn from(value: UniqueIdentifier) -> Self {
        value.0
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::Debug for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniqueIdentifier(0x{:016X})", self.0)
    }
}
