//! 64-byte fixed-length UTF-8 strings used for entity model names

use std::fmt;

/// A NUL-padded 64-byte string as carried in descriptors and SET_NAME.
///
/// The wire value is not required to contain a terminator: a full 64 byte
/// name is valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvdeccFixedString([u8; 64]);

impl AvdeccFixedString {
    /// Size on the wire
    pub const SIZE: usize = 64;

    /// Wrap raw wire bytes
    #[must_use]
    pub const fn from_raw(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Build from a `&str`, truncating to 64 bytes on a character boundary.
    #[must_use]
    pub fn new(s: &str) -> Self {
        let mut bytes = [0u8; 64];
        let mut end = s.len().min(Self::SIZE);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        bytes[..end].copy_from_slice(&s.as_bytes()[..end]);
        Self(bytes)
    }

    /// Raw wire bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Number of bytes before the first NUL
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(Self::SIZE)
    }

    /// Whether the string is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// Decoded text, replacing invalid UTF-8 sequences
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0[..self.len()]).into_owned()
    }
}

impl Default for AvdeccFixedString {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl From<&str> for AvdeccFixedString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for AvdeccFixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for AvdeccFixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}
