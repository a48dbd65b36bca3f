//! Fixed-capacity big-endian serializer and bounds-checked deserializer.
//!
//! Every AVDECC PDU has a hard maximum length, so the write side is a
//! stack buffer whose capacity is a const generic. Each append validates the
//! remaining capacity before touching the buffer, so a failed write never
//! leaves a partially written field behind.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::types::{AvdeccFixedString, MacAddress, UniqueIdentifier};

/// Codec errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerializationError {
    /// Write would exceed the buffer capacity
    #[error("buffer overflow: need {needed} bytes, {available} available")]
    BufferOverflow {
        /// Bytes the write required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Read would go past the end of the data
    #[error("insufficient data: need {needed} bytes, {remaining} remaining")]
    InsufficientData {
        /// Bytes the read required
        needed: usize,
        /// Bytes left to read
        remaining: usize,
    },
}

/// Values that know how to write themselves onto a [`Serializer`].
pub trait Pack {
    /// Append `self` to the serializer.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::BufferOverflow`] if the value does not fit.
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError>;
}

/// Values that know how to read themselves from a [`Deserializer`].
pub trait Unpack: Sized {
    /// Read a value from the deserializer.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::InsufficientData`] if the data is too short.
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError>;
}

/// Fixed-capacity write buffer
#[derive(Clone)]
pub struct Serializer<const N: usize> {
    buffer: [u8; N],
    pos: usize,
}

impl<const N: usize> Default for Serializer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> std::fmt::Debug for Serializer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializer")
            .field("capacity", &N)
            .field("used", &self.pos)
            .finish()
    }
}

impl<const N: usize> Serializer<N> {
    /// Total capacity in bytes
    pub const CAPACITY: usize = N;

    /// Create an empty serializer
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: [0u8; N],
            pos: 0,
        }
    }

    /// Bytes written so far
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.pos
    }

    /// Bytes still available
    #[must_use]
    pub fn remaining(&self) -> usize {
        N - self.pos
    }

    /// The written portion of the buffer
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.pos]
    }

    /// Claim `len` bytes at the current position.
    fn reserve(&mut self, len: usize) -> Result<&mut [u8], SerializationError> {
        if len > self.remaining() {
            return Err(SerializationError::BufferOverflow {
                needed: len,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&mut self.buffer[start..self.pos])
    }

    /// Append a byte
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when full.
    pub fn write_u8(&mut self, value: u8) -> Result<&mut Self, SerializationError> {
        self.reserve(1)?[0] = value;
        Ok(self)
    }

    /// Append a signed byte
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when full.
    pub fn write_i8(&mut self, value: i8) -> Result<&mut Self, SerializationError> {
        self.write_u8(value.to_be_bytes()[0])
    }

    /// Append a big-endian u16
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when full.
    pub fn write_u16(&mut self, value: u16) -> Result<&mut Self, SerializationError> {
        BigEndian::write_u16(self.reserve(2)?, value);
        Ok(self)
    }

    /// Append a big-endian u32
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when full.
    pub fn write_u32(&mut self, value: u32) -> Result<&mut Self, SerializationError> {
        BigEndian::write_u32(self.reserve(4)?, value);
        Ok(self)
    }

    /// Append a big-endian u64
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when full.
    pub fn write_u64(&mut self, value: u64) -> Result<&mut Self, SerializationError> {
        BigEndian::write_u64(self.reserve(8)?, value);
        Ok(self)
    }

    /// Append raw bytes without byte swapping
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when the bytes do not fit.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, SerializationError> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(self)
    }

    /// Append `count` zero bytes
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when the bytes do not fit.
    pub fn write_zeroes(&mut self, count: usize) -> Result<&mut Self, SerializationError> {
        self.reserve(count)?.fill(0);
        Ok(self)
    }

    /// Append any [`Pack`] value
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` when the value does not fit.
    pub fn pack<T: Pack>(&mut self, value: &T) -> Result<&mut Self, SerializationError> {
        value.pack(self)?;
        Ok(self)
    }

    /// Overwrite a u16 at an already-written position.
    ///
    /// # Errors
    ///
    /// Fails with `BufferOverflow` if `offset` is outside the written data.
    pub fn patch_u16(&mut self, offset: usize, value: u16) -> Result<(), SerializationError> {
        if offset + 2 > self.pos {
            return Err(SerializationError::BufferOverflow {
                needed: offset + 2,
                available: self.pos,
            });
        }
        BigEndian::write_u16(&mut self.buffer[offset..offset + 2], value);
        Ok(())
    }
}

/// Bounds-checked reader over a borrowed slice
#[derive(Debug, Clone)]
pub struct Deserializer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Deserializer<'a> {
    /// Wrap a byte slice
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Total length of the underlying data
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The unread part of the data
    #[must_use]
    pub fn remaining_data(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Move the read cursor to an absolute position.
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` when `pos` is past the end.
    pub fn set_position(&mut self, pos: usize) -> Result<(), SerializationError> {
        if pos > self.data.len() {
            return Err(SerializationError::InsufficientData {
                needed: pos,
                remaining: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SerializationError> {
        if len > self.remaining() {
            return Err(SerializationError::InsufficientData {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.data[start..self.pos])
    }

    /// Read a byte
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` at end of data.
    pub fn read_u8(&mut self) -> Result<u8, SerializationError> {
        Ok(self.take(1)?[0])
    }

    /// Read a signed byte
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` at end of data.
    pub fn read_i8(&mut self) -> Result<i8, SerializationError> {
        Ok(i8::from_be_bytes([self.read_u8()?]))
    }

    /// Read a big-endian u16
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` when fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16, SerializationError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    /// Read a big-endian u32
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` when fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, SerializationError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    /// Read a big-endian u64
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` when fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> Result<u64, SerializationError> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Borrow the next `len` bytes verbatim
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` when fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SerializationError> {
        self.take(len)
    }

    /// Copy the next `M` bytes into an array
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` when fewer than `M` bytes remain.
    pub fn read_array<const M: usize>(&mut self) -> Result<[u8; M], SerializationError> {
        let mut out = [0u8; M];
        out.copy_from_slice(self.take(M)?);
        Ok(out)
    }

    /// Skip `len` bytes
    ///
    /// # Errors
    ///
    /// Fails with `InsufficientData` when fewer than `len` bytes remain.
    pub fn skip(&mut self, len: usize) -> Result<(), SerializationError> {
        self.take(len).map(|_| ())
    }

    /// Read any [`Unpack`] value
    ///
    /// # Errors
    ///
    /// Propagates the value's own read error.
    pub fn unpack<T: Unpack>(&mut self) -> Result<T, SerializationError> {
        T::unpack(self)
    }
}

// ===== Pack/Unpack for core types =====

impl Pack for UniqueIdentifier {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        ser.write_u64(self.value()).map(|_| ())
    }
}

impl Unpack for UniqueIdentifier {
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError> {
        des.read_u64().map(Self::new)
    }
}

impl Pack for MacAddress {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        ser.write_bytes(&self.0).map(|_| ())
    }
}

impl Unpack for MacAddress {
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError> {
        des.read_array::<6>().map(Self)
    }
}

impl Pack for AvdeccFixedString {
    fn pack<const N: usize>(&self, ser: &mut Serializer<N>) -> Result<(), SerializationError> {
        ser.write_bytes(self.as_bytes()).map(|_| ())
    }
}

impl Unpack for AvdeccFixedString {
    fn unpack(des: &mut Deserializer<'_>) -> Result<Self, SerializationError> {
        des.read_array::<{ AvdeccFixedString::SIZE }>()
            .map(AvdeccFixedString::from_raw)
    }
}
