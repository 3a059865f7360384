//! Binary Layout Primitives
//!
//! Bounds-checked little-endian readers and writers shared by every
//! account codec in [`crate::state`].
//!
//! The fixed-size parts of each record are split with `arrayref`, the same
//! way the token program splits its 165-byte account. These helpers cover
//! the parts that are not known at compile time: a buffer that may be too
//! short, a declared number of trailing proofs, or an extension region.
//!
//! # Conventions
//!
//! - Integers are little-endian.
//! - A `bool` is one byte, `0` or `1`; any other value reads as `true`.
//! - Optional values always occupy their full width: a presence tag followed
//!   by the value, zero-filled when absent.

use crate::error::ComptokenError;
use crate::state::COption;
use arrayref::{array_refs, mut_array_refs};
use solana_program::{hash::Hash, pubkey::Pubkey};

// =============================================================================
// READER
// =============================================================================

/// A cursor over an input buffer.
///
/// Every read returns `TruncatedBuffer` instead of panicking when the
/// buffer is too short.
#[derive(Clone, Copy, Debug)]
pub struct ByteReader<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Start reading at `offset`.
    pub fn at(input: &'a [u8], offset: usize) -> Self {
        Self { input, offset }
    }

    /// Number of bytes consumed so far, counted from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.input.len().saturating_sub(self.offset)
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ComptokenError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| self.truncated(len))?;
        let bytes = &self.input[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    /// Borrow the next `N` bytes as a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<&'a [u8; N], ComptokenError> {
        let truncated = self.truncated(N);
        self.read_bytes(N)?.try_into().map_err(|_| truncated)
    }

    fn truncated(&self, needed: usize) -> ComptokenError {
        ComptokenError::TruncatedBuffer {
            offset: self.offset,
            needed,
            available: self.remaining(),
        }
    }

    /// Skip `len` bytes of padding.
    pub fn skip(&mut self, len: usize) -> Result<(), ComptokenError> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, ComptokenError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ComptokenError> {
        Ok(u16::from_le_bytes(*self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ComptokenError> {
        Ok(u32::from_le_bytes(*self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, ComptokenError> {
        Ok(u64::from_le_bytes(*self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, ComptokenError> {
        Ok(i64::from_le_bytes(*self.read_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, ComptokenError> {
        Ok(f64::from_le_bytes(*self.read_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, ComptokenError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey, ComptokenError> {
        Ok(Pubkey::new_from_array(*self.read_array()?))
    }

    pub fn read_hash(&mut self) -> Result<Hash, ComptokenError> {
        Ok(Hash::new_from_array(*self.read_array()?))
    }
}

// =============================================================================
// WRITER
// =============================================================================

/// A cursor over an output buffer.
///
/// Writing past the end of the buffer is a `SizeMismatch`: the caller sized
/// the buffer from `size()`, so running out of room means the two disagree.
#[derive(Debug)]
pub struct ByteWriter<'a> {
    output: &'a mut [u8],
    offset: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(output: &'a mut [u8]) -> Self {
        Self { output, offset: 0 }
    }

    pub fn at(output: &'a mut [u8], offset: usize) -> Self {
        Self { output, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ComptokenError> {
        let end = self.offset + bytes.len();
        if end > self.output.len() {
            return Err(ComptokenError::SizeMismatch {
                expected: self.output.len(),
                actual: end,
            });
        }
        self.output[self.offset..end].copy_from_slice(bytes);
        self.offset = end;
        Ok(())
    }

    /// Write `len` zero bytes.
    pub fn write_zeros(&mut self, len: usize) -> Result<(), ComptokenError> {
        let end = self.offset + len;
        if end > self.output.len() {
            return Err(ComptokenError::SizeMismatch {
                expected: self.output.len(),
                actual: end,
            });
        }
        self.output[self.offset..end].fill(0);
        self.offset = end;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), ComptokenError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), ComptokenError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), ComptokenError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<(), ComptokenError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<(), ComptokenError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), ComptokenError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), ComptokenError> {
        self.write_u8(value as u8)
    }

    pub fn write_pubkey(&mut self, value: &Pubkey) -> Result<(), ComptokenError> {
        self.write_bytes(value.as_ref())
    }

    pub fn write_hash(&mut self, value: &Hash) -> Result<(), ComptokenError> {
        self.write_bytes(value.as_ref())
    }
}

/// Fail with `SizeMismatch` unless exactly `expected` bytes were produced.
pub fn check_size(expected: usize, actual: usize) -> Result<(), ComptokenError> {
    if expected != actual {
        return Err(ComptokenError::SizeMismatch { expected, actual });
    }
    Ok(())
}

// =============================================================================
// OPTIONAL FIELDS
// =============================================================================
//
// The token account stores its optional fields as a 4-byte little-endian tag
// followed by the full-width value. Tag 0 is None, tag 1 is Some.

/// Unpack `COption<Pubkey>` from 36 bytes.
///
/// Layout: [tag: 4 bytes][pubkey: 32 bytes]
pub fn unpack_coption_pubkey(src: &[u8; 36]) -> Result<COption<Pubkey>, ComptokenError> {
    let (tag, body) = array_refs![src, 4, 32];

    match u32::from_le_bytes(*tag) {
        0 => Ok(COption::none()),
        1 => Ok(COption::some(Pubkey::new_from_array(*body))),
        other => Err(ComptokenError::InvalidOptionTag(other)),
    }
}

/// Pack `COption<Pubkey>` into 36 bytes.
pub fn pack_coption_pubkey(src: &COption<Pubkey>, dst: &mut [u8; 36]) {
    let (tag, body) = mut_array_refs![dst, 4, 32];

    match src.as_ref() {
        Some(pubkey) => {
            *tag = 1u32.to_le_bytes();
            body.copy_from_slice(pubkey.as_ref());
        }
        None => {
            *tag = 0u32.to_le_bytes();
            body.fill(0);
        }
    }
}

/// Unpack `COption<u64>` from 12 bytes.
///
/// Layout: [tag: 4 bytes][value: 8 bytes]
pub fn unpack_coption_u64(src: &[u8; 12]) -> Result<COption<u64>, ComptokenError> {
    let (tag, body) = array_refs![src, 4, 8];

    match u32::from_le_bytes(*tag) {
        0 => Ok(COption::none()),
        1 => Ok(COption::some(u64::from_le_bytes(*body))),
        other => Err(ComptokenError::InvalidOptionTag(other)),
    }
}

/// Pack `COption<u64>` into 12 bytes.
pub fn pack_coption_u64(src: &COption<u64>, dst: &mut [u8; 12]) {
    let (tag, body) = mut_array_refs![dst, 4, 8];

    match src.as_ref() {
        Some(value) => {
            *tag = 1u32.to_le_bytes();
            *body = value.to_le_bytes();
        }
        None => {
            *tag = 0u32.to_le_bytes();
            body.fill(0);
        }
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
