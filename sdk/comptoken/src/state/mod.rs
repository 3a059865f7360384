//! Account State Structures
//!
//! This module defines the data stored in the accounts the Comptoken client
//! reads, and how each one maps to raw account bytes.
//!
//! # Account Types
//!
//! | Type | Size | Description |
//! |------|------|-------------|
//! | TokenAccountData | 165 bytes + extensions | A Token-2022 comptoken wallet |
//! | UserData | 88 + 32 × (proofs − 1) bytes | Per-wallet proof and payout record |
//! | GlobalData | 5960 bytes | Blockhashes and distribution history |
//!
//! # Serialization
//!
//! All structures use the external program's exact byte layout:
//! - Little-endian for integers
//! - No implicit padding between fields (explicit padding is written as zeros)
//! - Same data always produces same bytes
//!
//! # Traits
//!
//! Every record implements [`AccountData`]. Records that can carry Token-2022
//! extensions also implement [`WithExtensions`]:
//!
//! ```ignore
//! let wallet = TokenAccountData::unpack(&data)?;         // Read
//! let bytes = wallet.to_bytes()?;                       // Write
//! let wallet = wallet.with_extension(Tlv::transfer_hook_account());
//! ```

// =============================================================================
// SUBMODULES
// =============================================================================

pub mod extension;
pub mod global_data;
pub mod layout;
pub mod record;
pub mod token;
pub mod user_data;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use extension::{ExtensionType, Tlv};
pub use global_data::{DailyDistributionData, GlobalData, HistoricDistribution, ValidBlockhashes};
pub use record::{AccountRecord, GlobalDataAccount, TokenAccount, UserDataAccount};
pub use token::{AccountState, TokenAccountData};
pub use user_data::UserData;

use crate::error::ComptokenError;

// =============================================================================
// ACCOUNT DATA TRAIT
// =============================================================================

/// Trait for packing/unpacking account data to/from bytes.
///
/// Unlike a fixed-length `Pack`, the size of a record may depend on its
/// contents (extensions, number of proofs), so it is an instance method.
pub trait AccountData: Sized {
    /// The number of bytes this value encodes to.
    fn size(&self) -> usize;

    /// Deserialize from a byte slice.
    ///
    /// Trailing bytes beyond what the layout describes are ignored.
    fn unpack(input: &[u8]) -> Result<Self, ComptokenError>;

    /// Serialize into `output` and return the number of bytes written.
    ///
    /// Implementations may assume `output` is zeroed.
    fn pack(&self, output: &mut [u8]) -> Result<usize, ComptokenError>;

    /// Pack with length validation.
    ///
    /// Fails with `SizeMismatch` if `dst.len() != self.size()` or if the
    /// encoder wrote a different number of bytes.
    fn pack_into_slice(&self, dst: &mut [u8]) -> Result<(), ComptokenError> {
        layout::check_size(self.size(), dst.len())?;
        dst.fill(0);
        let written = self.pack(dst)?;
        layout::check_size(self.size(), written)
    }

    /// Serialize into a freshly allocated buffer of `self.size()` bytes.
    fn to_bytes(&self) -> Result<Vec<u8>, ComptokenError> {
        let mut bytes = vec![0u8; self.size()];
        self.pack_into_slice(&mut bytes)?;
        Ok(bytes)
    }
}

// =============================================================================
// EXTENSIONS CAPABILITY
// =============================================================================

/// Records that may carry a Token-2022 extension region after a fixed body.
///
/// The extension list itself lives in the implementing struct; the
/// encoding rules are the shared functions in [`extension`].
pub trait WithExtensions: AccountData {
    /// Size of the fixed body, which is also where the region starts.
    const BASE_LEN: usize;

    /// Discriminator written before the first extension.
    const ACCOUNT_TYPE: u8;

    fn extensions(&self) -> &[Tlv];

    fn extensions_mut(&mut self) -> &mut Vec<Tlv>;

    /// Append extensions in order. Duplicate types are allowed.
    fn add_extensions<I>(&mut self, extensions: I) -> &mut Self
    where
        I: IntoIterator<Item = Tlv>,
    {
        self.extensions_mut().extend(extensions);
        self
    }

    /// Builder form of [`WithExtensions::add_extensions`] for one entry.
    fn with_extension(mut self, extension: Tlv) -> Self {
        self.extensions_mut().push(extension);
        self
    }

    /// Size of the body plus extension region.
    fn size_with_extensions(&self) -> usize {
        extension::size_with_extensions(Self::BASE_LEN, self.extensions())
    }
}

// =============================================================================
// COPTION - COMPACT OPTIONAL TYPE
// =============================================================================

/// An optional value with the fixed layout used by the token program.
///
/// # Layout
///
/// ```text
/// COption<Pubkey>: 36 bytes
/// [tag: 4 bytes, little-endian u32][value: 32 bytes]
///
/// Tag = 0: None (value bytes are zeros)
/// Tag = 1: Some (value bytes contain the Pubkey)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct COption<T> {
    value: Option<T>,
}

impl<T> COption<T> {
    pub fn some(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub fn none() -> Self {
        Self { value: None }
    }

    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    /// Get a reference to the inner value, if present.
    pub fn as_ref(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T> From<Option<T>> for COption<T> {
    fn from(opt: Option<T>) -> Self {
        Self { value: opt }
    }
}

impl<T> From<COption<T>> for Option<T> {
    fn from(copt: COption<T>) -> Self {
        copt.value
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Claims `size` bytes but writes `writes`.
    struct Fixed {
        size: usize,
        writes: usize,
    }

    impl AccountData for Fixed {
        fn size(&self) -> usize {
            self.size
        }

        fn unpack(_input: &[u8]) -> Result<Self, ComptokenError> {
            Ok(Fixed { size: 0, writes: 0 })
        }

        fn pack(&self, output: &mut [u8]) -> Result<usize, ComptokenError> {
            let mut writer = layout::ByteWriter::new(output);
            writer.write_zeros(self.writes)?;
            Ok(writer.offset())
        }
    }

    #[test]
    fn test_to_bytes_checks_written_size() {
        assert_eq!(Fixed { size: 8, writes: 8 }.to_bytes().unwrap(), vec![0u8; 8]);
        assert_eq!(
            Fixed { size: 8, writes: 5 }.to_bytes().unwrap_err(),
            ComptokenError::SizeMismatch { expected: 8, actual: 5 }
        );
    }

    #[test]
    fn test_pack_into_slice_checks_both_lengths() {
        let mut dst = [0xffu8; 8];
        assert_eq!(
            Fixed { size: 8, writes: 8 }.pack_into_slice(&mut dst[..7]).unwrap_err(),
            ComptokenError::SizeMismatch { expected: 8, actual: 7 }
        );
        assert_eq!(
            Fixed { size: 8, writes: 3 }.pack_into_slice(&mut dst).unwrap_err(),
            ComptokenError::SizeMismatch { expected: 8, actual: 3 }
        );

        Fixed { size: 8, writes: 8 }.pack_into_slice(&mut dst).unwrap();
        assert_eq!(dst, [0u8; 8]);
    }
}

/*
=============================================================================
DETAILED EXPLANATION
=============================================================================

WHY SIZE IS AN INSTANCE METHOD
==============================

A plain SPL token account is always 165 bytes, so a `const LEN` is enough.
The records read by this client are not:

- A Token-2022 wallet grows by 1 byte (account type) plus 4 + length bytes
  per extension.
- UserData grows by 32 bytes per stored proof.

So `size()` looks at the value. `to_bytes()` allocates exactly that many
bytes and `pack()` reports how many it wrote. Writing past the end, or
stopping short of `size()`, is a SizeMismatch.

THE EXTENSIONS CAPABILITY
=========================

Only the token account has an extension region, but the rules for the
region (account type byte, TLV list, the 355 -> 359 padding) belong to
Token-2022 rather than to the token account. They live in `extension.rs`
as free functions, and the `WithExtensions` trait wires a record's own
`Vec<Tlv>` to them.
*/
