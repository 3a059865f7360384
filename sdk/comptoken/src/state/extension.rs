//! Token-2022 Extension Records (TLV)
//!
//! Token-2022 accounts may carry extensions after their fixed 165-byte body.
//! The extension region starts with a one-byte account type, followed by a
//! list of Type-Length-Value entries.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────────────────────┐
//! │ 0..165       │ 165          │ 166..                               │
//! │ base account │ account type │ [type u16][length u16][value] ...   │
//! └──────────────┴──────────────┴─────────────────────────────────────┘
//! ```
//!
//! Comptoken wallets carry a single `TransferHookAccount` extension, which
//! makes them 165 + 1 + 4 + 1 = 171 bytes.

use crate::error::ComptokenError;
use crate::state::layout::{ByteReader, ByteWriter};
use solana_program::pubkey::Pubkey;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Offset of the account-type byte, directly after the base account.
pub const EXTENSIONS_START_INDEX: usize = 165;

/// Size of the type and length header of every TLV entry.
pub const TLV_HEADER_LEN: usize = 4;

/// Computed size that the external program pads with an empty
/// `Uninitialized` entry.
const PADDED_SIZE_TRIGGER: usize = 355;

// =============================================================================
// EXTENSION TYPE
// =============================================================================

/// Known extension type numbers, as assigned by SPL Token-2022.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum ExtensionType {
    Uninitialized = 0,
    TransferFeeConfig = 1,
    TransferFeeAmount = 2,
    MintCloseAuthority = 3,
    ConfidentialTransferMint = 4,
    ConfidentialTransferAccount = 5,
    DefaultAccountState = 6,
    ImmutableOwner = 7,
    MemoTransfer = 8,
    NonTransferable = 9,
    InterestBearingConfig = 10,
    CpiGuard = 11,
    PermanentDelegate = 12,
    NonTransferableAccount = 13,
    TransferHook = 14,
    TransferHookAccount = 15,
    MetadataPointer = 18,
    TokenMetadata = 19,
    GroupPointer = 20,
    TokenGroup = 21,
    GroupMemberPointer = 22,
    TokenGroupMember = 23,
}

impl ExtensionType {
    /// Look up a known extension type.
    ///
    /// Returns `None` for numbers this crate does not know about; such
    /// entries are still decoded and re-encoded unchanged.
    pub fn from_u16(value: u16) -> Option<Self> {
        use ExtensionType::*;
        Some(match value {
            0 => Uninitialized,
            1 => TransferFeeConfig,
            2 => TransferFeeAmount,
            3 => MintCloseAuthority,
            4 => ConfidentialTransferMint,
            5 => ConfidentialTransferAccount,
            6 => DefaultAccountState,
            7 => ImmutableOwner,
            8 => MemoTransfer,
            9 => NonTransferable,
            10 => InterestBearingConfig,
            11 => CpiGuard,
            12 => PermanentDelegate,
            13 => NonTransferableAccount,
            14 => TransferHook,
            15 => TransferHookAccount,
            18 => MetadataPointer,
            19 => TokenMetadata,
            20 => GroupPointer,
            21 => TokenGroup,
            22 => GroupMemberPointer,
            23 => TokenGroupMember,
            _ => return None,
        })
    }

    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

// =============================================================================
// TLV ENTRY
// =============================================================================

/// One extension entry.
///
/// `extension_type` is kept as the raw number so unknown types survive a
/// decode/encode cycle. Invariant: `value.len() == length`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    extension_type: u16,
    value: Vec<u8>,
}

impl Tlv {
    /// Build an entry from a raw type number and value.
    ///
    /// Fails with `SizeMismatch` if the value does not fit a u16 length.
    pub fn new(extension_type: u16, value: Vec<u8>) -> Result<Self, ComptokenError> {
        if value.len() > u16::MAX as usize {
            return Err(ComptokenError::SizeMismatch {
                expected: u16::MAX as usize,
                actual: value.len(),
            });
        }
        Ok(Self {
            extension_type,
            value,
        })
    }

    /// The empty entry the external program uses as padding.
    pub fn uninitialized() -> Self {
        Self {
            extension_type: ExtensionType::Uninitialized.to_u16(),
            value: Vec::new(),
        }
    }

    /// Mint-side transfer hook: 32-byte authority then 32-byte program id.
    ///
    /// A missing authority is stored as the default (all-zero) key.
    pub fn transfer_hook(program_id: &Pubkey, authority: Option<&Pubkey>) -> Self {
        let authority = authority.copied().unwrap_or_default();
        let mut value = Vec::with_capacity(64);
        value.extend_from_slice(authority.as_ref());
        value.extend_from_slice(program_id.as_ref());
        Self {
            extension_type: ExtensionType::TransferHook.to_u16(),
            value,
        }
    }

    /// Account-side transfer hook marker: one zero byte ("not transferring").
    pub fn transfer_hook_account() -> Self {
        Self {
            extension_type: ExtensionType::TransferHookAccount.to_u16(),
            value: vec![0],
        }
    }

    pub fn extension_type(&self) -> u16 {
        self.extension_type
    }

    /// The known type of this entry, if any.
    pub fn kind(&self) -> Option<ExtensionType> {
        ExtensionType::from_u16(self.extension_type)
    }

    pub fn length(&self) -> u16 {
        // bounded by Tlv::new and the u16 length read in unpack
        self.value.len() as u16
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Encoded size: 4-byte header plus value.
    pub fn packed_len(&self) -> usize {
        TLV_HEADER_LEN + self.value.len()
    }

    fn unpack(reader: &mut ByteReader<'_>) -> Result<Self, ComptokenError> {
        let extension_type = reader.read_u16()?;
        let length = reader.read_u16()?;
        let value = reader.read_bytes(length as usize)?.to_vec();
        Ok(Self {
            extension_type,
            value,
        })
    }

    fn pack(&self, writer: &mut ByteWriter<'_>) -> Result<(), ComptokenError> {
        writer.write_u16(self.extension_type)?;
        writer.write_u16(self.length())?;
        writer.write_bytes(&self.value)
    }
}

// =============================================================================
// EXTENSION REGION CODEC
// =============================================================================

/// Total record size for a base body of `base_len` bytes plus `extensions`.
///
/// With no extensions this is just `base_len`. Otherwise it is
/// `base_len + 1 + Σ(length + 4)`, except that 355 becomes 359: the external
/// program pads that size with an empty `Uninitialized` entry.
pub fn size_with_extensions(base_len: usize, extensions: &[Tlv]) -> usize {
    if extensions.is_empty() {
        return base_len;
    }
    let size = extensions
        .iter()
        .fold(base_len + 1, |sum, extension| sum + extension.packed_len());
    if size == PADDED_SIZE_TRIGGER {
        return size + TLV_HEADER_LEN;
    }
    size
}

/// Read the extension list of a record.
///
/// Checks the account type at [`EXTENSIONS_START_INDEX`], then reads entries
/// until fewer than four bytes remain. Every entry is kept, `Uninitialized`
/// ones included, except the empty `Uninitialized` header that fills bytes
/// 355..359 of a padded record.
pub fn decode_extensions(buffer: &[u8], account_type: u8) -> Result<Vec<Tlv>, ComptokenError> {
    let mut reader = ByteReader::at(buffer, EXTENSIONS_START_INDEX);
    let found = reader.read_u8()?;
    if found != account_type {
        return Err(ComptokenError::WrongAccountType {
            expected: account_type,
            found,
        });
    }

    let mut extensions = Vec::new();
    while reader.remaining() >= TLV_HEADER_LEN {
        let start = reader.offset();
        let extension = Tlv::unpack(&mut reader)?;
        if is_size_padding(start, &extension, reader.remaining()) {
            break;
        }
        extensions.push(extension);
    }
    log::trace!(
        "decoded {} extensions from {} bytes",
        extensions.len(),
        buffer.len()
    );
    Ok(extensions)
}

/// True for the empty `Uninitialized` entry written by [`encode_extensions`]
/// when the entries end exactly at byte 355.
fn is_size_padding(start: usize, extension: &Tlv, remaining: usize) -> bool {
    start == PADDED_SIZE_TRIGGER
        && remaining == 0
        && extension.value.is_empty()
        && extension.kind() == Some(ExtensionType::Uninitialized)
}

/// Write the account type and every entry, in list order, starting at
/// [`EXTENSIONS_START_INDEX`]. Returns the end offset of the region.
///
/// When the entries end at byte 355 an empty `Uninitialized` entry is
/// appended, matching [`size_with_extensions`].
pub fn encode_extensions(
    buffer: &mut [u8],
    account_type: u8,
    extensions: &[Tlv],
) -> Result<usize, ComptokenError> {
    let mut writer = ByteWriter::at(buffer, EXTENSIONS_START_INDEX);
    writer.write_u8(account_type)?;
    for extension in extensions {
        extension.pack(&mut writer)?;
    }
    if writer.offset() == PADDED_SIZE_TRIGGER {
        Tlv::uninitialized().pack(&mut writer)?;
    }
    Ok(writer.offset())
}

// =============================================================================
// UNIT TESTS
// =============================================================================
