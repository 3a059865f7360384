//! Token Account State
//!
//! A comptoken wallet is a Token-2022 token account. Its first 165 bytes are
//! the classic SPL token account; Token-2022 may append an extension region.
//!
//! # Size
//!
//! - 165 bytes with no extensions
//! - 171 bytes for a comptoken wallet (one `TransferHookAccount` extension)

use crate::error::ComptokenError;
use crate::state::extension::{self, Tlv};
use crate::state::layout::{
    pack_coption_pubkey, pack_coption_u64, unpack_coption_pubkey, unpack_coption_u64,
};
use crate::state::{AccountData, COption, WithExtensions};
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use solana_program::pubkey::Pubkey;

// =============================================================================
// ACCOUNT STATE ENUM
// =============================================================================

/// The state of a token account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccountState {
    /// Account is not yet initialized.
    #[default]
    Uninitialized,

    /// Account is initialized and active.
    Initialized,

    /// Account is frozen by the mint's freeze authority.
    Frozen,
}

impl AccountState {
    /// Convert a u8 byte to AccountState.
    ///
    /// # Values
    ///
    /// - 0 = Uninitialized
    /// - 1 = Initialized
    /// - 2 = Frozen
    /// - Other = `InvalidAccountState`
    pub fn from_u8(value: u8) -> Result<Self, ComptokenError> {
        match value {
            0 => Ok(AccountState::Uninitialized),
            1 => Ok(AccountState::Initialized),
            2 => Ok(AccountState::Frozen),
            other => Err(ComptokenError::InvalidAccountState(other)),
        }
    }

    /// Convert AccountState to a u8 byte.
    pub fn to_u8(self) -> u8 {
        match self {
            AccountState::Uninitialized => 0,
            AccountState::Initialized => 1,
            AccountState::Frozen => 2,
        }
    }
}

// =============================================================================
// TOKEN ACCOUNT STRUCTURE
// =============================================================================

/// Token account data, including any Token-2022 extensions.
///
/// # Memory Layout
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────┐
/// │ Offset │ Size │ Field            │ Type                        │
/// ├────────┼──────┼──────────────────┼─────────────────────────────┤
/// │ 0      │ 32   │ mint             │ Pubkey                      │
/// │ 32     │ 32   │ nominal_owner    │ Pubkey                      │
/// │ 64     │ 8    │ amount           │ u64                         │
/// │ 72     │ 36   │ delegate         │ COption<Pubkey>             │
/// │ 108    │ 1    │ state            │ AccountState (u8)           │
/// │ 109    │ 12   │ is_native        │ COption<u64>                │
/// │ 121    │ 8    │ delegated_amount │ u64                         │
/// │ 129    │ 36   │ close_authority  │ COption<Pubkey>             │
/// ├────────┼──────┼──────────────────┼─────────────────────────────┤
/// │ 165    │ 1    │ account type (2) │ only if extensions exist    │
/// │ 166    │ ...  │ extensions       │ TLV list                    │
/// └─────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenAccountData {
    /// The mint this account holds tokens of.
    pub mint: Pubkey,

    /// The wallet that controls the tokens.
    ///
    /// "Nominal" because the account itself is owned by the token program.
    pub nominal_owner: Pubkey,

    /// Balance in base units.
    pub amount: u64,

    /// Optional delegate allowed to spend up to `delegated_amount`.
    pub delegate: COption<Pubkey>,

    pub state: AccountState,

    /// `Some(rent_exempt_reserve)` for wrapped SOL accounts.
    pub is_native: COption<u64>,

    pub delegated_amount: u64,

    /// Optional authority who can close this account.
    pub close_authority: COption<Pubkey>,

    /// Token-2022 extensions, in on-chain order.
    pub extensions: Vec<Tlv>,
}

impl TokenAccountData {
    /// Size of the base account when serialized.
    ///
    /// 32 + 32 + 8 + 36 + 1 + 12 + 8 + 36 = 165 bytes
    pub const LEN: usize = 165;

    /// Token-2022 account type for token accounts.
    pub const ACCOUNT_TYPE: u8 = 2;

    pub fn is_frozen(&self) -> bool {
        self.state == AccountState::Frozen
    }

    pub fn is_initialized(&self) -> bool {
        self.state != AccountState::Uninitialized
    }

    pub fn is_native(&self) -> bool {
        self.is_native.is_some()
    }

    /// Unpack only the fixed 165-byte body.
    fn unpack_base(input: &[u8; TokenAccountData::LEN]) -> Result<Self, ComptokenError> {
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            mint,
            nominal_owner,
            amount,
            delegate,
            state,
            is_native,
            delegated_amount,
            close_authority,
        ) = array_refs![input, 32, 32, 8, 36, 1, 12, 8, 36];

        Ok(TokenAccountData {
            mint: Pubkey::new_from_array(*mint),
            nominal_owner: Pubkey::new_from_array(*nominal_owner),
            amount: u64::from_le_bytes(*amount),
            delegate: unpack_coption_pubkey(delegate)?,
            state: AccountState::from_u8(state[0])?,
            is_native: unpack_coption_u64(is_native)?,
            delegated_amount: u64::from_le_bytes(*delegated_amount),
            close_authority: unpack_coption_pubkey(close_authority)?,
            extensions: Vec::new(),
        })
    }

    fn pack_base(&self, output: &mut [u8; TokenAccountData::LEN]) {
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            mint_dst,
            nominal_owner_dst,
            amount_dst,
            delegate_dst,
            state_dst,
            is_native_dst,
            delegated_amount_dst,
            close_authority_dst,
        ) = mut_array_refs![output, 32, 32, 8, 36, 1, 12, 8, 36];

        mint_dst.copy_from_slice(self.mint.as_ref());
        nominal_owner_dst.copy_from_slice(self.nominal_owner.as_ref());
        *amount_dst = self.amount.to_le_bytes();
        pack_coption_pubkey(&self.delegate, delegate_dst);
        state_dst[0] = self.state.to_u8();
        pack_coption_u64(&self.is_native, is_native_dst);
        *delegated_amount_dst = self.delegated_amount.to_le_bytes();
        pack_coption_pubkey(&self.close_authority, close_authority_dst);
    }
}

// =============================================================================
// ACCOUNT DATA IMPLEMENTATION
// =============================================================================

impl AccountData for TokenAccountData {
    fn size(&self) -> usize {
        self.size_with_extensions()
    }

    /// Deserialize the base account, then the extension region if the buffer
    /// is longer than 165 bytes.
    fn unpack(input: &[u8]) -> Result<Self, ComptokenError> {
        if input.len() < Self::LEN {
            return Err(ComptokenError::TruncatedBuffer {
                offset: 0,
                needed: Self::LEN,
                available: input.len(),
            });
        }
        let mut account = Self::unpack_base(array_ref![input, 0, TokenAccountData::LEN])?;
        if input.len() > Self::LEN {
            account.extensions = extension::decode_extensions(input, Self::ACCOUNT_TYPE)?;
        }
        Ok(account)
    }

    fn pack(&self, output: &mut [u8]) -> Result<usize, ComptokenError> {
        if output.len() < Self::LEN {
            return Err(ComptokenError::SizeMismatch {
                expected: self.size(),
                actual: output.len(),
            });
        }
        self.pack_base(array_mut_ref![output, 0, TokenAccountData::LEN]);
        if self.extensions.is_empty() {
            return Ok(Self::LEN);
        }
        extension::encode_extensions(output, Self::ACCOUNT_TYPE, &self.extensions)
    }
}

impl WithExtensions for TokenAccountData {
    const BASE_LEN: usize = TokenAccountData::LEN;
    const ACCOUNT_TYPE: u8 = TokenAccountData::ACCOUNT_TYPE;

    fn extensions(&self) -> &[Tlv] {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Vec<Tlv> {
        &mut self.extensions
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
