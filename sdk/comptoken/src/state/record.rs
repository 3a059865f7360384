//! Typed Account Records
//!
//! An [`AccountRecord`] pairs decoded account data with the account metadata
//! an RPC node returns next to it (address, lamports, owning program).
//! Fetching the raw bytes is left to the caller.

use crate::error::ComptokenError;
use crate::state::{AccountData, GlobalData, TokenAccountData, UserData};
use solana_program::pubkey::Pubkey;

/// A decoded account.
///
/// Built fresh by every decode. To change the data, modify a clone and
/// encode it again with [`AccountRecord::to_bytes`].
#[derive(Clone, Debug, PartialEq)]
pub struct AccountRecord<T> {
    pub address: Pubkey,
    pub lamports: u64,
    /// The program that owns the account.
    pub owner: Pubkey,
    pub data: T,
}

pub type TokenAccount = AccountRecord<TokenAccountData>;
pub type UserDataAccount = AccountRecord<UserData>;
pub type GlobalDataAccount = AccountRecord<GlobalData>;

impl<T: AccountData> AccountRecord<T> {
    pub fn new(address: Pubkey, lamports: u64, owner: Pubkey, data: T) -> Self {
        Self {
            address,
            lamports,
            owner,
            data,
        }
    }

    /// Decode raw account bytes into a typed record.
    pub fn decode(
        address: Pubkey,
        lamports: u64,
        owner: Pubkey,
        bytes: &[u8],
    ) -> Result<Self, ComptokenError> {
        let data = T::unpack(bytes).map_err(|err| {
            log::debug!("failed to decode account {}: {}", address, err);
            err
        })?;
        Ok(Self::new(address, lamports, owner, data))
    }

    /// Encode the record's data back into account bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ComptokenError> {
        self.data.to_bytes()
    }

    /// Fail with `InvalidAccountOwner` unless `program_id` owns the account.
    ///
    /// ```ignore
    /// let user_data = UserDataAccount::decode(address, lamports, owner, &bytes)?
    ///     .expect_owner(&keys.compto_program_id)?;
    /// ```
    pub fn expect_owner(self, program_id: &Pubkey) -> Result<Self, ComptokenError> {
        if self.owner != *program_id {
            log::debug!("{} is not owned by {}", self.address, program_id);
            return Err(ComptokenError::InvalidAccountOwner);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Tlv, WithExtensions};

    #[test]
    fn test_decode_token_account() {
        let address = Pubkey::new_unique();
        let token_program = Pubkey::new_unique();
        let data = TokenAccountData {
            amount: 5_000,
            ..Default::default()
        }
        .with_extension(Tlv::transfer_hook_account());
        let bytes = data.to_bytes().unwrap();

        let record = TokenAccount::decode(address, 2_074_080, token_program, &bytes).unwrap();
        assert_eq!(record.address, address);
        assert_eq!(record.lamports, 2_074_080);
        assert_eq!(record.data, data);
        assert_eq!(record.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_decode_error_is_surfaced() {
        let err = UserDataAccount::decode(Pubkey::new_unique(), 0, Pubkey::new_unique(), &[0u8; 10])
            .unwrap_err();
        assert!(matches!(err, ComptokenError::TruncatedBuffer { .. }));
    }

    #[test]
    fn test_expect_owner() {
        let program_id = Pubkey::new_unique();
        let bytes = UserData::default().to_bytes().unwrap();

        let record = UserDataAccount::decode(Pubkey::new_unique(), 1, program_id, &bytes).unwrap();
        assert!(record.clone().expect_owner(&program_id).is_ok());
        assert_eq!(
            record.expect_owner(&Pubkey::new_unique()).unwrap_err(),
            ComptokenError::InvalidAccountOwner
        );
    }
}
