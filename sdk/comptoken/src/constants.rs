//! Program Constants
//!
//! Values that must stay in sync with the deployed Comptoken program.

/// Decimal places of the comptoken mint.
pub const COMPTOKEN_DECIMALS: u8 = 2;

/// Size of a comptoken wallet:
/// 165 (base account) + 1 (account type) + 5 (TransferHookAccount extension).
pub const COMPTOKEN_WALLET_SIZE: usize = 171;

/// Size of the global data account. Keep consistent with the program.
pub const GLOBAL_DATA_SIZE: usize = 5960;

pub const SEC_PER_DAY: i64 = 86_400;

/// Number of days of distribution history kept in the global data account.
pub const DAILY_DISTRIBUTION_HISTORY_SIZE: usize = 365;

/// Difficulty bits written into every proof header.
pub const PROOF_NBITS: [u8; 4] = [0xd8, 0xad, 0x0e, 0x18];

/// Target difficulty on mainnet. Larger means fewer leading zeroes.
pub const TARGET_DIFFICULTY_MAINNET: usize = 24;

/// Target difficulty on devnet.
pub const TARGET_DIFFICULTY_DEVNET: usize = 29;
