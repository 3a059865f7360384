//! # Comptoken Client
//!
//! Off-chain helpers for the Comptoken program: decoding and encoding the
//! accounts it reads and writes, building proof-of-work submissions, and
//! estimating the interest and UBI a holder is owed.
//!
//! ## Overview
//!
//! This crate allows you to:
//! - Decode comptoken wallets (Token-2022 accounts with TLV extensions)
//! - Decode user data and global data accounts
//! - Build and check proof-of-work headers
//! - Replay the daily distribution history to compute amounts owed
//! - Encode instruction data for the program's user instructions
//!
//! Fetching accounts and sending transactions is left to the caller. Every
//! function here works on bytes already in memory.
//!
//! ## Account Types
//!
//! | Account Type | Size | Description |
//! |--------------|------|-------------|
//! | TokenAccountData | 165 bytes + extensions | A comptoken wallet |
//! | UserData | 88 + 32 × (proofs − 1) bytes | Proofs and last payout date |
//! | GlobalData | 5960 bytes | Valid blockhashes and distribution history |
//!
//! ## Example
//!
//! ```ignore
//! let wallet = TokenAccount::decode(address, lamports, owner, &bytes)?;
//! let user = UserDataAccount::decode(user_address, lamports, program_id, &user_bytes)?
//!     .expect_owner(&keys.compto_program_id)?;
//! let global = GlobalDataAccount::decode(keys.global_data_account, lamports, program_id, &global_bytes)?;
//!
//! let days = days_since_last_payout(now, user.data.last_interest_payout_date);
//! let owed = replay_distribution(
//!     &global.data.daily_distribution_data,
//!     wallet.data.amount,
//!     days,
//!     user.data.is_verified_human,
//! )?;
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Cluster selection and program addresses
pub mod config;

/// Values shared with the deployed program
pub mod constants;

/// Interest and UBI replay over the distribution history
pub mod distribution;

/// Error type with stable codes
pub mod error;

/// Instruction data encoding
pub mod instruction;

/// Proof-of-work header, hash, and target check
pub mod proof;

/// Account layouts (token wallet, user data, global data)
pub mod state;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{Cluster, ComptoPublicKeys};
pub use distribution::{
    days_since_last_payout, normalize_time, replay_distribution, DistributionOwed,
    HistoricDistributions,
};
pub use error::ComptokenError;
pub use instruction::{ComptokenInstruction, ValidBlockhashesReturnData};
pub use proof::{ComptokenProof, ProofParams};
pub use state::{
    AccountData, AccountRecord, AccountState, DailyDistributionData, ExtensionType,
    GlobalData, GlobalDataAccount, HistoricDistribution, Tlv, TokenAccount, TokenAccountData,
    UserData, UserDataAccount, ValidBlockhashes, WithExtensions,
};

// =============================================================================
// PROGRAM ID
// =============================================================================

// The Comptoken program on devnet
solana_program::declare_id!("6351sU4nPxMuxGNYNVK17DXC2fP2juh8YHfiMYCR7Zvh");
