//! Client Configuration
//!
//! The client never reads process-wide state. Addresses and the cluster are
//! values the caller builds once and passes to whatever needs them.
//!
//! # Example
//!
//! ```ignore
//! let cluster: Cluster = "devnet".parse()?;
//! let keys = ComptoPublicKeys::devnet();
//! let proof = ComptokenProof::new(ProofParams { target: cluster.target(), ..params })?;
//! ```

use crate::constants::{TARGET_DIFFICULTY_DEVNET, TARGET_DIFFICULTY_MAINNET};
use crate::error::ComptokenError;
use crate::proof::target_bytes;
use solana_program::{pubkey, pubkey::Pubkey};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER
// =============================================================================

/// The network the client talks to. Selects the proof-of-work target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cluster {
    #[default]
    Mainnet,
    Devnet,
}

impl Cluster {
    /// Target difficulty; larger means an easier target.
    pub fn difficulty(self) -> usize {
        match self {
            Cluster::Mainnet => TARGET_DIFFICULTY_MAINNET,
            Cluster::Devnet => TARGET_DIFFICULTY_DEVNET,
        }
    }

    /// The 32-byte target a proof hash must be lower than.
    pub fn target(self) -> [u8; 32] {
        match self {
            Cluster::Mainnet => MAINNET_TARGET,
            Cluster::Devnet => DEVNET_TARGET,
        }
    }
}

const MAINNET_TARGET: [u8; 32] = target_bytes(TARGET_DIFFICULTY_MAINNET);
const DEVNET_TARGET: [u8; 32] = target_bytes(TARGET_DIFFICULTY_DEVNET);

impl FromStr for Cluster {
    type Err = ComptokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            "devnet" => Ok(Cluster::Devnet),
            _ => Err(ComptokenError::UnknownCluster(s.to_string())),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::Mainnet => write!(f, "mainnet"),
            Cluster::Devnet => write!(f, "devnet"),
        }
    }
}

// =============================================================================
// PUBLIC KEYS
// =============================================================================

/// Addresses of the Comptoken program and the accounts it manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComptoPublicKeys {
    pub compto_program_id: Pubkey,
    pub comptoken_mint: Pubkey,
    pub global_data_account: Pubkey,
    pub interest_bank_account: Pubkey,
    pub verified_human_ubi_bank_account: Pubkey,
    pub future_ubi_bank_account: Pubkey,
    pub transfer_hook_program_id: Pubkey,
    pub extra_account_metas_account: Pubkey,
}

impl ComptoPublicKeys {
    /// Published devnet deployment.
    pub fn devnet() -> Self {
        Self {
            compto_program_id: crate::ID,
            comptoken_mint: pubkey!("76KRec9fujGWqdCuPzwiMgxFzQyYMSZa9HeySkbsyufV"),
            global_data_account: pubkey!("2TchvJKnE3tsdr5RKyiu1jGofnL8rhLZ9XU5nFwKVLSP"),
            interest_bank_account: pubkey!("EaZvWXqhb6kX1rdZkr9yCBRcCTpnYwubSyhxrZtzcfhf"),
            verified_human_ubi_bank_account: pubkey!("GoAPpRxCpRgVU6VCW3RAVf9fg4Jysuxt4PqSUpG3H9Xd"),
            future_ubi_bank_account: pubkey!("2DXVGENSY9vTdozeFL888yPffC7nrakQAzdxSHanTHmN"),
            transfer_hook_program_id: pubkey!("4GG3aGgaMXDKtrD9pMcmQ4P87pKKCKRxAxR4LGTKpmYt"),
            extra_account_metas_account: pubkey!("7oy4vA2rSTXkjKUQVERGRK2SkhNjTDL8xcMBQK6zB9zU"),
        }
    }
}
