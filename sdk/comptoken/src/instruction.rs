//! Instruction Data
//!
//! Data bytes for the Comptoken program's user-facing instructions.
//! Building the account lists and submitting transactions is up to the
//! caller; this module only encodes what goes in `Instruction::data`.
//!
//! # Instruction Format
//!
//! ```text
//! [discriminant: u8][data: varies]
//! ```
//!
//! # Discriminant Values
//!
//! | Value | Instruction |
//! |-------|-------------|
//! | 1 | ProofSubmission |
//! | 3 | CreateUserDataAccount |
//! | 4 | DailyDistributionEvent |
//! | 5 | GetValidBlockhashes |
//! | 6 | GetOwedComptokens |
//! | 7 | GrowUserDataAccount |
//! | 8 | VerifyHuman |
//! | 9 | ReverifyHuman |
//! | 10 | UnverifyHuman, UnverifyHumanWithProof |
//! | 12 | FlagStaleAccount |
//!
//! Values 2 (program setup) and 11 exist on the program but have no client
//! encoding.

use crate::error::ComptokenError;
use crate::proof::{ComptokenProof, PROOF_DATA_LEN};
use crate::state::layout::ByteReader;
use crate::state::UserData;
use solana_program::hash::Hash;

/// Size of a World ID groth16 proof.
pub const WORLD_ID_PROOF_LEN: usize = 256;

/// root_hash ∥ nullifier_hash ∥ proof
const WORLD_ID_DATA_LEN: usize = 32 + 32 + WORLD_ID_PROOF_LEN;

// =============================================================================
// COMPTOKEN INSTRUCTION ENUM
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComptokenInstruction {
    /// Submit a mined proof; the program mints comptokens to the wallet
    /// named in the proof.
    ///
    /// # Data Layout
    ///
    /// ```text
    /// [0]: discriminant (1)
    /// [1..77]: pubkey ∥ extra_data ∥ nonce ∥ version ∥ timestamp
    /// ```
    ProofSubmission { proof_data: [u8; PROOF_DATA_LEN] },

    /// Create the user data account tied to a comptoken wallet.
    ///
    /// # Data Layout
    ///
    /// ```text
    /// [0]: discriminant (3)
    /// [1..9]: rent_lamports (u64)
    /// [9..17]: space (u64)
    /// ```
    CreateUserDataAccount { rent_lamports: u64, space: u64 },

    /// Record today's interest rate and UBI amount.
    DailyDistributionEvent,

    /// Return the current valid blockhashes as transaction return data.
    GetValidBlockhashes,

    /// Pay the caller the interest and UBI owed since their last payout.
    GetOwedComptokens,

    /// Grow the user data account to hold more proofs.
    ///
    /// # Data Layout
    ///
    /// ```text
    /// [0]: discriminant (7)
    /// [1..9]: rent_lamports (u64)
    /// [9..17]: new_space (u64)
    /// ```
    GrowUserDataAccount { rent_lamports: u64, new_space: u64 },

    /// Verify the wallet owner as a human with a World ID proof.
    ///
    /// # Data Layout
    ///
    /// ```text
    /// [0]: discriminant (8)
    /// [1..9]: rent_lamports for the nullifier account (u64)
    /// [9..41]: root_hash
    /// [41..73]: nullifier_hash
    /// [73..329]: proof
    /// ```
    VerifyHuman {
        rent_lamports: u64,
        root_hash: [u8; 32],
        nullifier_hash: [u8; 32],
        proof: [u8; WORLD_ID_PROOF_LEN],
    },

    /// Refresh an existing human verification with a new World ID proof.
    ///
    /// # Data Layout
    ///
    /// ```text
    /// [0]: discriminant (9)
    /// [1..33]: root_hash
    /// [33..65]: nullifier_hash
    /// [65..321]: proof
    /// ```
    ReverifyHuman {
        root_hash: [u8; 32],
        nullifier_hash: [u8; 32],
        proof: [u8; WORLD_ID_PROOF_LEN],
    },

    /// Drop the caller's human verification. Carries no data.
    UnverifyHuman,

    /// `UnverifyHuman` sent with a World ID proof. Same discriminant (10),
    /// same data layout as `ReverifyHuman`.
    UnverifyHumanWithProof {
        root_hash: [u8; 32],
        nullifier_hash: [u8; 32],
        proof: [u8; WORLD_ID_PROOF_LEN],
    },

    /// Mark a wallet whose owner has not collected in over a year.
    FlagStaleAccount,
}

impl ComptokenInstruction {
    /// `ProofSubmission` carrying `proof`'s payload.
    pub fn proof_submission(proof: &ComptokenProof) -> Result<Self, ComptokenError> {
        Ok(ComptokenInstruction::ProofSubmission {
            proof_data: proof.serialize_data()?,
        })
    }

    /// `CreateUserDataAccount` sized for `num_proofs` proofs.
    pub fn create_user_data_account(rent_lamports: u64, num_proofs: usize) -> Self {
        ComptokenInstruction::CreateUserDataAccount {
            rent_lamports,
            space: UserData::size_for_proofs(num_proofs) as u64,
        }
    }

    /// `GrowUserDataAccount` sized for `num_proofs` proofs.
    pub fn grow_user_data_account(rent_lamports: u64, num_proofs: usize) -> Self {
        ComptokenInstruction::GrowUserDataAccount {
            rent_lamports,
            new_space: UserData::size_for_proofs(num_proofs) as u64,
        }
    }

    pub fn discriminant(&self) -> u8 {
        match self {
            ComptokenInstruction::ProofSubmission { .. } => 1,
            ComptokenInstruction::CreateUserDataAccount { .. } => 3,
            ComptokenInstruction::DailyDistributionEvent => 4,
            ComptokenInstruction::GetValidBlockhashes => 5,
            ComptokenInstruction::GetOwedComptokens => 6,
            ComptokenInstruction::GrowUserDataAccount { .. } => 7,
            ComptokenInstruction::VerifyHuman { .. } => 8,
            ComptokenInstruction::ReverifyHuman { .. } => 9,
            ComptokenInstruction::UnverifyHuman
            | ComptokenInstruction::UnverifyHumanWithProof { .. } => 10,
            ComptokenInstruction::FlagStaleAccount => 12,
        }
    }

    // =========================================================================
    // INSTRUCTION UNPACKING
    // =========================================================================

    /// Parse instruction data.
    ///
    /// Fails with `InvalidInstruction` on an empty buffer, an unknown
    /// discriminant, or too little data for the variant. Trailing bytes are
    /// ignored, as the program does.
    ///
    /// Discriminant 10 with no data is `UnverifyHuman`; with at least a full
    /// World ID payload it is `UnverifyHumanWithProof`. Anything in between
    /// is invalid.
    pub fn unpack(input: &[u8]) -> Result<Self, ComptokenError> {
        let (&discriminant, rest) = input
            .split_first()
            .ok_or(ComptokenError::InvalidInstruction)?;

        Ok(match discriminant {
            1 => ComptokenInstruction::ProofSubmission {
                proof_data: read_array(rest, 0)?,
            },
            3 => ComptokenInstruction::CreateUserDataAccount {
                rent_lamports: read_u64(rest, 0)?,
                space: read_u64(rest, 8)?,
            },
            4 => ComptokenInstruction::DailyDistributionEvent,
            5 => ComptokenInstruction::GetValidBlockhashes,
            6 => ComptokenInstruction::GetOwedComptokens,
            7 => ComptokenInstruction::GrowUserDataAccount {
                rent_lamports: read_u64(rest, 0)?,
                new_space: read_u64(rest, 8)?,
            },
            8 => ComptokenInstruction::VerifyHuman {
                rent_lamports: read_u64(rest, 0)?,
                root_hash: read_array(rest, 8)?,
                nullifier_hash: read_array(rest, 40)?,
                proof: read_array(rest, 72)?,
            },
            9 => ComptokenInstruction::ReverifyHuman {
                root_hash: read_array(rest, 0)?,
                nullifier_hash: read_array(rest, 32)?,
                proof: read_array(rest, 64)?,
            },
            10 if rest.is_empty() => ComptokenInstruction::UnverifyHuman,
            10 if rest.len() < WORLD_ID_DATA_LEN => {
                return Err(ComptokenError::InvalidInstruction);
            }
            10 => ComptokenInstruction::UnverifyHumanWithProof {
                root_hash: read_array(rest, 0)?,
                nullifier_hash: read_array(rest, 32)?,
                proof: read_array(rest, 64)?,
            },
            12 => ComptokenInstruction::FlagStaleAccount,
            _ => {
                log::debug!("unknown comptoken instruction {}", discriminant);
                return Err(ComptokenError::InvalidInstruction);
            }
        })
    }

    // =========================================================================
    // INSTRUCTION PACKING
    // =========================================================================

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = vec![self.discriminant()];

        match self {
            ComptokenInstruction::ProofSubmission { proof_data } => {
                buf.extend_from_slice(proof_data);
            }

            ComptokenInstruction::CreateUserDataAccount {
                rent_lamports,
                space: size,
            }
            | ComptokenInstruction::GrowUserDataAccount {
                rent_lamports,
                new_space: size,
            } => {
                buf.extend_from_slice(&rent_lamports.to_le_bytes());
                buf.extend_from_slice(&size.to_le_bytes());
            }

            ComptokenInstruction::VerifyHuman {
                rent_lamports,
                root_hash,
                nullifier_hash,
                proof,
            } => {
                buf.extend_from_slice(&rent_lamports.to_le_bytes());
                buf.extend_from_slice(root_hash);
                buf.extend_from_slice(nullifier_hash);
                buf.extend_from_slice(proof);
            }

            ComptokenInstruction::ReverifyHuman {
                root_hash,
                nullifier_hash,
                proof,
            }
            | ComptokenInstruction::UnverifyHumanWithProof {
                root_hash,
                nullifier_hash,
                proof,
            } => {
                buf.extend_from_slice(root_hash);
                buf.extend_from_slice(nullifier_hash);
                buf.extend_from_slice(proof);
            }

            ComptokenInstruction::DailyDistributionEvent
            | ComptokenInstruction::GetValidBlockhashes
            | ComptokenInstruction::GetOwedComptokens
            | ComptokenInstruction::UnverifyHuman
            | ComptokenInstruction::FlagStaleAccount => {}
        }

        buf
    }
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], ComptokenError> {
    data.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(ComptokenError::InvalidInstruction)
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64, ComptokenError> {
    read_array(data, offset).map(u64::from_le_bytes)
}

// =============================================================================
// RETURN DATA
// =============================================================================

/// What `GetValidBlockhashes` leaves in the transaction's return data.
///
/// ```text
/// [0..32]: announced_blockhash
/// [32..64]: valid_blockhash
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidBlockhashesReturnData {
    pub announced_blockhash: Hash,
    pub valid_blockhash: Hash,
}

impl ValidBlockhashesReturnData {
    pub const LEN: usize = 64;

    /// Fails with `TruncatedBuffer` below 64 bytes. Extra bytes are ignored.
    pub fn unpack(return_data: &[u8]) -> Result<Self, ComptokenError> {
        let mut reader = ByteReader::new(return_data);
        Ok(Self {
            announced_blockhash: reader.read_hash()?,
            valid_blockhash: reader.read_hash()?,
        })
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<ComptokenInstruction> {
        vec![
            ComptokenInstruction::ProofSubmission {
                proof_data: core::array::from_fn(|i| i as u8),
            },
            ComptokenInstruction::CreateUserDataAccount {
                rent_lamports: 1_503_360,
                space: 88,
            },
            ComptokenInstruction::DailyDistributionEvent,
            ComptokenInstruction::GetValidBlockhashes,
            ComptokenInstruction::GetOwedComptokens,
            ComptokenInstruction::GrowUserDataAccount {
                rent_lamports: 2_000_000,
                new_space: 152,
            },
            ComptokenInstruction::VerifyHuman {
                rent_lamports: 1_113_600,
                root_hash: [1; 32],
                nullifier_hash: [2; 32],
                proof: [3; WORLD_ID_PROOF_LEN],
            },
            ComptokenInstruction::ReverifyHuman {
                root_hash: [4; 32],
                nullifier_hash: [5; 32],
                proof: [6; WORLD_ID_PROOF_LEN],
            },
            ComptokenInstruction::UnverifyHuman,
            ComptokenInstruction::UnverifyHumanWithProof {
                root_hash: [7; 32],
                nullifier_hash: [8; 32],
                proof: [9; WORLD_ID_PROOF_LEN],
            },
            ComptokenInstruction::FlagStaleAccount,
        ]
    }

    #[test]
    fn test_pack_unpack_every_variant() {
        for instruction in all_variants() {
            let packed = instruction.pack();
            assert_eq!(packed[0], instruction.discriminant());
            assert_eq!(ComptokenInstruction::unpack(&packed).unwrap(), instruction);
        }
    }

    #[test]
    fn test_data_lengths() {
        let lengths: Vec<usize> = all_variants().iter().map(|i| i.pack().len()).collect();
        assert_eq!(lengths, vec![77, 17, 1, 1, 1, 17, 329, 321, 1, 321, 1]);
    }

    #[test]
    fn test_reverify_human_layout() {
        let packed = ComptokenInstruction::ReverifyHuman {
            root_hash: [0xaa; 32],
            nullifier_hash: [0xbb; 32],
            proof: [0xcc; WORLD_ID_PROOF_LEN],
        }
        .pack();

        assert_eq!(packed[0], 9);
        assert_eq!(&packed[1..33], &[0xaa; 32]);
        assert_eq!(&packed[33..65], &[0xbb; 32]);
        assert_eq!(&packed[65..321], &[0xcc; WORLD_ID_PROOF_LEN][..]);
    }

    #[test]
    fn test_unverify_human_forms() {
        assert_eq!(
            ComptokenInstruction::unpack(&[10]).unwrap(),
            ComptokenInstruction::UnverifyHuman
        );

        let mut data = vec![10];
        data.extend_from_slice(&[1; WORLD_ID_DATA_LEN]);
        assert_eq!(
            ComptokenInstruction::unpack(&data).unwrap(),
            ComptokenInstruction::UnverifyHumanWithProof {
                root_hash: [1; 32],
                nullifier_hash: [1; 32],
                proof: [1; WORLD_ID_PROOF_LEN],
            }
        );

        // Partial payloads are neither form
        assert_eq!(
            ComptokenInstruction::unpack(&data[..2]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
        assert_eq!(
            ComptokenInstruction::unpack(&data[..WORLD_ID_DATA_LEN]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
    }

    #[test]
    fn test_valid_blockhashes_return_data() {
        let announced = Hash::new_unique();
        let valid = Hash::new_unique();
        let mut return_data = announced.to_bytes().to_vec();
        return_data.extend_from_slice(valid.as_ref());
        assert_eq!(return_data.len(), ValidBlockhashesReturnData::LEN);

        let parsed = ValidBlockhashesReturnData::unpack(&return_data).unwrap();
        assert_eq!(parsed.announced_blockhash, announced);
        assert_eq!(parsed.valid_blockhash, valid);

        assert_eq!(
            ValidBlockhashesReturnData::unpack(&return_data[..63]).unwrap_err(),
            ComptokenError::TruncatedBuffer {
                offset: 32,
                needed: 32,
                available: 31
            }
        );
    }

    #[test]
    fn test_create_user_data_account_layout() {
        let packed = ComptokenInstruction::create_user_data_account(1_000, 3).pack();

        assert_eq!(packed[0], 3);
        assert_eq!(&packed[1..9], &1_000u64.to_le_bytes());
        // 88 + 2 × 32
        assert_eq!(&packed[9..17], &152u64.to_le_bytes());
    }

    #[test]
    fn test_grow_user_data_account() {
        assert_eq!(
            ComptokenInstruction::grow_user_data_account(5, 1),
            ComptokenInstruction::GrowUserDataAccount {
                rent_lamports: 5,
                new_space: 88
            }
        );
    }

    #[test]
    fn test_invalid_instructions() {
        assert_eq!(
            ComptokenInstruction::unpack(&[]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
        // 2 and 11 have no client encoding
        assert_eq!(
            ComptokenInstruction::unpack(&[2]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
        assert_eq!(
            ComptokenInstruction::unpack(&[11]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
        assert_eq!(
            ComptokenInstruction::unpack(&[9; 320]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
        assert_eq!(
            ComptokenInstruction::unpack(&[1; 76]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
        assert_eq!(
            ComptokenInstruction::unpack(&[3, 0, 0, 0, 0, 0, 0, 0, 0, 1]).unwrap_err(),
            ComptokenError::InvalidInstruction
        );
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        assert_eq!(
            ComptokenInstruction::unpack(&[5, 0xff, 0xff]).unwrap(),
            ComptokenInstruction::GetValidBlockhashes
        );
    }
}
