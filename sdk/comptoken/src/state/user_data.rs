//! User Data Account State
//!
//! Every comptoken wallet has a companion user data account owned by the
//! Comptoken program. It records when interest was last paid out, whether the
//! owner is a verified human, and the proofs already submitted for the
//! current blockhash so the same proof cannot be minted twice.
//!
//! # Size
//!
//! The account holds a growable list of 32-byte proofs. The program always
//! reserves at least one proof slot, so the minimum size is 88 bytes and each
//! further proof adds 32.

use crate::error::ComptokenError;
use crate::state::layout::{ByteReader, ByteWriter};
use crate::state::AccountData;
use solana_program::hash::{Hash, HASH_BYTES};

// =============================================================================
// USER DATA STRUCTURE
// =============================================================================

/// User data account contents.
///
/// # Memory Layout
///
/// ```text
/// ┌──────────────────────────────────────────────────────────────────────┐
/// │ Offset │ Size   │ Field                     │ Type                   │
/// ├────────┼────────┼───────────────────────────┼────────────────────────┤
/// │ 0      │ 8      │ last_interest_payout_date │ i64                    │
/// │ 8      │ 1      │ is_verified_human         │ bool                   │
/// │ 9      │ 7      │ (padding)                 │                        │
/// │ 16     │ 8      │ length                    │ u64 (number of proofs) │
/// │ 24     │ 32     │ recent_blockhash          │ Hash                   │
/// │ 56     │ 32 × n │ proofs                    │ [Hash; length]         │
/// └──────────────────────────────────────────────────────────────────────┘
/// ```
///
/// The on-chain `length` field is not stored separately: it is always
/// `proofs.len()`, so the two can never disagree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserData {
    /// Unix time of the last interest payout. Never negative.
    pub last_interest_payout_date: i64,

    pub is_verified_human: bool,

    /// The blockhash the stored proofs were mined against.
    pub recent_blockhash: Hash,

    /// Proofs submitted for `recent_blockhash`, oldest first.
    pub proofs: Vec<Hash>,
}

impl UserData {
    /// Size of a user data account with a single proof slot.
    ///
    /// Must stay in sync with the Comptoken program's `USER_DATA_MIN_SIZE`.
    pub const MIN_SIZE: usize = 88;

    /// Size of the fields before the proof list.
    pub const HEADER_LEN: usize = 56;

    const PADDING_LEN: usize = 7;

    /// Account size needed to hold `num_proofs` proofs.
    ///
    /// Zero proofs still need the reserved first slot, so `0` and `1` both
    /// give [`UserData::MIN_SIZE`].
    pub fn size_for_proofs(num_proofs: usize) -> usize {
        Self::MIN_SIZE + HASH_BYTES * num_proofs.saturating_sub(1)
    }

    /// The on-chain `length` field.
    pub fn length(&self) -> u64 {
        self.proofs.len() as u64
    }

    pub fn has_proof(&self, proof: &Hash) -> bool {
        self.proofs.contains(proof)
    }

    /// Append a proof unless it is already stored.
    ///
    /// Returns `false` for a duplicate. The account must be grown on-chain
    /// (see `GrowUserDataAccount`) before a proof past the allocated size
    /// can actually be stored.
    pub fn insert_proof(&mut self, proof: Hash) -> bool {
        if self.has_proof(&proof) {
            return false;
        }
        self.proofs.push(proof);
        true
    }
}

// =============================================================================
// ACCOUNT DATA IMPLEMENTATION
// =============================================================================

impl AccountData for UserData {
    fn size(&self) -> usize {
        Self::size_for_proofs(self.proofs.len())
    }

    /// Reads exactly `length` proofs, ignoring any bytes after them.
    fn unpack(input: &[u8]) -> Result<Self, ComptokenError> {
        let mut reader = ByteReader::new(input);
        let last_interest_payout_date = reader.read_i64()?;
        let is_verified_human = reader.read_bool()?;
        reader.skip(Self::PADDING_LEN)?;
        let length = reader.read_u64()?;
        let recent_blockhash = reader.read_hash()?;

        let needed = usize::try_from(length)
            .ok()
            .and_then(|length| length.checked_mul(HASH_BYTES))
            .filter(|needed| *needed <= reader.remaining())
            .ok_or(ComptokenError::TruncatedBuffer {
                offset: reader.offset(),
                needed: (length as usize).saturating_mul(HASH_BYTES),
                available: reader.remaining(),
            })?;

        let mut proofs = Vec::with_capacity(needed / HASH_BYTES);
        for _ in 0..length {
            proofs.push(reader.read_hash()?);
        }

        Ok(UserData {
            last_interest_payout_date,
            is_verified_human,
            recent_blockhash,
            proofs,
        })
    }

    fn pack(&self, output: &mut [u8]) -> Result<usize, ComptokenError> {
        let mut writer = ByteWriter::new(output);
        writer.write_i64(self.last_interest_payout_date)?;
        writer.write_bool(self.is_verified_human)?;
        writer.write_zeros(Self::PADDING_LEN)?;
        writer.write_u64(self.length())?;
        writer.write_hash(&self.recent_blockhash)?;
        for proof in &self.proofs {
            writer.write_hash(proof)?;
        }
        if self.proofs.is_empty() {
            // the first proof slot is always allocated
            writer.write_zeros(HASH_BYTES)?;
        }
        Ok(writer.offset())
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
