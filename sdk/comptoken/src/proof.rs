//! Comptoken Proof-of-Work
//!
//! New comptokens are minted by submitting a proof of work. The proof reuses
//! the Bitcoin block header format so that off-the-shelf SHA-256 miners can
//! search for it:
//!
//! ```text
//! ┌─────────┬──────────────────┬─────────────┬───────────┬───────┬───────┐
//! │ version │ prev block hash  │ merkle root │ timestamp │ nbits │ nonce │
//! │ 4 (LE)  │ 32               │ 32          │ 4 (LE)    │ 4     │ 4 (LE)│
//! └─────────┴──────────────────┴─────────────┴───────────┴───────┴───────┘
//!                          80 bytes
//! ```
//!
//! - The previous block hash is the recent Solana blockhash, byte-reversed
//!   and then swapped to little-endian 32-bit words.
//! - The merkle root commits to the miner's extra data and public key:
//!   `sha256d(extra_data ∥ pubkey)`.
//! - The proof hash is `sha256d(header)` with its bytes reversed.
//!
//! A proof is accepted when its hash is lower than the cluster's target.
//!
//! # Lifecycle
//!
//! ```text
//! ProofParams ──construct_header──► header ──generate_hash──► hash
//!                                                               │
//!                                   is_lower_than_target(hash, target)
//!                                          │                │
//!                                       Valid      InsufficientDifficulty
//! ```

use crate::constants::PROOF_NBITS;
use crate::error::ComptokenError;
use solana_program::{hash::hash, pubkey::Pubkey};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Size of the proof header.
pub const HEADER_LEN: usize = 80;

/// Size of the proof payload sent with `ProofSubmission`.
pub const PROOF_DATA_LEN: usize = 76;

// =============================================================================
// HASH HELPERS
// =============================================================================

/// SHA-256 applied twice.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    hash(hash(data).as_ref()).to_bytes()
}

/// Reverse all 32 bytes, then swap the byte order inside each 4-byte word.
fn reverse_and_swap_endianness(bytes: &[u8; 32]) -> [u8; 32] {
    let mut out = *bytes;
    out.reverse();
    swap32(&mut out);
    out
}

/// Swap the byte order inside each 4-byte word, in place.
fn swap32(bytes: &mut [u8; 32]) {
    for word in bytes.chunks_exact_mut(4) {
        word.reverse();
    }
}

/// Largest difficulty whose marker still fits in 32 bytes.
pub const MAX_TARGET_DIFFICULTY: usize = 29;

/// Build a target: 32 zero bytes with `0e ad d8` ending `difficulty` bytes
/// before the end.
///
/// A larger difficulty moves the marker towards the front, leaving fewer
/// leading zero bytes and so an easier target. Fails with
/// `InvalidDifficulty` above [`MAX_TARGET_DIFFICULTY`].
pub fn make_target_bytes(difficulty: usize) -> Result<[u8; 32], ComptokenError> {
    if difficulty > MAX_TARGET_DIFFICULTY {
        return Err(ComptokenError::InvalidDifficulty(difficulty));
    }
    Ok(target_bytes(difficulty))
}

/// Caller guarantees `difficulty <= MAX_TARGET_DIFFICULTY`.
pub(crate) const fn target_bytes(difficulty: usize) -> [u8; 32] {
    let mut target = [0u8; 32];
    target[32 - (difficulty + 3)] = 0x0e;
    target[32 - (difficulty + 2)] = 0xad;
    target[32 - (difficulty + 1)] = 0xd8;
    target
}

/// Big-endian comparison of `hash` against `target`.
///
/// The first differing byte decides. Equal arrays are not lower.
pub fn is_lower_than_target(hash: &[u8], target: &[u8]) -> bool {
    for (byte, target_byte) in hash.iter().zip(target) {
        if byte < target_byte {
            return true;
        } else if byte > target_byte {
            return false;
        }
    }
    false
}

// =============================================================================
// PROOF PARAMETERS
// =============================================================================

/// Everything the miner chooses or is given when building a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofParams {
    /// The wallet the minted tokens go to.
    pub pubkey: Pubkey,
    /// A currently valid blockhash, as returned by `GetValidBlockhashes`.
    pub recent_block_hash: [u8; 32],
    /// Arbitrary miner-chosen data.
    pub extra_data: [u8; 32],
    pub nonce: u32,
    pub version: u32,
    pub timestamp: u32,
    /// Usually `Cluster::target()`.
    pub target: [u8; 32],
}

impl ProofParams {
    /// `sha256d(extra_data ∥ pubkey)`.
    pub fn merkle_root(&self) -> [u8; 32] {
        let mut data = [0u8; 64];
        data[..32].copy_from_slice(&self.extra_data);
        data[32..].copy_from_slice(self.pubkey.as_ref());
        double_sha256(&data)
    }

    /// Build the 80-byte header.
    pub fn construct_header(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(&reverse_and_swap_endianness(&self.recent_block_hash));
        header[36..68].copy_from_slice(&self.merkle_root());
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&PROOF_NBITS);
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header
    }
}

/// Proof hash of a header: `sha256d(header)`, byte-reversed.
pub fn generate_hash(header: &[u8; HEADER_LEN]) -> [u8; 32] {
    let mut hashed = double_sha256(header);
    hashed.reverse();
    hashed
}

// =============================================================================
// COMPTOKEN PROOF
// =============================================================================

/// A proof whose hash is known to beat its target.
///
/// The only way to get one is [`ComptokenProof::new`], which rejects
/// insufficient proofs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComptokenProof {
    params: ProofParams,
    header: [u8; HEADER_LEN],
    hash: [u8; 32],
}

impl ComptokenProof {
    /// Build the header, hash it, and check the hash against the target.
    ///
    /// Failing with `InsufficientDifficulty` is the normal outcome for most
    /// nonces; the error carries no data so rejecting is cheap.
    pub fn new(params: ProofParams) -> Result<Self, ComptokenError> {
        let header = params.construct_header();
        let hash = generate_hash(&header);

        if !is_lower_than_target(&hash, &params.target) {
            return Err(ComptokenError::InsufficientDifficulty);
        }
        Ok(Self {
            params,
            header,
            hash,
        })
    }

    pub fn params(&self) -> &ProofParams {
        &self.params
    }

    pub fn pubkey(&self) -> &Pubkey {
        &self.params.pubkey
    }

    pub fn header(&self) -> &[u8; HEADER_LEN] {
        &self.header
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// The payload of a `ProofSubmission` instruction:
    /// pubkey ∥ extra_data ∥ nonce ∥ version ∥ timestamp.
    pub fn serialize_data(&self) -> Result<[u8; PROOF_DATA_LEN], ComptokenError> {
        let mut buffer = Vec::with_capacity(PROOF_DATA_LEN);
        buffer.extend_from_slice(self.params.pubkey.as_ref());
        buffer.extend_from_slice(&self.params.extra_data);
        buffer.extend_from_slice(&self.params.nonce.to_le_bytes());
        buffer.extend_from_slice(&self.params.version.to_le_bytes());
        buffer.extend_from_slice(&self.params.timestamp.to_le_bytes());
        buffer
            .try_into()
            .map_err(|buffer: Vec<u8>| ComptokenError::InvalidPayloadLength(buffer.len()))
    }

    /// Brute-force a proof against the devnet target.
    ///
    /// The recent blockhash is word-swapped first, as a miner reading the
    /// blockhash from `GetValidBlockhashes` would. Then every nonce from 0
    /// upward is tried. Only meant for building test fixtures.
    #[cfg(any(test, feature = "mining"))]
    pub fn mine(
        pubkey: Pubkey,
        recent_block_hash: [u8; 32],
        extra_data: [u8; 32],
        version: u32,
        timestamp: u32,
    ) -> Result<Self, ComptokenError> {
        use crate::config::Cluster;

        let mut recent_block_hash = recent_block_hash;
        swap32(&mut recent_block_hash);

        let mut params = ProofParams {
            pubkey,
            recent_block_hash,
            extra_data,
            nonce: 0,
            version,
            timestamp,
            target: Cluster::Devnet.target(),
        };
        for nonce in 0..=u32::MAX {
            params.nonce = nonce;
            match ComptokenProof::new(params) {
                Ok(proof) => {
                    log::debug!("mined proof with nonce {}", nonce);
                    return Ok(proof);
                }
                Err(ComptokenError::InsufficientDifficulty) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(ComptokenError::MiningExhausted)
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cluster;

    fn params(nonce: u32, target: [u8; 32]) -> ProofParams {
        ProofParams {
            pubkey: Pubkey::new_from_array([7; 32]),
            recent_block_hash: core::array::from_fn(|i| i as u8),
            extra_data: [0x42; 32],
            nonce,
            version: 2,
            timestamp: 1_718_841_600,
            target,
        }
    }

    fn with_prefix(prefix: &[u8]) -> [u8; 32] {
        let mut bytes = [0xffu8; 32];
        bytes[..prefix.len()].copy_from_slice(prefix);
        bytes
    }

    #[test]
    fn test_is_lower_than_target() {
        let target = with_prefix(&[0, 0, 5]);

        assert!(is_lower_than_target(&with_prefix(&[0, 0, 4]), &target));
        assert!(!is_lower_than_target(&target, &target));
        assert!(!is_lower_than_target(&with_prefix(&[0, 0, 6]), &target));
    }

    #[test]
    fn test_make_target_bytes() {
        let target = make_target_bytes(24).unwrap();
        let mut expected = [0u8; 32];
        expected[5..8].copy_from_slice(&[0x0e, 0xad, 0xd8]);
        assert_eq!(target, expected);

        assert_eq!(&make_target_bytes(0).unwrap()[29..], &[0x0e, 0xad, 0xd8]);
        assert_eq!(&make_target_bytes(29).unwrap()[..3], &[0x0e, 0xad, 0xd8]);
    }

    #[test]
    fn test_make_target_bytes_out_of_range() {
        assert_eq!(
            make_target_bytes(30).unwrap_err(),
            ComptokenError::InvalidDifficulty(30)
        );
        assert_eq!(
            make_target_bytes(usize::MAX).unwrap_err(),
            ComptokenError::InvalidDifficulty(usize::MAX)
        );
    }

    #[test]
    fn test_reverse_and_swap_endianness() {
        let input: [u8; 32] = core::array::from_fn(|i| i as u8);
        let out = reverse_and_swap_endianness(&input);

        // Reversing then swapping each word reverses the word order only
        assert_eq!(&out[0..4], &[28, 29, 30, 31]);
        assert_eq!(&out[28..32], &[0, 1, 2, 3]);
    }

    #[test]
    fn test_header_layout() {
        let p = params(0xdead_beef, [0xff; 32]);
        let header = p.construct_header();

        assert_eq!(&header[0..4], &2u32.to_le_bytes());
        assert_eq!(&header[4..8], &[28, 29, 30, 31]);
        assert_eq!(&header[36..68], &p.merkle_root());
        assert_eq!(&header[68..72], &1_718_841_600u32.to_le_bytes());
        assert_eq!(&header[72..76], &[0xd8, 0xad, 0x0e, 0x18]);
        assert_eq!(&header[76..80], &0xdead_beefu32.to_le_bytes());
    }

    #[test]
    fn test_proof_is_deterministic() {
        let a = ComptokenProof::new(params(1, [0xff; 32])).unwrap();
        let b = ComptokenProof::new(params(1, [0xff; 32])).unwrap();

        assert_eq!(a.header(), b.header());
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), &generate_hash(a.header()));
    }

    #[test]
    fn test_zero_target_rejects_everything() {
        assert_eq!(
            ComptokenProof::new(params(1, [0; 32])).unwrap_err(),
            ComptokenError::InsufficientDifficulty
        );
    }

    #[test]
    fn test_serialize_data() {
        let proof = ComptokenProof::new(params(9, [0xff; 32])).unwrap();
        let data = proof.serialize_data().unwrap();

        assert_eq!(data.len(), PROOF_DATA_LEN);
        assert_eq!(&data[0..32], &[7; 32]);
        assert_eq!(&data[32..64], &[0x42; 32]);
        assert_eq!(&data[64..68], &9u32.to_le_bytes());
        assert_eq!(&data[68..72], &2u32.to_le_bytes());
        assert_eq!(&data[72..76], &1_718_841_600u32.to_le_bytes());
    }

    #[test]
    fn test_mine_devnet_proof() {
        let proof = ComptokenProof::mine(
            Pubkey::new_from_array([7; 32]),
            [3; 32],
            [0x42; 32],
            2,
            1_718_841_600,
        )
        .unwrap();

        assert!(is_lower_than_target(proof.hash(), &Cluster::Devnet.target()));
        // Rebuilding from the returned parameters gives the same proof
        assert_eq!(ComptokenProof::new(*proof.params()).unwrap(), proof);
    }
}
