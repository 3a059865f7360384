//! Custom Error Types
//!
//! Every fallible operation in this crate returns [`ComptokenError`].
//! Each variant has a stable numeric code so callers that bridge into
//! on-chain tooling can convert it into a `ProgramError::Custom`.
//!
//! # Error Code Ranges
//!
//! | Range | Category |
//! |-------|----------|
//! | 0-5 | Account codec errors |
//! | 6-8 | Proof-of-work errors |
//! | 9-12 | Instruction, arithmetic and configuration errors |
//!
//! # Usage
//!
//! ```ignore
//! use comptoken_client::ComptokenError;
//!
//! fn read(data: &[u8]) -> Result<UserData, ComptokenError> {
//!     UserData::unpack(data)
//! }
//! ```

use solana_program::program_error::ProgramError;
use thiserror::Error;

// =============================================================================
// ERROR ENUM
// =============================================================================

/// Errors that may be returned by the Comptoken client.
///
/// # Important
///
/// The numeric code of a variant is its position in this enum.
/// Never reorder variants; always add new ones at the end.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComptokenError {
    // =========================================================================
    // ACCOUNT CODEC ERRORS (0-5)
    // =========================================================================

    /// Error 0: The buffer ends before a fixed or declared-length field.
    #[error("Truncated buffer: needed {needed} bytes at offset {offset}, only {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Error 1: The extension region starts with the wrong account type.
    ///
    /// Token accounts carry `2` at byte 165 when they have extensions.
    #[error("Incorrect account type: type is {found} but should be {expected}")]
    WrongAccountType { expected: u8, found: u8 },

    /// Error 2: An encoder wrote a different number of bytes than `size()`.
    #[error("Size mismatch: expected {expected} bytes, wrote {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Error 3: An optional field's presence tag is neither 0 nor 1.
    #[error("Invalid option tag {0}")]
    InvalidOptionTag(u32),

    /// Error 4: The token account state byte is not 0, 1 or 2.
    #[error("Invalid account state {0}")]
    InvalidAccountState(u8),

    /// Error 5: The account is not owned by the expected program.
    #[error("Account is not owned by the expected program")]
    InvalidAccountOwner,

    // =========================================================================
    // PROOF-OF-WORK ERRORS (6-8)
    // =========================================================================

    /// Error 6: The proof hash is not lower than the target.
    ///
    /// This is the common outcome while mining; it is cheap to handle.
    #[error("The provided proof does not have enough zeroes")]
    InsufficientDifficulty,

    /// Error 7: Every u32 nonce was tried without finding a valid proof.
    #[error("Failed to mine a valid proof after 2^32 attempts")]
    MiningExhausted,

    /// Error 8: The serialized proof is not exactly 76 bytes.
    #[error("Incorrect proof payload length: {0}")]
    InvalidPayloadLength(usize),

    // =========================================================================
    // INSTRUCTION, ARITHMETIC AND CONFIGURATION ERRORS (9-12)
    // =========================================================================

    /// Error 9: Instruction data could not be parsed.
    #[error("Invalid instruction")]
    InvalidInstruction,

    /// Error 10: An arithmetic operation overflowed.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Error 11: The cluster name is not recognised.
    #[error("Unknown cluster: {0}")]
    UnknownCluster(String),

    /// Error 12: A target difficulty leaves no room for the target marker.
    #[error("Target difficulty {0} is out of range")]
    InvalidDifficulty(usize),
}

impl ComptokenError {
    /// Stable numeric code of this error.
    pub fn code(&self) -> u32 {
        match self {
            ComptokenError::TruncatedBuffer { .. } => 0,
            ComptokenError::WrongAccountType { .. } => 1,
            ComptokenError::SizeMismatch { .. } => 2,
            ComptokenError::InvalidOptionTag(_) => 3,
            ComptokenError::InvalidAccountState(_) => 4,
            ComptokenError::InvalidAccountOwner => 5,
            ComptokenError::InsufficientDifficulty => 6,
            ComptokenError::MiningExhausted => 7,
            ComptokenError::InvalidPayloadLength(_) => 8,
            ComptokenError::InvalidInstruction => 9,
            ComptokenError::Overflow => 10,
            ComptokenError::UnknownCluster(_) => 11,
            ComptokenError::InvalidDifficulty(_) => 12,
        }
    }
}

// =============================================================================
// CONVERSION TO PROGRAMERROR
// =============================================================================

/// Convert ComptokenError to ProgramError.
///
/// ```ignore
/// let err: ProgramError = ComptokenError::Overflow.into();
/// assert_eq!(err, ProgramError::Custom(10));
/// ```
impl From<ComptokenError> for ProgramError {
    fn from(e: ComptokenError) -> Self {
        ProgramError::Custom(e.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let truncated = ComptokenError::TruncatedBuffer {
            offset: 0,
            needed: 8,
            available: 2,
        };
        assert_eq!(truncated.code(), 0);
        assert_eq!(
            ComptokenError::WrongAccountType { expected: 2, found: 1 }.code(),
            1
        );
        assert_eq!(ComptokenError::InsufficientDifficulty.code(), 6);
        assert_eq!(ComptokenError::UnknownCluster("x".into()).code(), 11);
        assert_eq!(ComptokenError::InvalidDifficulty(30).code(), 12);
    }

    #[test]
    fn test_into_program_error() {
        let err: ProgramError = ComptokenError::Overflow.into();
        assert_eq!(err, ProgramError::Custom(10));
    }

    #[test]
    fn test_error_messages() {
        let err = ComptokenError::WrongAccountType { expected: 2, found: 1 };
        assert_eq!(
            err.to_string(),
            "Incorrect account type: type is 1 but should be 2"
        );
        assert_eq!(
            ComptokenError::InvalidPayloadLength(75).to_string(),
            "Incorrect proof payload length: 75"
        );
    }
}
