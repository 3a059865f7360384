//! Global Data Account State
//!
//! The Comptoken program keeps one global data account. It holds the
//! blockhashes proofs may be mined against and the history of daily
//! interest/UBI distributions.
//!
//! # Size: 5960 bytes
//!
//! ```text
//! ValidBlockhashes       32 + 8 + 32 + 8           =   80
//! DailyDistributionData  8 × 5 + 365 × (8 + 8)     = 5880
//!                                                    ----
//!                                                    5960
//! ```

use crate::constants::{DAILY_DISTRIBUTION_HISTORY_SIZE, GLOBAL_DATA_SIZE};
use crate::distribution::HistoricDistributions;
use crate::error::ComptokenError;
use crate::state::layout::{check_size, ByteReader, ByteWriter};
use crate::state::AccountData;
use solana_program::hash::Hash;

// =============================================================================
// VALID BLOCKHASHES
// =============================================================================

/// Blockhashes a proof may currently reference.
///
/// A new blockhash is announced a day before it becomes valid, giving miners
/// time to start on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidBlockhashes {
    pub announced_blockhash: Hash,
    /// Unix time, never negative.
    pub announced_blockhash_time: i64,
    pub valid_blockhash: Hash,
    /// Unix time, never negative.
    pub valid_blockhash_time: i64,
}

impl ValidBlockhashes {
    pub const LEN: usize = 80;

    /// True if a proof mined against `blockhash` would be accepted.
    pub fn is_valid(&self, blockhash: &Hash) -> bool {
        *blockhash == self.valid_blockhash || *blockhash == self.announced_blockhash
    }

    fn unpack(reader: &mut ByteReader<'_>) -> Result<Self, ComptokenError> {
        Ok(ValidBlockhashes {
            announced_blockhash: reader.read_hash()?,
            announced_blockhash_time: reader.read_i64()?,
            valid_blockhash: reader.read_hash()?,
            valid_blockhash_time: reader.read_i64()?,
        })
    }

    fn pack(&self, writer: &mut ByteWriter<'_>) -> Result<(), ComptokenError> {
        writer.write_hash(&self.announced_blockhash)?;
        writer.write_i64(self.announced_blockhash_time)?;
        writer.write_hash(&self.valid_blockhash)?;
        writer.write_i64(self.valid_blockhash_time)
    }
}

// =============================================================================
// DAILY DISTRIBUTION DATA
// =============================================================================

/// One day's distribution: the interest rate applied to every balance and
/// the UBI paid to each verified human.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistoricDistribution {
    pub interest_rate: f64,
    pub ubi_amount: u64,
}

impl HistoricDistribution {
    pub const LEN: usize = 16;
}

/// Supply bookkeeping and the last 365 daily distributions.
///
/// `historic_distributions` is a ring buffer. The oldest entry is at logical
/// index `oldest_historic_value`; logical index `i` lives in physical slot
/// `i % 365`. All 365 slots are always encoded, populated or not.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyDistributionData {
    pub yesterday_supply: u64,
    pub high_water_mark: u64,
    /// Unix time, never negative.
    pub last_daily_distribution_time: i64,
    pub verified_humans: u64,
    pub oldest_historic_value: u64,
    pub historic_distributions: [HistoricDistribution; DAILY_DISTRIBUTION_HISTORY_SIZE],
}

impl Default for DailyDistributionData {
    fn default() -> Self {
        Self {
            yesterday_supply: 0,
            high_water_mark: 0,
            last_daily_distribution_time: 0,
            verified_humans: 0,
            oldest_historic_value: 0,
            historic_distributions: [HistoricDistribution::default(); DAILY_DISTRIBUTION_HISTORY_SIZE],
        }
    }
}

impl DailyDistributionData {
    pub const LEN: usize = 8 * 5 + HistoricDistribution::LEN * DAILY_DISTRIBUTION_HISTORY_SIZE;

    /// The full history, oldest first.
    pub fn historic_distributions(&self) -> HistoricDistributions<'_> {
        HistoricDistributions::new(&self.historic_distributions, self.oldest_historic_value)
    }

    fn unpack(reader: &mut ByteReader<'_>) -> Result<Self, ComptokenError> {
        let yesterday_supply = reader.read_u64()?;
        let high_water_mark = reader.read_u64()?;
        let last_daily_distribution_time = reader.read_i64()?;
        let verified_humans = reader.read_u64()?;
        let oldest_historic_value = reader.read_u64()?;

        let mut historic_distributions =
            [HistoricDistribution::default(); DAILY_DISTRIBUTION_HISTORY_SIZE];
        for distribution in historic_distributions.iter_mut() {
            distribution.interest_rate = reader.read_f64()?;
            distribution.ubi_amount = reader.read_u64()?;
        }

        Ok(DailyDistributionData {
            yesterday_supply,
            high_water_mark,
            last_daily_distribution_time,
            verified_humans,
            oldest_historic_value,
            historic_distributions,
        })
    }

    fn pack(&self, writer: &mut ByteWriter<'_>) -> Result<(), ComptokenError> {
        writer.write_u64(self.yesterday_supply)?;
        writer.write_u64(self.high_water_mark)?;
        writer.write_i64(self.last_daily_distribution_time)?;
        writer.write_u64(self.verified_humans)?;
        writer.write_u64(self.oldest_historic_value)?;
        for distribution in &self.historic_distributions {
            writer.write_f64(distribution.interest_rate)?;
            writer.write_u64(distribution.ubi_amount)?;
        }
        Ok(())
    }
}

// =============================================================================
// GLOBAL DATA
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalData {
    pub valid_blockhashes: ValidBlockhashes,
    pub daily_distribution_data: DailyDistributionData,
}

impl GlobalData {
    pub const LEN: usize = ValidBlockhashes::LEN + DailyDistributionData::LEN;
}

impl AccountData for GlobalData {
    fn size(&self) -> usize {
        Self::LEN
    }

    fn unpack(input: &[u8]) -> Result<Self, ComptokenError> {
        let mut reader = ByteReader::new(input);
        let valid_blockhashes = ValidBlockhashes::unpack(&mut reader)?;
        let daily_distribution_data = DailyDistributionData::unpack(&mut reader)?;
        Ok(GlobalData {
            valid_blockhashes,
            daily_distribution_data,
        })
    }

    fn pack(&self, output: &mut [u8]) -> Result<usize, ComptokenError> {
        let mut writer = ByteWriter::new(output);
        self.valid_blockhashes.pack(&mut writer)?;
        self.daily_distribution_data.pack(&mut writer)?;
        check_size(GLOBAL_DATA_SIZE, writer.offset())?;
        Ok(writer.offset())
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GlobalData {
        let mut data = GlobalData::default();
        data.valid_blockhashes = ValidBlockhashes {
            announced_blockhash: Hash::new_from_array([1; 32]),
            announced_blockhash_time: 1_718_928_000,
            valid_blockhash: Hash::new_from_array([2; 32]),
            valid_blockhash_time: 1_718_841_600,
        };
        let daily = &mut data.daily_distribution_data;
        daily.yesterday_supply = 1_000_000;
        daily.high_water_mark = 42;
        daily.last_daily_distribution_time = 1_718_841_600;
        daily.verified_humans = 7;
        daily.oldest_historic_value = 400;
        for (i, distribution) in daily.historic_distributions.iter_mut().enumerate() {
            distribution.interest_rate = i as f64 * 0.0001;
            distribution.ubi_amount = i as u64;
        }
        data
    }

    #[test]
    fn test_size_matches_program_constant() {
        assert_eq!(GlobalData::LEN, GLOBAL_DATA_SIZE);
        assert_eq!(ValidBlockhashes::LEN, 80);
        assert_eq!(DailyDistributionData::LEN, 5880);
    }

    #[test]
    fn test_roundtrip() {
        let data = sample();
        let packed = data.to_bytes().unwrap();
        assert_eq!(packed.len(), 5960);
        assert_eq!(GlobalData::unpack(&packed).unwrap(), data);
    }

    #[test]
    fn test_layout_offsets() {
        let packed = sample().to_bytes().unwrap();

        assert_eq!(&packed[0..32], &[1; 32]);
        assert_eq!(&packed[32..40], &1_718_928_000i64.to_le_bytes());
        assert_eq!(&packed[40..72], &[2; 32]);
        // oldest_historic_value is the fifth u64 of the distribution data
        assert_eq!(&packed[112..120], &400u64.to_le_bytes());
        // last slot of the ring buffer
        assert_eq!(&packed[5952..5960], &364u64.to_le_bytes());
    }

    #[test]
    fn test_truncated() {
        let packed = sample().to_bytes().unwrap();
        assert!(matches!(
            GlobalData::unpack(&packed[..5959]),
            Err(ComptokenError::TruncatedBuffer { offset: 5952, .. })
        ));
    }

    #[test]
    fn test_valid_blockhashes() {
        let hashes = sample().valid_blockhashes;
        assert!(hashes.is_valid(&Hash::new_from_array([1; 32])));
        assert!(hashes.is_valid(&Hash::new_from_array([2; 32])));
        assert!(!hashes.is_valid(&Hash::new_from_array([3; 32])));
    }
}
