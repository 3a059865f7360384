//! Distribution Replay
//!
//! Every day the Comptoken program records an interest rate and a UBI amount
//! in the global data ring buffer. A holder who has not claimed for `d` days
//! is owed the last `d` distributions, compounded on their balance.
//!
//! ```text
//! physical:  [ ... | 362 | 363 | 364 | 0 | 1 | 2 | ... ]
//!                              oldest ─┘
//! logical:   oldest, oldest+1, ..., oldest+364   (slot = logical % 365)
//! ```

use crate::constants::{DAILY_DISTRIBUTION_HISTORY_SIZE, SEC_PER_DAY};
use crate::error::ComptokenError;
use crate::state::{DailyDistributionData, HistoricDistribution};
use num_traits::ToPrimitive;

// =============================================================================
// HISTORIC DISTRIBUTIONS
// =============================================================================

/// Iterator over the distribution ring buffer, oldest first.
///
/// Yields exactly 365 entries. Cloning gives an independent iterator at the
/// same position, so the history can be walked again without re-decoding.
#[derive(Clone, Debug)]
pub struct HistoricDistributions<'a> {
    ring: &'a [HistoricDistribution; DAILY_DISTRIBUTION_HISTORY_SIZE],
    next: u64,
    end: u64,
}

impl<'a> HistoricDistributions<'a> {
    pub fn new(
        ring: &'a [HistoricDistribution; DAILY_DISTRIBUTION_HISTORY_SIZE],
        oldest_historic_value: u64,
    ) -> Self {
        // Work modulo 365 so the logical range never overflows
        let start = oldest_historic_value % DAILY_DISTRIBUTION_HISTORY_SIZE as u64;
        Self {
            ring,
            next: start,
            end: start + DAILY_DISTRIBUTION_HISTORY_SIZE as u64,
        }
    }

    /// Drop all but the most recent `days` entries.
    pub fn most_recent(mut self, days: usize) -> Self {
        let skip = self.len().saturating_sub(days) as u64;
        self.next += skip;
        self
    }
}

impl<'a> Iterator for HistoricDistributions<'a> {
    type Item = &'a HistoricDistribution;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let slot = (self.next % DAILY_DISTRIBUTION_HISTORY_SIZE as u64) as usize;
        self.next += 1;
        let ring: &'a [HistoricDistribution; DAILY_DISTRIBUTION_HISTORY_SIZE] = self.ring;
        ring.get(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HistoricDistributions<'_> {}

// =============================================================================
// REPLAY
// =============================================================================

/// Amounts owed to a holder since their last payout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DistributionOwed {
    pub interest_owed: u64,
    pub ubi_owed: u64,
}

impl DistributionOwed {
    pub fn total(&self) -> Option<u64> {
        self.interest_owed.checked_add(self.ubi_owed)
    }
}

/// Replay the last `days_since_last_payout` distributions on `balance`.
///
/// Each day compounds the running balance by that day's interest rate,
/// rounding to the nearest whole unit, then adds the day's UBI if the holder
/// is a verified human. Verification is checked once for the whole replay.
///
/// `interest_owed` is unsigned and clamped at 0: when negative rates shrink
/// the balance, the loss is not reported and `ubi_owed` is still paid in
/// full. Fails with `Overflow` if a compounded balance or a sum leaves the
/// `u64` range.
pub fn replay_distribution(
    daily: &DailyDistributionData,
    balance: u64,
    days_since_last_payout: u64,
    is_verified_human: bool,
) -> Result<DistributionOwed, ComptokenError> {
    let days = days_since_last_payout.min(DAILY_DISTRIBUTION_HISTORY_SIZE as u64) as usize;

    let mut running = balance;
    let mut ubi_total: u64 = 0;
    for distribution in daily.historic_distributions().most_recent(days) {
        let compounded = (running as f64 * (1.0 + distribution.interest_rate)).round();
        running = compounded.to_u64().ok_or(ComptokenError::Overflow)?;

        if is_verified_human {
            running = running
                .checked_add(distribution.ubi_amount)
                .ok_or(ComptokenError::Overflow)?;
            ubi_total = ubi_total
                .checked_add(distribution.ubi_amount)
                .ok_or(ComptokenError::Overflow)?;
        }
    }

    let interest_owed = running
        .saturating_sub(balance)
        .saturating_sub(ubi_total);

    log::trace!(
        "replayed {} days on balance {}: interest {}, ubi {}",
        days,
        balance,
        interest_owed,
        ubi_total
    );

    Ok(DistributionOwed {
        interest_owed,
        ubi_owed: ubi_total,
    })
}

// =============================================================================
// TIME
// =============================================================================

/// Floor a unix timestamp to the start of its day.
pub fn normalize_time(unix_timestamp: i64) -> i64 {
    unix_timestamp - unix_timestamp.rem_euclid(SEC_PER_DAY)
}

/// Whole days between the last payout and the start of today, at most 365.
///
/// A payout in the future (clock skew) counts as zero days.
pub fn days_since_last_payout(now: i64, last_interest_payout_date: i64) -> u64 {
    let elapsed = normalize_time(now).saturating_sub(last_interest_payout_date);
    if elapsed <= 0 {
        return 0;
    }
    ((elapsed / SEC_PER_DAY) as u64).min(DAILY_DISTRIBUTION_HISTORY_SIZE as u64)
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(interest_rate: f64, ubi_amount: u64) -> DailyDistributionData {
        let mut daily = DailyDistributionData::default();
        daily.historic_distributions = [HistoricDistribution {
            interest_rate,
            ubi_amount,
        }; DAILY_DISTRIBUTION_HISTORY_SIZE];
        daily
    }

    /// Slot `i` has ubi `i`, so yielded values reveal the physical order.
    fn indexed(oldest_historic_value: u64) -> DailyDistributionData {
        let mut daily = DailyDistributionData::default();
        for (i, distribution) in daily.historic_distributions.iter_mut().enumerate() {
            distribution.ubi_amount = i as u64;
        }
        daily.oldest_historic_value = oldest_historic_value;
        daily
    }

    #[test]
    fn test_iterator_wraps_from_oldest() {
        let daily = indexed(400);
        let ubis: Vec<u64> = daily.historic_distributions().map(|d| d.ubi_amount).collect();

        assert_eq!(ubis.len(), 365);
        // 400 % 365 = 35
        assert_eq!(ubis[0], 35);
        assert_eq!(ubis[329], 364);
        assert_eq!(ubis[330], 0);
        assert_eq!(ubis[364], 34);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let daily = indexed(7);
        let iter = daily.historic_distributions();

        assert_eq!(iter.len(), 365);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_iterator_handles_max_oldest_value() {
        let daily = indexed(u64::MAX);
        assert_eq!(daily.historic_distributions().count(), 365);
    }

    #[test]
    fn test_most_recent() {
        let daily = indexed(0);
        let recent: Vec<u64> = daily
            .historic_distributions()
            .most_recent(3)
            .map(|d| d.ubi_amount)
            .collect();
        assert_eq!(recent, vec![362, 363, 364]);

        assert_eq!(daily.historic_distributions().most_recent(0).count(), 0);
        assert_eq!(daily.historic_distributions().most_recent(1000).count(), 365);
    }

    #[test]
    fn test_replay_ubi_only() {
        let daily = uniform(0.0, 10);

        let owed = replay_distribution(&daily, 1_000, 5, true).unwrap();
        assert_eq!(
            owed,
            DistributionOwed {
                interest_owed: 0,
                ubi_owed: 50
            }
        );

        let owed = replay_distribution(&daily, 1_000, 5, false).unwrap();
        assert_eq!(owed, DistributionOwed::default());
    }

    #[test]
    fn test_replay_compounds_interest() {
        let daily = uniform(0.1, 0);

        // 1000 → 1100 → 1210
        let owed = replay_distribution(&daily, 1_000, 2, false).unwrap();
        assert_eq!(owed.interest_owed, 210);
        assert_eq!(owed.ubi_owed, 0);
    }

    #[test]
    fn test_replay_rounds_each_day() {
        let daily = uniform(0.5, 0);

        // 3 → 4.5 → 5 (rounded) → 7.5 → 8
        let owed = replay_distribution(&daily, 3, 2, false).unwrap();
        assert_eq!(owed.interest_owed, 5);
    }

    #[test]
    fn test_replay_interest_on_ubi() {
        let daily = uniform(0.1, 100);

        // day 1: 1000 → 1100 + 100 = 1200; day 2: 1200 → 1320 + 100 = 1420
        let owed = replay_distribution(&daily, 1_000, 2, true).unwrap();
        assert_eq!(owed.ubi_owed, 200);
        assert_eq!(owed.interest_owed, 220);
        assert_eq!(owed.total(), Some(420));
    }

    #[test]
    fn test_replay_negative_rate_owes_no_interest() {
        let daily = uniform(-0.5, 0);

        // 1000 → 500 → 250
        let owed = replay_distribution(&daily, 1_000, 2, false).unwrap();
        assert_eq!(owed, DistributionOwed::default());

        // 1000 → 500 + 100 = 600 → 300 + 100 = 400; UBI is still owed
        let daily = uniform(-0.5, 100);
        let owed = replay_distribution(&daily, 1_000, 2, true).unwrap();
        assert_eq!(owed.interest_owed, 0);
        assert_eq!(owed.ubi_owed, 200);
    }

    #[test]
    fn test_replay_clamps_days() {
        let daily = uniform(0.0, 1);

        let owed = replay_distribution(&daily, 0, 10_000, true).unwrap();
        assert_eq!(owed.ubi_owed, 365);

        let owed = replay_distribution(&daily, 0, 0, true).unwrap();
        assert_eq!(owed.ubi_owed, 0);
    }

    #[test]
    fn test_replay_overflow() {
        let daily = uniform(1.0, 0);
        assert_eq!(
            replay_distribution(&daily, u64::MAX / 2, 3, false).unwrap_err(),
            ComptokenError::Overflow
        );

        let daily = uniform(0.0, u64::MAX);
        assert_eq!(
            replay_distribution(&daily, 1, 1, true).unwrap_err(),
            ComptokenError::Overflow
        );
    }

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time(1_718_841_600), 1_718_841_600);
        assert_eq!(normalize_time(1_718_841_600 + 3_600), 1_718_841_600);
        assert_eq!(normalize_time(-1), -SEC_PER_DAY);
    }

    #[test]
    fn test_days_since_last_payout() {
        let today = 1_718_841_600;

        assert_eq!(days_since_last_payout(today + 100, today), 0);
        assert_eq!(days_since_last_payout(today + 100, today - 3 * SEC_PER_DAY), 3);
        assert_eq!(days_since_last_payout(today, 0), 365);
        assert_eq!(days_since_last_payout(today, today + SEC_PER_DAY), 0);
    }
}
