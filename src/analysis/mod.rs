/// Temperature derivation for the station temperature service.
///
/// Everything in here is a pure function of already-fetched values: no I/O,
/// no clock, no state carried between calls. The store adapter fetches,
/// these modules compute, the pipeline persists.
///
/// Submodules:
/// - `aggregate`  — reduces hourly samples to a daily aggregate.
/// - `smoothing`  — linearly-weighted moving average over stored history.
/// - `correction` — the day-over-day anomaly correction rule.
/// - `thresholds` — tunable constants shared by the above.

pub mod aggregate;
pub mod correction;
pub mod smoothing;
pub mod thresholds;

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to one decimal place, half away from zero.
///
/// Temperatures and pressures are non-negative in practice, so this is
/// plain half-up: 22.25 → 22.3, 22.35 → 22.4.
pub fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1_rounds_half_up() {
        assert_eq!(round1(Decimal::new(2225, 2)), Decimal::new(223, 1));
        assert_eq!(round1(Decimal::new(2235, 2)), Decimal::new(224, 1));
    }

    #[test]
    fn test_round1_leaves_one_decimal_untouched() {
        assert_eq!(round1(Decimal::new(185, 1)), Decimal::new(185, 1));
    }

    #[test]
    fn test_round1_truncates_below_midpoint() {
        assert_eq!(round1(Decimal::new(101244, 2)), Decimal::new(10124, 1));
    }
}
