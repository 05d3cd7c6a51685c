/// Day-over-day anomaly correction.
///
/// Compares today's aggregate against the most recent stored record and
/// decides the day's adjusted temperature. The rules are evaluated in a
/// fixed order and the first match wins:
///
/// 1. No prior record        → adjusted = today's average (cold start).
/// 2. No aggregate today     → copy the prior record's fields wholesale.
/// 3. Average out of range   → adjusted = prior raw temp.
/// 4. Divergence > threshold → adjusted = mean of prior and today.
/// 5. Otherwise              → adjusted = today's average.
///
/// Every combination of inputs maps to an outcome; nothing here fails.
/// Which rule fired is reported back so the caller can log it.

use rust_decimal::Decimal;

use crate::analysis::round1;
use crate::analysis::thresholds::CorrectionConfig;
use crate::model::{DailyAggregate, PriorRecord};

/// Which correction rule produced a `CorrectedDay`.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrectionRule {
    /// No stored record before today.
    ColdStart,
    /// No samples today; yesterday's record was carried forward.
    CarriedForward,
    /// Today's average fell outside the plausible range.
    OutOfRange { avg: Decimal },
    /// Today diverged from the prior temperature by more than the threshold.
    Blended { delta: Decimal },
    /// Today's average was accepted as-is.
    Accepted,
}

impl CorrectionRule {
    /// Rules that indicate missing or suspect input rather than normal
    /// operation. These are logged at warning level.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            CorrectionRule::ColdStart
                | CorrectionRule::CarriedForward
                | CorrectionRule::OutOfRange { .. }
        )
    }
}

/// The corrector's output: the temperature fields of the day's summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedDay {
    pub temp: Option<Decimal>,
    pub adjusted_temp: Option<Decimal>,
    pub max_temp: Option<Decimal>,
    pub min_temp: Option<Decimal>,
    pub pressure: Option<Decimal>,
    pub rule: CorrectionRule,
}

impl CorrectedDay {
    fn from_today(today: Option<&DailyAggregate>, adjusted: Option<Decimal>, rule: CorrectionRule) -> Self {
        Self {
            temp: today.map(|a| a.avg_temp),
            adjusted_temp: adjusted,
            max_temp: today.map(|a| a.max_temp),
            min_temp: today.map(|a| a.min_temp),
            pressure: today.map(|a| a.avg_pressure),
            rule,
        }
    }
}

/// Applies the correction rules to today's aggregate and the prior record.
pub fn correct(
    today: Option<&DailyAggregate>,
    prior: Option<&PriorRecord>,
    config: &CorrectionConfig,
) -> CorrectedDay {
    let avg = today.map(|a| a.avg_temp);

    let Some(prior) = prior else {
        return CorrectedDay::from_today(today, avg, CorrectionRule::ColdStart);
    };

    let Some(today) = today else {
        return CorrectedDay {
            temp: prior.temp,
            adjusted_temp: prior.temp,
            max_temp: prior.max_temp,
            min_temp: prior.min_temp,
            pressure: prior.pressure,
            rule: CorrectionRule::CarriedForward,
        };
    };

    let avg = today.avg_temp;
    if !config.is_plausible(avg) {
        return CorrectedDay::from_today(Some(today), prior.temp, CorrectionRule::OutOfRange { avg });
    }

    // A prior row with a NULL temperature gives nothing to diverge from.
    let Some(prior_temp) = prior.temp else {
        return CorrectedDay::from_today(Some(today), Some(avg), CorrectionRule::Accepted);
    };

    let delta = (avg - prior_temp).abs();
    if delta > config.divergence_threshold {
        let blended = round1((prior_temp + avg) / Decimal::TWO);
        return CorrectedDay::from_today(Some(today), Some(blended), CorrectionRule::Blended { delta });
    }

    CorrectedDay::from_today(Some(today), Some(avg), CorrectionRule::Accepted)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
