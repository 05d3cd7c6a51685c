/// Daily aggregation of hourly samples.
///
/// Reduces the (at most 24) samples the store returned for a station into
/// one `DailyAggregate`. The samples are already filtered to the plausible
/// temperature range and the lookback window; this module only does the
/// arithmetic.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::analysis::round1;
use crate::model::{DailyAggregate, RawSample};

/// Reduces `samples` to a daily aggregate.
///
/// Returns `None` when `samples` is empty. That is "no data today", not a
/// failure: the corrector has a rule for it.
///
/// - `avg_temp` and `avg_pressure` are arithmetic means rounded half-up to
///   one decimal place.
/// - `min_temp` and `max_temp` are exact.
///
/// Samples carry one decimal place (see `RawSample`), which keeps the
/// rounded average inside `[min_temp, max_temp]`.
pub fn aggregate(
    station_id: &str,
    date: NaiveDate,
    samples: &[RawSample],
) -> Option<DailyAggregate> {
    let first = samples.first()?;

    let mut temp_sum = Decimal::ZERO;
    let mut pressure_sum = Decimal::ZERO;
    let mut min_temp = first.temperature;
    let mut max_temp = first.temperature;
    let mut observed_from = first.observed_at;
    let mut observed_to = first.observed_at;

    for sample in samples {
        temp_sum += sample.temperature;
        pressure_sum += sample.pressure;
        min_temp = min_temp.min(sample.temperature);
        max_temp = max_temp.max(sample.temperature);
        observed_from = observed_from.min(sample.observed_at);
        observed_to = observed_to.max(sample.observed_at);
    }

    let count = Decimal::from(samples.len());

    Some(DailyAggregate {
        station_id: station_id.to_string(),
        date,
        avg_temp: round1(temp_sum / count),
        min_temp,
        max_temp,
        avg_pressure: round1(pressure_sum / count),
        observed_from,
        observed_to,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
