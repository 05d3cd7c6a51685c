/// Linearly-weighted moving average over stored daily history.
///
/// The newest record weighs as much as there are records; each older one
/// weighs one less, down to 1 for the oldest:
///
///   weight_temp = (t_oldest × 1 + … + t_newest × N) ÷ (1 + … + N)
///
/// Each record contributes its adjusted temperature when one was stored,
/// otherwise its raw daily average.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::analysis::round1;
use crate::model::HistoryRecord;

/// One record's share of the weighted average.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub date: NaiveDate,
    pub temp: Decimal,
    pub weight: u32,
}

/// Assigns weights to `history` (newest first).
///
/// Only the first `window` records are considered. Records that carry
/// neither an adjusted nor a raw temperature cannot contribute and are
/// dropped before weighting, so the remaining records still run N..1.
pub fn weighted_terms(history: &[HistoryRecord], window: usize) -> Vec<WeightedTerm> {
    let usable: Vec<(NaiveDate, Decimal)> = history
        .iter()
        .take(window)
        .filter_map(|record| record.effective_temp().map(|t| (record.date, t)))
        .collect();

    let n = usable.len() as u32;
    usable
        .into_iter()
        .enumerate()
        .map(|(i, (date, temp))| WeightedTerm {
            date,
            temp,
            weight: n - i as u32,
        })
        .collect()
}

/// Computes the weighted trend temperature, rounded half-up to one decimal.
///
/// Returns `None` when no record can contribute; the division is never
/// attempted with a zero denominator.
pub fn weighted_temp(history: &[HistoryRecord], window: usize) -> Option<Decimal> {
    let terms = weighted_terms(history, window);
    if terms.is_empty() {
        return None;
    }

    let (sum, total_weight) = terms.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(sum, total), term| {
            let w = Decimal::from(term.weight);
            (sum + term.temp * w, total + w)
        },
    );

    Some(round1(sum / total_weight))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
