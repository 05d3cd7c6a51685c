/// Core data types for the station temperature service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O, only types and the error enums raised at
/// the store boundary.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single hourly observation from a weather station.
///
/// Samples reach the core already filtered to the (0, 60) °C validity range
/// by the store query. Temperatures are recorded to one decimal place
/// (`NUMERIC(4, 1)` in `weather_temperature`); the daily aggregate relies on
/// that to keep its rounded average between the observed extremes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub temperature: Decimal, // °C
    pub pressure: Decimal,    // hPa
    pub observed_at: DateTime<Utc>,
}

/// One day's reduction of raw samples for a station.
///
/// Produced by `analysis::aggregate::aggregate` from a nonempty slice of
/// samples. There is no "empty" aggregate: no samples means no value.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub station_id: String,
    pub date: NaiveDate,
    pub avg_temp: Decimal,
    pub min_temp: Decimal,
    pub max_temp: Decimal,
    pub avg_pressure: Decimal,
    /// Earliest and latest `observed_at` of the samples that were reduced.
    pub observed_from: DateTime<Utc>,
    pub observed_to: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Stored summary types
// ---------------------------------------------------------------------------

/// A previously stored daily summary, as read back for smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub station_name: String,
    pub date: NaiveDate,
    pub temp: Option<Decimal>,
    pub adjusted_temp: Option<Decimal>,
}

impl HistoryRecord {
    /// The value the smoother averages: the adjusted temperature when one
    /// was stored, otherwise the raw daily average.
    pub fn effective_temp(&self) -> Option<Decimal> {
        self.adjusted_temp.or(self.temp)
    }
}

/// The most recent stored summary strictly before the target date.
///
/// This is the correction baseline. `None` at the call site is a cold start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorRecord {
    pub station_name: String,
    pub date: NaiveDate,
    pub temp: Option<Decimal>,
    pub adjusted_temp: Option<Decimal>,
    pub max_temp: Option<Decimal>,
    pub min_temp: Option<Decimal>,
    pub pressure: Option<Decimal>,
}

/// The day's final record, one per (station, date).
///
/// Every numeric field is optional: a station with no samples and no prior
/// record still gets a row, with nothing in it but its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub station_name: String,
    pub date: NaiveDate,
    pub temp: Option<Decimal>,
    pub adjusted_temp: Option<Decimal>,
    pub weight_temp: Option<Decimal>,
    pub max_temp: Option<Decimal>,
    pub min_temp: Option<Decimal>,
    pub pressure: Option<Decimal>,
    pub city: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when reading from or writing to the summary store.
#[derive(Debug, PartialEq)]
pub enum StoreError {
    /// The store could not be reached at all.
    Connection(String),
    /// A query was rejected or failed while executing.
    Query(String),
    /// A row came back in a shape the service does not understand.
    Decode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "Connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "Query error: {}", msg),
            StoreError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(temp: Option<Decimal>, adjusted: Option<Decimal>) -> HistoryRecord {
        HistoryRecord {
            station_name: "Banqiao".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            temp,
            adjusted_temp: adjusted,
        }
    }

    #[test]
    fn test_effective_temp_prefers_adjusted() {
        let record = history(Some(Decimal::new(300, 1)), Some(Decimal::new(240, 1)));
        assert_eq!(record.effective_temp(), Some(Decimal::new(240, 1)));
    }

    #[test]
    fn test_effective_temp_falls_back_to_raw() {
        let record = history(Some(Decimal::new(185, 1)), None);
        assert_eq!(record.effective_temp(), Some(Decimal::new(185, 1)));
    }

    #[test]
    fn test_store_error_display_names_the_fault() {
        let err = StoreError::Query("duplicate key".to_string());
        assert_eq!(err.to_string(), "Query error: duplicate key");
    }
}
