//! Store port - abstraction for reading samples and history and writing
//! daily summaries.
//!
//! The pipeline never opens or closes connections. It is handed something
//! that implements `TemperatureStore` and calls through it. `db::PostgresStore`
//! is the production backend; `MemoryStore` backs tests, and `DryRunStore`
//! wraps either one so a run can be previewed without writing.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analysis::thresholds::{DEFAULT_VALID_MAX, DEFAULT_VALID_MIN};
use crate::model::{HistoryRecord, PriorRecord, RawSample, StoreError, SummaryRecord};

/// Read/write contract between the pipeline and the summary store.
pub trait TemperatureStore {
    /// Up to `limit` hourly samples for `station_id`, observed on or before
    /// `as_of`, temperature in (0, 60), newest first. No data is an empty
    /// vector, not an error.
    fn fetch_recent_samples(
        &mut self,
        station_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RawSample>, StoreError>;

    /// Up to `limit` stored summaries for `station_name` dated on or before
    /// `as_of`, newest first.
    fn fetch_history(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, StoreError>;

    /// The most recent stored summary dated strictly before `as_of`.
    fn fetch_prior(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
    ) -> Result<Option<PriorRecord>, StoreError>;

    /// Creates the (station, date) summary or overwrites every field of the
    /// existing one. Storing the same record twice leaves the same state as
    /// storing it once.
    fn upsert_summary(
        &mut self,
        station_name: &str,
        date: NaiveDate,
        record: &SummaryRecord,
    ) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A `TemperatureStore` held entirely in memory.
///
/// Samples are keyed by station id, summaries by (station name, date), the
/// same keys the database uses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    samples: BTreeMap<String, Vec<RawSample>>,
    summaries: BTreeMap<(String, NaiveDate), SummaryRecord>,
    fail_writes_for: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw sample for `station_id`. Samples outside the (0, 60)
    /// filter are stored but never returned, as with the database query.
    pub fn add_sample(&mut self, station_id: &str, sample: RawSample) {
        self.samples
            .entry(station_id.to_string())
            .or_default()
            .push(sample);
    }

    /// Seeds a previously stored summary.
    pub fn insert_summary(&mut self, record: SummaryRecord) {
        self.summaries
            .insert((record.station_name.clone(), record.date), record);
    }

    /// Makes every subsequent `upsert_summary` for `station_name` fail.
    pub fn fail_writes_for(&mut self, station_name: &str) {
        self.fail_writes_for.push(station_name.to_string());
    }

    pub fn summary(&self, station_name: &str, date: NaiveDate) -> Option<&SummaryRecord> {
        self.summaries.get(&(station_name.to_string(), date))
    }

    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }

    /// Stored summaries for `station_name`, newest first.
    fn summaries_for<'a>(&'a self, station_name: &'a str) -> impl Iterator<Item = &'a SummaryRecord> + 'a {
        self.summaries
            .iter()
            .rev()
            .filter(move |((name, _), _)| name == station_name)
            .map(|(_, record)| record)
    }
}

impl TemperatureStore for MemoryStore {
    fn fetch_recent_samples(
        &mut self,
        station_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RawSample>, StoreError> {
        let Some(all) = self.samples.get(station_id) else {
            return Ok(Vec::new());
        };
        let mut matching: Vec<RawSample> = all
            .iter()
            .filter(|s| s.temperature > DEFAULT_VALID_MIN && s.temperature < DEFAULT_VALID_MAX)
            .filter(|s| s.observed_at.date_naive() <= as_of)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
        matching.truncate(limit);
        Ok(matching)
    }

    fn fetch_history(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        Ok(self
            .summaries_for(station_name)
            .filter(|r| r.date <= as_of)
            .take(limit)
            .map(|r| HistoryRecord {
                station_name: r.station_name.clone(),
                date: r.date,
                temp: r.temp,
                adjusted_temp: r.adjusted_temp,
            })
            .collect())
    }

    fn fetch_prior(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
    ) -> Result<Option<PriorRecord>, StoreError> {
        Ok(self
            .summaries_for(station_name)
            .find(|r| r.date < as_of)
            .map(|r| PriorRecord {
                station_name: r.station_name.clone(),
                date: r.date,
                temp: r.temp,
                adjusted_temp: r.adjusted_temp,
                max_temp: r.max_temp,
                min_temp: r.min_temp,
                pressure: r.pressure,
            }))
    }

    fn upsert_summary(
        &mut self,
        station_name: &str,
        date: NaiveDate,
        record: &SummaryRecord,
    ) -> Result<(), StoreError> {
        if self.fail_writes_for.iter().any(|s| s == station_name) {
            return Err(StoreError::Query(format!(
                "write rejected for station {}",
                station_name
            )));
        }
        let mut stored = record.clone();
        stored.station_name = station_name.to_string();
        stored.date = date;
        self.summaries.insert((station_name.to_string(), date), stored);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dry-run wrapper
// ---------------------------------------------------------------------------

/// Reads through to `inner`, keeps writes in memory.
///
/// Used by `--dry-run`: the run sees the real samples and history but the
/// backing store is never modified.
pub struct DryRunStore<S> {
    inner: S,
    writes: MemoryStore,
}

impl<S: TemperatureStore> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: MemoryStore::new(),
        }
    }

    /// Summaries that would have been written.
    pub fn pending(&self) -> &MemoryStore {
        &self.writes
    }

    /// Gives back the wrapped store, discarding the pending writes.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: TemperatureStore> TemperatureStore for DryRunStore<S> {
    fn fetch_recent_samples(
        &mut self,
        station_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RawSample>, StoreError> {
        self.inner.fetch_recent_samples(station_id, as_of, limit)
    }

    fn fetch_history(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        self.inner.fetch_history(station_name, as_of, limit)
    }

    fn fetch_prior(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
    ) -> Result<Option<PriorRecord>, StoreError> {
        self.inner.fetch_prior(station_name, as_of)
    }

    fn upsert_summary(
        &mut self,
        station_name: &str,
        date: NaiveDate,
        record: &SummaryRecord,
    ) -> Result<(), StoreError> {
        self.writes.upsert_summary(station_name, date, record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
