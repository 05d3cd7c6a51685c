//! Per-station run of the temperature derivation.
//!
//! For each station: fetch today's samples, the stored history and the prior
//! record through the store port; aggregate, smooth, correct; build the
//! summary; upsert it. A station that cannot be saved is reported and the
//! run moves on to the next one.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::analysis::aggregate::aggregate;
use crate::analysis::correction::{correct, CorrectionRule};
use crate::analysis::smoothing::weighted_temp;
use crate::analysis::thresholds::CorrectionConfig;
use crate::logging::{self, Component};
use crate::model::SummaryRecord;
use crate::stations::Station;
use crate::store::{DryRunStore, TemperatureStore};
use crate::summary;

/// What happened to one station in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct StationOutcome {
    pub station_name: String,
    pub record: SummaryRecord,
    pub rule: CorrectionRule,
    pub saved: bool,
}

/// Totals for a run over the station list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub saved: usize,
    pub failed: usize,
    pub outcomes: Vec<StationOutcome>,
}

impl RunSummary {
    pub fn all_saved(&self) -> bool {
        self.failed == 0
    }
}

fn show(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
}

/// Computes the summary for `station` on `date` without writing it.
///
/// Read faults are logged and treated as absent data, so a station whose
/// history cannot be read still gets a record from whatever was available.
pub fn derive_summary<S: TemperatureStore + ?Sized>(
    store: &mut S,
    station: &Station,
    date: NaiveDate,
    config: &CorrectionConfig,
) -> (SummaryRecord, CorrectionRule) {
    let name = station.name.as_str();

    let samples = store
        .fetch_recent_samples(&station.station_id, date, config.sample_limit)
        .unwrap_or_else(|e| {
            logging::log_store_failure(name, "fetch_recent_samples", &e);
            Vec::new()
        });
    let history = store
        .fetch_history(name, date, config.history_window)
        .unwrap_or_else(|e| {
            logging::log_store_failure(name, "fetch_history", &e);
            Vec::new()
        });
    let prior = store.fetch_prior(name, date).unwrap_or_else(|e| {
        logging::log_store_failure(name, "fetch_prior", &e);
        None
    });

    let today = aggregate(&station.station_id, date, &samples);
    match &today {
        Some(agg) => logging::info(
            Component::Aggregator,
            Some(name),
            &format!(
                "{} samples, observed {} ~ {}",
                samples.len(),
                agg.observed_from.format("%Y-%m-%d %H:%M"),
                agg.observed_to.format("%Y-%m-%d %H:%M")
            ),
        ),
        None => logging::debug(Component::Aggregator, Some(name), "no samples for this date"),
    }

    let weight = weighted_temp(&history, config.history_window);
    if weight.is_none() {
        logging::debug(Component::Smoother, Some(name), "no stored history to weight");
    }

    logging::debug(Component::Corrector, Some(name), &format!("prior record: {:?}", prior));
    let corrected = correct(today.as_ref(), prior.as_ref(), config);
    log_rule(name, &corrected.rule, prior.as_ref().and_then(|p| p.temp), corrected.adjusted_temp);

    let record = summary::build(station, date, &corrected, weight);
    (record, corrected.rule)
}

fn log_rule(name: &str, rule: &CorrectionRule, prior_temp: Option<Decimal>, adjusted: Option<Decimal>) {
    let message = match rule {
        CorrectionRule::ColdStart => "no prior record, using today's average".to_string(),
        CorrectionRule::CarriedForward => "no samples today, carrying prior record forward".to_string(),
        CorrectionRule::OutOfRange { avg } => format!(
            "implausible average ({}), using prior temperature ({})",
            avg,
            show(prior_temp)
        ),
        CorrectionRule::Blended { delta } => format!(
            "divergence {} > threshold, adjusted to {} (prior {})",
            delta,
            show(adjusted),
            show(prior_temp)
        ),
        CorrectionRule::Accepted => return,
    };

    if rule.is_degraded() {
        logging::warn(Component::Corrector, Some(name), &message);
    } else {
        logging::info(Component::Corrector, Some(name), &message);
    }
}

fn log_result(record: &SummaryRecord) {
    let name = Some(record.station_name.as_str());
    logging::info(Component::System, name, &format!("avg temp:      {}", show(record.temp)));
    logging::info(Component::System, name, &format!("min temp:      {}", show(record.min_temp)));
    logging::info(Component::System, name, &format!("max temp:      {}", show(record.max_temp)));
    logging::info(Component::System, name, &format!("weight temp:   {}", show(record.weight_temp)));
    logging::info(Component::System, name, &format!("adjusted temp: {}", show(record.adjusted_temp)));
    logging::info(Component::System, name, &format!("pressure:      {}", show(record.pressure)));
    logging::info(Component::System, name, &format!("city:          {}", record.city));
}

/// Writes `record`, reporting rather than propagating a failure.
///
/// Returns `false` on any storage fault. No retry is attempted.
pub fn save_summary<S: TemperatureStore + ?Sized>(store: &mut S, record: &SummaryRecord) -> bool {
    match store.upsert_summary(&record.station_name, record.date, record) {
        Ok(()) => {
            logging::debug(
                Component::Database,
                Some(&record.station_name),
                &format!("saved position_status {} - {}", record.station_name, record.date),
            );
            true
        }
        Err(e) => {
            logging::log_store_failure(&record.station_name, "upsert_summary", &e);
            false
        }
    }
}

/// Derives and saves the summary for one station.
pub fn process_station<S: TemperatureStore + ?Sized>(
    store: &mut S,
    station: &Station,
    date: NaiveDate,
    config: &CorrectionConfig,
) -> StationOutcome {
    let (record, rule) = derive_summary(store, station, date, config);
    log_result(&record);

    let saved = save_summary(store, &record);
    if !saved {
        logging::error(
            Component::System,
            Some(&station.name),
            &format!("could not save summary for {}", station.name),
        );
    }

    StationOutcome {
        station_name: station.name.clone(),
        record,
        rule,
        saved,
    }
}

/// Processes every station in order. One station's failure never stops
/// the others.
pub fn run<S: TemperatureStore + ?Sized>(
    store: &mut S,
    stations: &[Station],
    date: NaiveDate,
    config: &CorrectionConfig,
) -> RunSummary {
    logging::info(
        Component::System,
        None,
        &format!("Processing {} stations for {}", stations.len(), date),
    );

    let mut summary = RunSummary {
        total: stations.len(),
        ..RunSummary::default()
    };

    for station in stations {
        logging::info(Component::System, None, &"=".repeat(50));
        logging::info(
            Component::System,
            None,
            &format!("Station: {} (ID: {})", station.name, station.station_id),
        );

        let outcome = process_station(store, station, date, config);
        if outcome.saved {
            summary.saved += 1;
        } else {
            summary.failed += 1;
        }
        summary.outcomes.push(outcome);
    }

    logging::log_run_summary(summary.total, summary.saved, summary.failed);
    summary
}

/// Runs every station against `store` without writing to it.
///
/// Reads go to `store`; upserts land in a `DryRunStore`'s memory and are
/// dropped afterwards. The untouched store is handed back.
pub fn dry_run<S: TemperatureStore>(
    store: S,
    stations: &[Station],
    date: NaiveDate,
    config: &CorrectionConfig,
) -> (RunSummary, S) {
    let mut preview = DryRunStore::new(store);
    let summary = run(&mut preview, stations, date, config);
    (summary, preview.into_inner())
}

/// The records of a run as a pretty-printed JSON array.
pub fn records_json(summary: &RunSummary) -> serde_json::Result<String> {
    let records: Vec<&SummaryRecord> = summary.outcomes.iter().map(|o| &o.record).collect();
    serde_json::to_string_pretty(&records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
