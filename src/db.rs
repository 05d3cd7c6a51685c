/// PostgreSQL backend for the store port.
///
/// Reads raw samples from `weather_temperature` and daily summaries from
/// `position_status`, and writes the day's summary back to
/// `position_status`. Schema: `sql/001_position_status.sql`.

use chrono::{DateTime, NaiveDate, Utc};
use postgres::{Client, NoTls, Row};
use rust_decimal::Decimal;

use crate::model::{HistoryRecord, PriorRecord, RawSample, StoreError, SummaryRecord};
use crate::store::TemperatureStore;

/// Tables the service reads from and writes to.
pub const REQUIRED_TABLES: &[&str] = &["weather_temperature", "position_status"];

pub struct PostgresStore {
    client: Client,
}

/// Connects to `database_url` and checks that every table in `tables` exists.
///
/// Returns a readable error describing what is missing, so a misconfigured
/// deployment fails before any station is processed.
pub fn connect_and_verify(database_url: &str, tables: &[&str]) -> Result<Client, StoreError> {
    let mut client = Client::connect(database_url, NoTls)
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    let mut missing = Vec::new();
    for table in tables {
        let row = client.query_one(
            "SELECT EXISTS (
                 SELECT 1 FROM information_schema.tables
                 WHERE table_name = $1
             )",
            &[table],
        )?;
        let exists: bool = row.get(0);
        if !exists {
            missing.push(*table);
        }
    }

    if !missing.is_empty() {
        return Err(StoreError::Connection(format!(
            "missing tables: {} (apply sql/001_position_status.sql)",
            missing.join(", ")
        )));
    }

    Ok(client)
}

impl PostgresStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects and verifies the schema in one step.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        connect_and_verify(database_url, REQUIRED_TABLES).map(Self::new)
    }
}

impl From<postgres::Error> for StoreError {
    fn from(err: postgres::Error) -> Self {
        if err.is_closed() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Query(err.to_string())
        }
    }
}

fn decode<T>(row: &Row, idx: usize, column: &str) -> Result<T, StoreError>
where
    T: for<'a> postgres::types::FromSql<'a>,
{
    row.try_get(idx)
        .map_err(|e| StoreError::Decode(format!("{}: {}", column, e)))
}

impl TemperatureStore for PostgresStore {
    fn fetch_recent_samples(
        &mut self,
        station_id: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RawSample>, StoreError> {
        let rows = self.client.query(
            "SELECT temp, pressure, obs_time
             FROM weather_temperature
             WHERE station_id = $1
               AND temp > 0 AND temp < 60
               AND obs_time::date <= $2
             ORDER BY obs_time DESC
             LIMIT $3",
            &[&station_id, &as_of, &(limit as i64)],
        )?;

        let mut samples = Vec::with_capacity(rows.len());
        for row in &rows {
            samples.push(RawSample {
                temperature: decode::<Decimal>(row, 0, "temp")?,
                pressure: decode::<Decimal>(row, 1, "pressure")?,
                observed_at: decode::<DateTime<Utc>>(row, 2, "obs_time")?,
            });
        }
        Ok(samples)
    }

    fn fetch_history(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        let rows = self.client.query(
            "SELECT station, date, temp, adjusted_temp
             FROM position_status
             WHERE station = $1 AND date <= $2
             ORDER BY date DESC
             LIMIT $3",
            &[&station_name, &as_of, &(limit as i64)],
        )?;

        rows.iter()
            .map(|row| {
                Ok(HistoryRecord {
                    station_name: decode(row, 0, "station")?,
                    date: decode(row, 1, "date")?,
                    temp: decode(row, 2, "temp")?,
                    adjusted_temp: decode(row, 3, "adjusted_temp")?,
                })
            })
            .collect()
    }

    fn fetch_prior(
        &mut self,
        station_name: &str,
        as_of: NaiveDate,
    ) -> Result<Option<PriorRecord>, StoreError> {
        let row = self.client.query_opt(
            "SELECT station, date, temp, adjusted_temp, max_temp, min_temp, pressure
             FROM position_status
             WHERE station = $1 AND date < $2
             ORDER BY date DESC
             LIMIT 1",
            &[&station_name, &as_of],
        )?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(PriorRecord {
            station_name: decode(&row, 0, "station")?,
            date: decode(&row, 1, "date")?,
            temp: decode(&row, 2, "temp")?,
            adjusted_temp: decode(&row, 3, "adjusted_temp")?,
            max_temp: decode(&row, 4, "max_temp")?,
            min_temp: decode(&row, 5, "min_temp")?,
            pressure: decode(&row, 6, "pressure")?,
        }))
    }

    fn upsert_summary(
        &mut self,
        station_name: &str,
        date: NaiveDate,
        record: &SummaryRecord,
    ) -> Result<(), StoreError> {
        // Dropping the transaction without commit rolls it back.
        let mut tx = self.client.transaction()?;

        let existing = tx.query_opt(
            "SELECT id FROM position_status WHERE station = $1 AND date = $2",
            &[&station_name, &date],
        )?;

        if existing.is_some() {
            tx.execute(
                "UPDATE position_status
                 SET temp = $1, adjusted_temp = $2, weight_temp = $3,
                     max_temp = $4, min_temp = $5, pressure = $6, city = $7
                 WHERE station = $8 AND date = $9",
                &[
                    &record.temp,
                    &record.adjusted_temp,
                    &record.weight_temp,
                    &record.max_temp,
                    &record.min_temp,
                    &record.pressure,
                    &record.city,
                    &station_name,
                    &date,
                ],
            )?;
        } else {
            tx.execute(
                "INSERT INTO position_status
                     (station, temp, adjusted_temp, weight_temp, max_temp, min_temp,
                      pressure, city, date)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &station_name,
                    &record.temp,
                    &record.adjusted_temp,
                    &record.weight_temp,
                    &record.max_temp,
                    &record.min_temp,
                    &record.pressure,
                    &record.city,
                    &date,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_url_is_a_connection_error() {
        let result = connect_and_verify("not a postgres url", REQUIRED_TABLES);
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }
}
