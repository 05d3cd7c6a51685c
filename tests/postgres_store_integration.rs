/// Integration tests for the PostgreSQL store
///
/// Tests verify:
/// 1. Schema verification on connect
/// 2. Sample filtering, ordering and limits in SQL
/// 3. History and prior-record queries
/// 4. Upsert creates, overwrites and is idempotent
///
/// Prerequisites:
/// - PostgreSQL with sql/001_position_status.sql applied
/// - DATABASE_URL set in .env
///
/// These tests are ignored by default.
/// Run with: cargo test --test postgres_store_integration -- --ignored --test-threads=1

use chrono::{NaiveDate, TimeZone, Utc};
use postgres::Client;
use rust_decimal::Decimal;
use std::env;

use station_temp_service::db::{self, PostgresStore, REQUIRED_TABLES};
use station_temp_service::model::SummaryRecord;
use station_temp_service::store::TemperatureStore;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const TEST_STATION_ID: &str = "TEST001";
const TEST_STATION: &str = "TEST Station";

fn database_url() -> String {
    dotenv::dotenv().ok();
    env::var("DATABASE_URL").expect("DATABASE_URL must be set")
}

fn setup_client() -> Client {
    db::connect_and_verify(&database_url(), REQUIRED_TABLES).unwrap_or_else(|e| {
        eprintln!("\n{}\n", "=".repeat(80));
        eprintln!("INTEGRATION TEST SETUP ERROR");
        eprintln!("{}", "=".repeat(80));
        eprintln!("\n{}\n", e);
        eprintln!("Apply the schema first:\n");
        eprintln!("  psql \"$DATABASE_URL\" -f sql/001_position_status.sql\n");
        panic!("Database setup validation failed");
    })
}

fn cleanup_test_data(client: &mut Client) {
    let _ = client.execute("DELETE FROM weather_temperature WHERE station_id LIKE 'TEST%'", &[]);
    let _ = client.execute("DELETE FROM position_status WHERE station LIKE 'TEST%'", &[]);
}

fn d(tenths: i64) -> Decimal {
    Decimal::new(tenths, 1)
}

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, n).unwrap()
}

fn record(date: NaiveDate, temp: i64) -> SummaryRecord {
    SummaryRecord {
        station_name: TEST_STATION.to_string(),
        date,
        temp: Some(d(temp)),
        adjusted_temp: Some(d(temp)),
        weight_temp: Some(d(temp - 5)),
        max_temp: Some(d(temp + 30)),
        min_temp: Some(d(temp - 30)),
        pressure: Some(d(10120)),
        city: "Test City".to_string(),
    }
}

fn insert_sample(client: &mut Client, temp: Decimal, hour: u32, date: NaiveDate) {
    let obs_time = Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap());
    client
        .execute(
            "INSERT INTO weather_temperature (station_id, temp, pressure, obs_time)
             VALUES ($1, $2, $3, $4)",
            &[&TEST_STATION_ID, &temp, &d(10120), &obs_time],
        )
        .expect("Failed to insert test sample");
}

fn count_rows(client: &mut Client, date: NaiveDate) -> i64 {
    client
        .query_one(
            "SELECT COUNT(*) FROM position_status WHERE station = $1 AND date = $2",
            &[&TEST_STATION, &date],
        )
        .map(|row| row.get(0))
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// 1. Connection
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_connect_reports_missing_tables() {
    let result = db::connect_and_verify(&database_url(), &["definitely_not_a_table"]);
    let err = result.err().expect("missing table should be reported");
    assert!(
        err.to_string().contains("definitely_not_a_table"),
        "error should name the missing table: {}",
        err
    );
}

// ---------------------------------------------------------------------------
// 2. Samples
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_samples_are_filtered_and_newest_first() {
    let mut client = setup_client();
    cleanup_test_data(&mut client);

    insert_sample(&mut client, d(200), 1, day(15));
    insert_sample(&mut client, d(220), 3, day(15));
    insert_sample(&mut client, d(0), 4, day(15)); // excluded: not > 0
    insert_sample(&mut client, d(650), 5, day(15)); // excluded: not < 60
    insert_sample(&mut client, d(210), 2, day(16)); // excluded: after as_of

    let mut store = PostgresStore::new(client);
    let samples = store.fetch_recent_samples(TEST_STATION_ID, day(15), 24).unwrap();

    let temps: Vec<Decimal> = samples.iter().map(|s| s.temperature).collect();
    assert_eq!(temps, vec![d(220), d(200)]);

    let limited = store.fetch_recent_samples(TEST_STATION_ID, day(15), 1).unwrap();
    assert_eq!(limited.len(), 1);

    let mut client = setup_client();
    cleanup_test_data(&mut client);
}

// ---------------------------------------------------------------------------
// 3. History and prior
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_history_and_prior_queries() {
    let mut client = setup_client();
    cleanup_test_data(&mut client);
    let mut store = PostgresStore::new(client);

    for n in 5..=15 {
        store.upsert_summary(TEST_STATION, day(n), &record(day(n), 150 + n as i64)).unwrap();
    }

    let history = store.fetch_history(TEST_STATION, day(15), 7).unwrap();
    let dates: Vec<NaiveDate> = history.iter().map(|h| h.date).collect();
    assert_eq!(dates, (9..=15).rev().map(day).collect::<Vec<_>>());

    let prior = store.fetch_prior(TEST_STATION, day(15)).unwrap().expect("prior should exist");
    assert_eq!(prior.date, day(14));
    assert_eq!(prior.temp, Some(d(164)));
    assert_eq!(prior.max_temp, Some(d(194)));

    assert!(store.fetch_prior(TEST_STATION, day(5)).unwrap().is_none());

    let mut client = setup_client();
    cleanup_test_data(&mut client);
}

// ---------------------------------------------------------------------------
// 4. Upsert
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn test_upsert_is_idempotent_and_overwrites() {
    let mut client = setup_client();
    cleanup_test_data(&mut client);
    let mut store = PostgresStore::new(client);

    let first = record(day(15), 221);
    store.upsert_summary(TEST_STATION, day(15), &first).unwrap();
    store.upsert_summary(TEST_STATION, day(15), &first).unwrap();

    let mut replacement = record(day(15), 250);
    replacement.pressure = None;
    store.upsert_summary(TEST_STATION, day(15), &replacement).unwrap();

    let prior = store.fetch_prior(TEST_STATION, day(16)).unwrap().unwrap();
    assert_eq!(prior.temp, Some(d(250)));
    assert_eq!(prior.pressure, None);

    let mut client = setup_client();
    assert_eq!(count_rows(&mut client, day(15)), 1, "upsert must not duplicate rows");
    cleanup_test_data(&mut client);
}
