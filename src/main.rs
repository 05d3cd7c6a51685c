//! CLI entry point for the station temperature service.
//!
//! Loads the station list, derives each station's daily summary for the
//! target date and upserts it to PostgreSQL. With `--dry-run` the database
//! is only read from and the summaries are printed as JSON instead.

use std::error::Error;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::Parser;

use station_temp_service::config::{self, DEFAULT_CONFIG_PATH};
use station_temp_service::db::PostgresStore;
use station_temp_service::logging::{self, Component};
use station_temp_service::pipeline::{self, RunSummary};
use station_temp_service::stations::{self, Station};

#[derive(Parser)]
#[command(name = "station_temp")]
#[command(about = "Derive adjusted daily temperatures for weather stations", long_about = None)]
struct Cli {
    /// Date to summarise (YYYY-MM-DD); defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Station list (overrides the config file)
    #[arg(short, long)]
    stations: Option<String>,

    /// Only process the station with this id
    #[arg(long)]
    station: Option<String>,

    /// Read from the database but write nothing; print the records as JSON
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(summary) if summary.all_saved() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            logging::error(Component::System, None, &e.to_string());
            eprintln!("station_temp: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<RunSummary, Box<dyn Error>> {
    dotenv::dotenv().ok(); // Load .env file

    let cli = Cli::parse();
    let service_config = config::load_config(&cli.config)?;

    logging::init_logger(
        service_config.logging.min_level()?,
        service_config.logging.file.as_deref(),
        service_config.logging.timestamps,
    );

    let stations_path = cli
        .stations
        .clone()
        .unwrap_or_else(|| service_config.stations.file.clone());
    let mut station_list = stations::load_stations(&stations_path)?;

    if let Some(id) = &cli.station {
        let only: Station = stations::find_station(&station_list, id)
            .cloned()
            .ok_or_else(|| format!("station {} is not in {}", id, stations_path))?;
        station_list = vec![only];
    }

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    logging::info(
        Component::System,
        None,
        &format!("Starting run for {} with {} stations", date, station_list.len()),
    );

    let url = config::database_url()?;
    let store = PostgresStore::connect(&url)?;

    let summary = if cli.dry_run {
        let (summary, _) = pipeline::dry_run(store, &station_list, date, &service_config.correction);
        println!("{}", pipeline::records_json(&summary)?);
        summary
    } else {
        let mut store = store;
        pipeline::run(&mut store, &station_list, date, &service_config.correction)
    };

    logging::info(Component::System, None, "Run finished");
    Ok(summary)
}
