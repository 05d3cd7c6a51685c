/// Station list for the temperature service.
///
/// The stations to process on each run are kept in a JSON file maintained
/// alongside the deployment:
///
/// ```json
/// [
///   { "StationId": "466880", "StationName": "Banqiao", "City": "New Taipei" }
/// ]
/// ```
///
/// This is the single source of station identity: the id keys the raw
/// samples, the name keys the stored summaries, and the city is copied
/// onto every summary.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Station metadata
// ---------------------------------------------------------------------------

/// A single weather station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Observation network id, keys the raw hourly samples.
    #[serde(rename = "StationId")]
    pub station_id: String,
    /// Display name, keys the stored daily summaries.
    #[serde(rename = "StationName")]
    pub name: String,
    /// City or county the station belongs to.
    #[serde(rename = "City", default)]
    pub city: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StationListError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Empty,
}

impl fmt::Display for StationListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationListError::Io(e) => write!(f, "Failed to read station list: {}", e),
            StationListError::Parse(e) => write!(f, "Failed to parse station list: {}", e),
            StationListError::Empty => write!(f, "Station list is empty"),
        }
    }
}

impl std::error::Error for StationListError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses a station list from JSON text.
pub fn parse_stations(text: &str) -> Result<Vec<Station>, StationListError> {
    let stations: Vec<Station> = serde_json::from_str(text).map_err(StationListError::Parse)?;
    if stations.is_empty() {
        return Err(StationListError::Empty);
    }
    Ok(stations)
}

/// Loads the station list from `path`.
pub fn load_stations<P: AsRef<Path>>(path: P) -> Result<Vec<Station>, StationListError> {
    let text = std::fs::read_to_string(path).map_err(StationListError::Io)?;
    parse_stations(&text)
}

/// Looks up a station by id. Returns `None` if not found.
pub fn find_station<'a>(stations: &'a [Station], station_id: &str) -> Option<&'a Station> {
    stations.iter().find(|s| s.station_id == station_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
