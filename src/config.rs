/// Service configuration.
///
/// Tunables live in a TOML file (`station_temp.toml` by default). Secrets
/// such as the database URL come from the environment, loaded from `.env`
/// by the binary before anything here is called.

use std::env;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::analysis::thresholds::CorrectionConfig;
use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "station_temp.toml";
pub const DEFAULT_STATIONS_PATH: &str = "data/stations.json";

// ---------------------------------------------------------------------------
// Configuration file structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub correction: CorrectionConfig,
    pub logging: LoggingConfig,
    pub stations: StationsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of "debug", "info", "warn", "error".
    pub level: String,
    /// Append-only log file; console only when unset.
    pub file: Option<String>,
    /// Full timestamped lines on the console instead of the compact form.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, ConfigError> {
        match self.level.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::Invalid(format!("unknown log level '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StationsConfig {
    /// JSON station list.
    pub file: String,
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_STATIONS_PATH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
    MissingDatabaseUrl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL must be set (in the environment or .env)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration from TOML text and validates the thresholds.
pub fn parse_config(text: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(text).map_err(ConfigError::Parse)?;
    config.correction.validate().map_err(ConfigError::Invalid)?;
    config.logging.min_level()?;
    Ok(config)
}

/// Loads configuration from `path`.
///
/// A missing file is not an error: the service runs on defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ServiceConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&text)
}

/// Reads `DATABASE_URL` from the environment.
pub fn database_url() -> Result<String, ConfigError> {
    env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
