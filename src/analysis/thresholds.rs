//! Tunable constants for the derivation pipeline.
//!
//! The defaults are the values the service has always run with. They can be
//! overridden from the `[correction]` table of the config file.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Maximum day-over-day jump (°C) accepted without smoothing.
pub const DEFAULT_DIVERGENCE_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 1);

/// Number of stored daily records the weighted average looks back over.
pub const DEFAULT_HISTORY_WINDOW: usize = 7;

/// Number of hourly samples reduced into one daily aggregate.
pub const DEFAULT_SAMPLE_LIMIT: usize = 24;

/// Lower bound (inclusive) of a plausible daily average, °C.
pub const DEFAULT_VALID_MIN: Decimal = Decimal::ZERO;

/// Upper bound (exclusive) of a plausible daily average, °C.
pub const DEFAULT_VALID_MAX: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Thresholds for smoothing and anomaly correction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    pub divergence_threshold: Decimal,
    pub history_window: usize,
    pub sample_limit: usize,
    pub valid_min: Decimal,
    pub valid_max: Decimal,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            divergence_threshold: DEFAULT_DIVERGENCE_THRESHOLD,
            history_window: DEFAULT_HISTORY_WINDOW,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            valid_min: DEFAULT_VALID_MIN,
            valid_max: DEFAULT_VALID_MAX,
        }
    }
}

impl CorrectionConfig {
    /// Returns `true` if `avg` lies in `[valid_min, valid_max)`.
    pub fn is_plausible(&self, avg: Decimal) -> bool {
        avg >= self.valid_min && avg < self.valid_max
    }

    /// Checks that the configured values can drive the pipeline.
    pub fn validate(&self) -> Result<(), String> {
        if self.history_window == 0 {
            return Err("history_window must be at least 1".to_string());
        }
        if self.sample_limit == 0 {
            return Err("sample_limit must be at least 1".to_string());
        }
        if self.divergence_threshold.is_sign_negative() {
            return Err(format!(
                "divergence_threshold must not be negative, got {}",
                self.divergence_threshold
            ));
        }
        if self.valid_min >= self.valid_max {
            return Err(format!(
                "valid range is empty: [{}, {})",
                self.valid_min, self.valid_max
            ));
        }
        Ok(())
    }
}
