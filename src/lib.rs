//! Daily temperature summaries for weather stations.
//!
//! Reduces hourly observations to a daily aggregate, smooths it against the
//! stored history, corrects day-over-day anomalies and upserts the result.

pub mod analysis;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod stations;
pub mod store;
pub mod summary;
