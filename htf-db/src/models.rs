//! Row structs returned by the store's query methods.
//!
//! All structs derive `Serialize` so the command layer can print them as JSON.

use htf_core::scenario::Scenario;
use htf_core::threshold::HeightKey;
use serde::Serialize;

/// One stored day of a station's min/max record, dates as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyRow {
    pub date: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Identifies one ensemble projection payload. Also the memo key for
/// normalized projection tables.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectionKey {
    pub station_id: String,
    pub scenario: Scenario,
    pub threshold_key: HeightKey,
}

impl ProjectionKey {
    pub fn new(station_id: &str, scenario: Scenario, threshold_key: HeightKey) -> Self {
        Self {
            station_id: station_id.to_string(),
            scenario,
            threshold_key,
        }
    }
}

/// Row counts per table, for a quick look at what a data directory loaded.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StoreSummary {
    pub stations: i64,
    pub daily_rows: i64,
    pub level_payloads: i64,
    pub observed_payloads: i64,
    pub projection_payloads: i64,
}
