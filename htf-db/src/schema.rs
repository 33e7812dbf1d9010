//! SQL schema definitions for the in-memory SQLite store.
//!
//! The schema is applied as a single batch when the database is initialized.

/// Returns the full SQL schema as a single batch string.
///
/// - `stations` - tide gauge registry (id, name, lat/lon)
/// - `daily_levels` - daily min/max water level per station, meters above MHHW;
///   a NULL bound marks a partial day
/// - `level_payloads` - raw level JSON per station
/// - `observed_payloads` - precomputed observed counts per (station, threshold key)
/// - `projection_payloads` - ensemble projection JSON per (station, scenario, threshold key)
///
/// Payload tables keep the JSON text as delivered; it is parsed into typed
/// records on the way out.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS stations (
        station_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        lat REAL NOT NULL,
        lon REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS daily_levels (
        station_id TEXT NOT NULL,
        date TEXT NOT NULL,
        min_level REAL,
        max_level REAL,
        PRIMARY KEY (station_id, date)
    );
    CREATE INDEX IF NOT EXISTS idx_daily_station ON daily_levels(station_id);
    CREATE INDEX IF NOT EXISTS idx_daily_date ON daily_levels(date);

    CREATE TABLE IF NOT EXISTS level_payloads (
        station_id TEXT PRIMARY KEY,
        payload TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS observed_payloads (
        station_id TEXT NOT NULL,
        threshold_key TEXT NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (station_id, threshold_key)
    );
    CREATE INDEX IF NOT EXISTS idx_observed_station ON observed_payloads(station_id);

    CREATE TABLE IF NOT EXISTS projection_payloads (
        station_id TEXT NOT NULL,
        scenario TEXT NOT NULL,
        threshold_key TEXT NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (station_id, scenario, threshold_key)
    );
    CREATE INDEX IF NOT EXISTS idx_projection_station ON projection_payloads(station_id);
    "#
}
