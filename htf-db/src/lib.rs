//! In-memory SQLite store for high tide flooding data.
//!
//! A data directory is loaded once into an in-memory SQLite database; the
//! analysis crates then read typed records back out of it.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper for interior mutability; one store per
//!   request, never shared across threads
//! - In-memory SQLite via `rusqlite`
//! - Tabular data (stations, daily min/max) is stored as rows; JSON payloads
//!   (levels, observed counts, projections) are stored as text and parsed on
//!   the way out
//! - Normalized projection tables are memoized per
//!   (station, scenario, threshold key) for the life of the store
//!
//! # Usage
//!
//! ```rust
//! use htf_db::Database;
//!
//! let db = Database::new().unwrap();
//!
//! db.load_stations("id,name,lat,lon\n8443970,Boston,42.35,-71.05\n").unwrap();
//! db.load_daily("8443970", "time,min,max\n2020-01-01,-1.2,0.4\n2020-01-02,-1.1,0.7\n").unwrap();
//!
//! let registry = db.query_station_registry().unwrap();
//! let record = db.query_daily_record("8443970").unwrap();
//! assert_eq!(registry.len(), 1);
//! assert_eq!(record.observations().len(), 2);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
pub mod models;

use htf_data::projection::ProjectionTables;
use models::ProjectionKey;
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory SQLite database holding one deployment's station data.
///
/// Cheaply cloneable (via `Rc`); clones share the connection and the
/// projection memo.
///
/// # Example
///
/// ```rust
/// use htf_db::Database;
///
/// let db = Database::new().unwrap();
/// db.load_stations("id,name,lat,lon\n8443970,Boston,42.35,-71.05\n").unwrap();
/// let stations = db.query_stations().unwrap();
/// assert_eq!(stations[0].name, "Boston");
/// ```
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
    projections: Rc<RefCell<HashMap<ProjectionKey, Rc<ProjectionTables>>>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    ///
    /// The database is empty after creation; use the `load_*` methods
    /// to populate it.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
            projections: Rc::new(RefCell::new(HashMap::new())),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const STATIONS_CSV: &str = "id,name,lat,lon\n\
        8443970,Boston,42.3539,-71.0503\n\
        8518750,The Battery,40.7006,-74.0142\n";

    pub const DAILY_CSV: &str = "time,min,max\n\
        2020-01-01,-1.20,0.40\n\
        2020-01-02,-1.10,0.75\n\
        2020-01-03,,0.90\n\
        2020-01-05,-1.00,0.20\n";

    pub const LEVELS_JSON: &str = r#"{
        "datums": {"msl": -0.45, "mllw": -1.35, "mhhw": 0.0},
        "flood": {"minor": 0.55, "moderate": 0.86, "major": 1.16},
        "extremes": {"100yr": 1.9, "10yr": 1.5, "2yr": 1.1, "1yr": 0.9},
        "topten": [{"date": "2018-01-04", "height": 1.49}],
        "updated": "2023-06-01"
    }"#;

    pub const OBSERVED_JSON: &str = r#"{
        "annual": {"years": [2019, 2020], "counts": [3, null]},
        "monthly": {"2019": [1,0,0,0,0,0,0,0,0,1,1,0]},
        "climatology": [1,0,0,0,0,0,0,0,0,1,1,0],
        "long_term": null
    }"#;

    pub const PROJECTION_JSON: &str = r#"{
        "yoi": null,
        "annual_percentiles": {
            "years": [2020, 2021],
            "percentiles": {"5": [0, 0], "17": [1, 1], "50": [2, 3], "83": [4, 5], "95": [6, 7]}
        },
        "pentad_mean_month_percentiles": {
            "pentads": [2020],
            "percentiles": {"5": [0], "17": [0], "50": [1], "83": [1], "95": [2]}
        },
        "pentad_max_season_percentiles": {
            "pentads": [2020],
            "percentiles": {"5": [0], "17": [1], "50": [2], "83": [4], "95": [6]}
        },
        "pentad_max_month_percentiles": {
            "pentads": [2020],
            "percentiles": {"5": [0], "17": [2], "50": [3], "83": [6], "95": [8]}
        },
        "annual_probabilities": {
            "years": [2020, 2021],
            "prob_at_least_n": {"10": [0.1, 0.2]},
            "prob_first_year": {"10": [0.1, 0.1]}
        },
        "monthly_probabilities": {
            "years": [2020, 2021],
            "prob_at_least_n": {"5": [0.2, 0.3]},
            "prob_first_year": {"5": [0.2, 0.1]}
        }
    }"#;
}
