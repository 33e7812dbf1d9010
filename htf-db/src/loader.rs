//! Loading functions for populating the in-memory SQLite store.
//!
//! Each loader parses its input from a string slice, validates it with the
//! typed parsers in `htf-core`/`htf-data` and inserts rows into the
//! corresponding table. Re-loading the same key replaces the earlier row.
//!
//! # Formats
//!
//! - **Stations** (CSV with headers): `id,name,lat,lon`, or JSON (list of
//!   records or an object keyed by id)
//! - **Daily min/max** (CSV with headers): date in the first column, `min` and
//!   `max` columns by name, meters above MHHW
//! - **Levels**, **observed counts**, **projections**: JSON text, stored as is

use crate::Database;
use htf_core::daily::DailyRecord;
use htf_core::levels::LevelPayload;
use htf_core::scenario::Scenario;
use htf_core::station::Station;
use htf_core::threshold::HeightKey;
use htf_data::observed::ObservedPayload;
use htf_data::projection::ProjectionTables;
use htf_utils::dates::format_date;
use rusqlite::params;
use std::rc::Rc;

impl Database {
    /// Load the station registry from CSV.
    ///
    /// # Example CSV
    /// ```text
    /// id,name,lat,lon
    /// 8443970,Boston,42.3539,-71.0503
    /// ```
    pub fn load_stations(&self, csv_data: &str) -> anyhow::Result<()> {
        let stations = Station::parse_station_csv(csv_data)?;
        self.insert_stations(&stations)
    }

    /// Load the station registry from JSON.
    pub fn load_stations_json(&self, json: &str) -> anyhow::Result<()> {
        let stations = Station::parse_station_json(json)?;
        self.insert_stations(&stations)
    }

    fn insert_stations(&self, stations: &[Station]) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        for station in stations {
            conn.execute(
                "INSERT OR REPLACE INTO stations (station_id, name, lat, lon)
                 VALUES (?1, ?2, ?3, ?4)",
                params![station.id, station.name, station.lat, station.lon],
            )?;
        }
        log::info!("[HTF] loader: Loaded {} stations", stations.len());
        Ok(())
    }

    /// Load one station's daily min/max record from CSV.
    ///
    /// Missing or non-numeric bounds are stored as NULL. Days absent from the
    /// CSV stay absent; gaps are never filled.
    ///
    /// # Example CSV
    /// ```text
    /// time,min,max
    /// 2020-01-01,-1.20,0.40
    /// 2020-01-02,,0.75
    /// ```
    pub fn load_daily(&self, station_id: &str, csv_data: &str) -> anyhow::Result<()> {
        let record = DailyRecord::parse_csv(csv_data)?;
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO daily_levels (station_id, date, min_level, max_level)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for obs in record.observations() {
                stmt.execute(params![station_id, format_date(&obs.date), obs.min, obs.max])?;
            }
        }
        tx.commit()?;
        log::info!(
            "[HTF] loader: Loaded {} daily rows for {}",
            record.observations().len(),
            station_id
        );
        Ok(())
    }

    /// Store a station's level payload after checking that it parses.
    pub fn load_levels(&self, station_id: &str, json: &str) -> anyhow::Result<()> {
        LevelPayload::parse(json)
            .map_err(|e| anyhow::anyhow!("levels for {}: {}", station_id, e))?;
        self.conn.borrow().execute(
            "INSERT OR REPLACE INTO level_payloads (station_id, payload) VALUES (?1, ?2)",
            params![station_id, json],
        )?;
        log::info!("[HTF] loader: Loaded levels for {}", station_id);
        Ok(())
    }

    /// Store a precomputed observed flood-count payload for one threshold key.
    pub fn load_observed(
        &self,
        station_id: &str,
        threshold_key: &HeightKey,
        json: &str,
    ) -> anyhow::Result<()> {
        ObservedPayload::parse(json).map_err(|e| {
            anyhow::anyhow!("observed counts for {}/{}: {}", station_id, threshold_key, e)
        })?;
        self.conn.borrow().execute(
            "INSERT OR REPLACE INTO observed_payloads (station_id, threshold_key, payload)
             VALUES (?1, ?2, ?3)",
            params![station_id, threshold_key.to_string(), json],
        )?;
        log::info!(
            "[HTF] loader: Loaded observed counts for {} at {}",
            station_id,
            threshold_key
        );
        Ok(())
    }

    /// Store an ensemble projection payload.
    ///
    /// The payload is normalized once here; the result seeds the projection
    /// memo so the first query does not parse it again.
    pub fn load_projection(
        &self,
        station_id: &str,
        scenario: Scenario,
        threshold_key: &HeightKey,
        json: &str,
    ) -> anyhow::Result<()> {
        let tables = ProjectionTables::from_json(json).map_err(|e| {
            anyhow::anyhow!(
                "projection for {}/{}/{}: {}",
                station_id,
                scenario,
                threshold_key,
                e
            )
        })?;
        self.conn.borrow().execute(
            "INSERT OR REPLACE INTO projection_payloads (station_id, scenario, threshold_key, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![station_id, scenario.as_str(), threshold_key.to_string(), json],
        )?;
        self.projections.borrow_mut().insert(
            crate::models::ProjectionKey::new(station_id, scenario, *threshold_key),
            Rc::new(tables),
        );
        log::info!(
            "[HTF] loader: Loaded {} projection for {} at {}",
            scenario,
            station_id,
            threshold_key
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use crate::Database;
    use htf_core::scenario::Scenario;
    use htf_core::threshold::HeightKey;

    #[test]
    fn load_stations_csv() {
        let db = Database::new().unwrap();
        db.load_stations(STATIONS_CSV).unwrap();
        assert_eq!(db.query_summary().unwrap().stations, 2);
    }

    #[test]
    fn load_stations_json_by_id() {
        let db = Database::new().unwrap();
        db.load_stations_json(r#"{"8443970": {"name": "Boston", "lat": 42.35, "lon": -71.05}}"#)
            .unwrap();
        let stations = db.query_stations().unwrap();
        assert_eq!(stations[0].id, "8443970");
    }

    #[test]
    fn load_stations_replaces_duplicates() {
        let db = Database::new().unwrap();
        db.load_stations(STATIONS_CSV).unwrap();
        db.load_stations("id,name,lat,lon\n8443970,Boston Harbor,42.35,-71.05\n")
            .unwrap();
        let stations = db.query_stations().unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "Boston Harbor");
    }

    #[test]
    fn load_daily_keeps_partial_days() {
        let db = Database::new().unwrap();
        db.load_daily("8443970", DAILY_CSV).unwrap();
        assert_eq!(db.query_summary().unwrap().daily_rows, 4);
    }

    #[test]
    fn load_daily_rejects_missing_columns() {
        let db = Database::new().unwrap();
        assert!(db.load_daily("8443970", "date,low,high\n2020-01-01,0,1\n").is_err());
    }

    #[test]
    fn load_levels_rejects_bad_json() {
        let db = Database::new().unwrap();
        assert!(db.load_levels("8443970", "{\"datums\": 3}").is_err());
        db.load_levels("8443970", LEVELS_JSON).unwrap();
        assert_eq!(db.query_summary().unwrap().level_payloads, 1);
    }

    #[test]
    fn load_observed_and_projection() {
        let db = Database::new().unwrap();
        let key = HeightKey::from_centimeters(55);
        db.load_observed("8443970", &key, OBSERVED_JSON).unwrap();
        db.load_projection("8443970", Scenario::Int, &key, PROJECTION_JSON)
            .unwrap();
        let summary = db.query_summary().unwrap();
        assert_eq!(summary.observed_payloads, 1);
        assert_eq!(summary.projection_payloads, 1);
    }

    #[test]
    fn load_projection_rejects_missing_tables() {
        let db = Database::new().unwrap();
        let key = HeightKey::from_centimeters(55);
        assert!(db
            .load_projection("8443970", Scenario::Int, &key, "{\"yoi\": null}")
            .is_err());
        assert_eq!(db.query_summary().unwrap().projection_payloads, 0);
    }
}
