//! Typed query methods for reading station data back out of the store.
//!
//! Absent payloads come back as `None`; only an unknown station is an error.
//! Dates are stored as `YYYY-MM-DD` text, so date-range filters compare
//! lexically.

use crate::models::{DailyRow, ProjectionKey, StoreSummary};
use crate::Database;
use htf_core::daily::{DailyObservation, DailyRecord};
use htf_core::error::HtfError;
use htf_core::levels::LevelPayload;
use htf_core::scenario::Scenario;
use htf_core::station::{Station, StationRegistry};
use htf_core::threshold::HeightKey;
use htf_data::observed::ObservedPayload;
use htf_data::projection::ProjectionTables;
use htf_utils::dates::parse_date;
use rusqlite::{params, OptionalExtension};
use std::rc::Rc;

impl Database {
    // ───────────────────── Stations ─────────────────────

    /// All stations, ordered by id.
    pub fn query_stations(&self) -> anyhow::Result<Vec<Station>> {
        let conn = self.conn.borrow();
        let mut stmt =
            conn.prepare("SELECT station_id, name, lat, lon FROM stations ORDER BY station_id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Station {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    lat: row.get(2)?,
                    lon: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[HTF] query: query_stations returned {} records", rows.len());
        Ok(rows)
    }

    pub fn query_station_registry(&self) -> anyhow::Result<StationRegistry> {
        Ok(StationRegistry::new(self.query_stations()?))
    }

    /// Metadata for one station. An id missing from the registry fails the
    /// request with [`HtfError::UnknownStation`].
    pub fn query_station(&self, station_id: &str) -> anyhow::Result<Station> {
        let conn = self.conn.borrow();
        let station = conn
            .query_row(
                "SELECT station_id, name, lat, lon FROM stations WHERE station_id = ?1",
                params![station_id],
                |row| {
                    Ok(Station {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        lat: row.get(2)?,
                        lon: row.get(3)?,
                    })
                },
            )
            .optional()?;
        station.ok_or_else(|| HtfError::UnknownStation(station_id.to_string()).into())
    }

    // ───────────────────── Daily records ─────────────────────

    /// Stored days for a station within `[start_date, end_date]`, both
    /// `YYYY-MM-DD`, in date order.
    pub fn query_daily_rows(
        &self,
        station_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> anyhow::Result<Vec<DailyRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT date, min_level, max_level FROM daily_levels
             WHERE station_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
        )?;
        let rows = stmt
            .query_map(params![station_id, start_date, end_date], |row| {
                Ok(DailyRow {
                    date: row.get(0)?,
                    min: row.get(1)?,
                    max: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[HTF] query: query_daily_rows returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// A station's full daily min/max record in meters above MHHW.
    ///
    /// A station with no stored days yields an empty record, which every
    /// downstream count treats as zero flooding days.
    pub fn query_daily_record(&self, station_id: &str) -> anyhow::Result<DailyRecord> {
        let rows = self.query_daily_rows(station_id, "0000-01-01", "9999-12-31")?;
        if rows.is_empty() {
            log::warn!("[HTF] query: no daily record for {}", station_id);
        }
        let observations = rows
            .into_iter()
            .map(|row| {
                Ok(DailyObservation {
                    date: parse_date(&row.date)?,
                    min: row.min,
                    max: row.max,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(DailyRecord::new(observations))
    }

    // ───────────────────── Payloads ─────────────────────

    /// A station's level payload, or `None` when none was loaded.
    pub fn query_levels(&self, station_id: &str) -> anyhow::Result<Option<LevelPayload>> {
        let payload: Option<String> = self
            .conn
            .borrow()
            .query_row(
                "SELECT payload FROM level_payloads WHERE station_id = ?1",
                params![station_id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(LevelPayload::parse(&json)?)),
            None => {
                log::info!("[HTF] query: no levels for {}", station_id);
                Ok(None)
            }
        }
    }

    /// Precomputed observed counts for one threshold key, or `None`.
    pub fn query_observed(
        &self,
        station_id: &str,
        threshold_key: &HeightKey,
    ) -> anyhow::Result<Option<ObservedPayload>> {
        let payload: Option<String> = self
            .conn
            .borrow()
            .query_row(
                "SELECT payload FROM observed_payloads
                 WHERE station_id = ?1 AND threshold_key = ?2",
                params![station_id, threshold_key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(ObservedPayload::parse(&json)?)),
            None => {
                log::info!(
                    "[HTF] query: no observed counts for {} at {}",
                    station_id,
                    threshold_key
                );
                Ok(None)
            }
        }
    }

    /// Normalized projection tables for (station, scenario, threshold key),
    /// or `None` when no projection exists for that combination.
    ///
    /// Results are memoized for the life of the store; source payloads never
    /// change once loaded.
    pub fn query_projection(
        &self,
        station_id: &str,
        scenario: Scenario,
        threshold_key: &HeightKey,
    ) -> anyhow::Result<Option<Rc<ProjectionTables>>> {
        let key = ProjectionKey::new(station_id, scenario, *threshold_key);
        if let Some(tables) = self.projections.borrow().get(&key) {
            log::debug!("[HTF] query: projection memo hit for {:?}", key);
            return Ok(Some(Rc::clone(tables)));
        }

        let payload: Option<String> = self
            .conn
            .borrow()
            .query_row(
                "SELECT payload FROM projection_payloads
                 WHERE station_id = ?1 AND scenario = ?2 AND threshold_key = ?3",
                params![station_id, scenario.as_str(), threshold_key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(tables) = htf_data::projection::load_projection(payload.as_deref())? else {
            return Ok(None);
        };
        let tables = Rc::new(tables);
        self.projections.borrow_mut().insert(key, Rc::clone(&tables));
        Ok(Some(tables))
    }

    /// Every (scenario, threshold key) with a stored projection for a station.
    pub fn query_projection_keys(&self, station_id: &str) -> anyhow::Result<Vec<ProjectionKey>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT scenario, threshold_key FROM projection_payloads
             WHERE station_id = ?1
             ORDER BY scenario, threshold_key",
        )?;
        let raw = stmt
            .query_map(params![station_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut keys = raw
            .into_iter()
            .map(|(scenario, threshold_key)| {
                Ok(ProjectionKey::new(
                    station_id,
                    scenario.parse::<Scenario>().map_err(anyhow::Error::msg)?,
                    threshold_key.parse::<HeightKey>()?,
                ))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        keys.sort();
        Ok(keys)
    }

    /// Row counts per table.
    pub fn query_summary(&self) -> anyhow::Result<StoreSummary> {
        let conn = self.conn.borrow();
        let count = |table: &str| -> anyhow::Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?)
        };
        Ok(StoreSummary {
            stations: count("stations")?,
            daily_rows: count("daily_levels")?,
            level_payloads: count("level_payloads")?,
            observed_payloads: count("observed_payloads")?,
            projection_payloads: count("projection_payloads")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use crate::Database;
    use chrono::NaiveDate;
    use htf_core::error::HtfError;
    use htf_core::levels::LevelKey;
    use htf_core::scenario::Scenario;
    use htf_core::threshold::HeightKey;
    use std::rc::Rc;

    fn loaded() -> Database {
        let db = Database::new().unwrap();
        db.load_stations(STATIONS_CSV).unwrap();
        db.load_daily("8443970", DAILY_CSV).unwrap();
        db.load_levels("8443970", LEVELS_JSON).unwrap();
        db
    }

    #[test]
    fn query_station_registry() {
        let db = loaded();
        let registry = db.query_station_registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("8518750").unwrap().name, "The Battery");
    }

    #[test]
    fn query_unknown_station_is_an_error() {
        let db = loaded();
        let err = db.query_station("0000000").unwrap_err();
        assert_eq!(
            err.downcast_ref::<HtfError>(),
            Some(&HtfError::UnknownStation("0000000".to_string()))
        );
        assert_eq!(db.query_station("8443970").unwrap().name, "Boston");
    }

    #[test]
    fn query_daily_record_preserves_gaps() {
        let db = loaded();
        let record = db.query_daily_record("8443970").unwrap();
        let dates: Vec<NaiveDate> = record.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[3], NaiveDate::from_ymd_opt(2020, 1, 5).unwrap());
        assert_eq!(record.observations()[2].min, None);
        assert_eq!(record.observations()[2].max, Some(0.9));
        assert_eq!(record.valid_days().len(), 3);
    }

    #[test]
    fn query_daily_rows_in_range() {
        let db = loaded();
        let rows = db.query_daily_rows("8443970", "2020-01-02", "2020-01-03").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2020-01-02");
        assert_eq!(rows[0].max, Some(0.75));
    }

    #[test]
    fn query_daily_record_for_station_without_data() {
        let db = loaded();
        let record = db.query_daily_record("8518750").unwrap();
        assert!(record.observations().is_empty());
    }

    #[test]
    fn query_levels_round_trip() {
        let db = loaded();
        let levels = db.query_levels("8443970").unwrap().unwrap();
        assert_eq!(levels.height_of(LevelKey::Minor), Some(0.55));
        assert_eq!(levels.height_of(LevelKey::Return100), Some(1.9));
        assert!(db.query_levels("8518750").unwrap().is_none());
    }

    #[test]
    fn query_observed_missing_is_none() {
        let db = loaded();
        let key = HeightKey::from_centimeters(55);
        assert!(db.query_observed("8443970", &key).unwrap().is_none());
        db.load_observed("8443970", &key, OBSERVED_JSON).unwrap();
        let observed = db.query_observed("8443970", &key).unwrap().unwrap();
        assert_eq!(observed.annual.counts, vec![Some(3), None]);
        assert_eq!(observed.monthly[&2019][9], 1);
    }

    #[test]
    fn query_projection_missing_is_none() {
        let db = loaded();
        let key = HeightKey::from_centimeters(55);
        assert!(db
            .query_projection("8443970", Scenario::High, &key)
            .unwrap()
            .is_none());
    }

    #[test]
    fn query_projection_is_memoized() {
        let db = loaded();
        let key = HeightKey::from_centimeters(55);
        db.load_projection("8443970", Scenario::Int, &key, PROJECTION_JSON)
            .unwrap();
        let first = db.query_projection("8443970", Scenario::Int, &key).unwrap().unwrap();
        let second = db.query_projection("8443970", Scenario::Int, &key).unwrap().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.annual.get(2021, 50), Some(3.0));
        assert!(db
            .query_projection("8443970", Scenario::Low, &key)
            .unwrap()
            .is_none());
    }

    #[test]
    fn query_projection_reads_through_to_the_table() {
        let db = loaded();
        let key = HeightKey::from_centimeters(55);
        db.load_projection("8443970", Scenario::IntHigh, &key, PROJECTION_JSON)
            .unwrap();
        db.projections.borrow_mut().clear();
        let tables = db
            .query_projection("8443970", Scenario::IntHigh, &key)
            .unwrap()
            .unwrap();
        assert_eq!(tables.yoi, None);
        assert_eq!(db.projections.borrow().len(), 1);
    }

    #[test]
    fn query_projection_keys_lists_combinations() {
        let db = loaded();
        let minor = HeightKey::from_centimeters(55);
        let moderate = HeightKey::from_centimeters(86);
        db.load_projection("8443970", Scenario::Int, &moderate, PROJECTION_JSON)
            .unwrap();
        db.load_projection("8443970", Scenario::ObservedTrajectory, &minor, PROJECTION_JSON)
            .unwrap();
        let keys = db.query_projection_keys("8443970").unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].scenario, Scenario::ObservedTrajectory);
        assert_eq!(keys[1].threshold_key, moderate);
        assert!(db.query_projection_keys("8518750").unwrap().is_empty());
    }
}
