//! Reading a deployment's data directory into the store.
//!
//! Layout under the data directory:
//!
//! ```text
//! stations.csv | stations.json
//! levels/{station}.json
//! day_min_max/{station}.csv | day_min_max/{station}.csv.gz
//! htf_observed/{station}/{key}.json
//! ensemble_calcs/{station}/{scenario}/{key}.json
//! ```
//!
//! Every file is read fully and closed before its contents are loaded. Files
//! that do not exist are reported as `false`, not as errors.

use flate2::read::GzDecoder;
use htf_core::error::HtfError;
use htf_core::scenario::Scenario;
use htf_core::threshold::HeightKey;
use htf_db::Database;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn levels_path(&self, station_id: &str) -> PathBuf {
        self.root.join("levels").join(format!("{station_id}.json"))
    }

    pub fn observed_path(&self, station_id: &str, key: &HeightKey) -> PathBuf {
        self.root
            .join("htf_observed")
            .join(station_id)
            .join(format!("{key}.json"))
    }

    pub fn projection_path(&self, station_id: &str, scenario: Scenario, key: &HeightKey) -> PathBuf {
        self.root
            .join("ensemble_calcs")
            .join(station_id)
            .join(scenario.as_str())
            .join(format!("{key}.json"))
    }

    /// Load the station registry, preferring `stations.csv` over
    /// `stations.json`. A directory with neither is unusable.
    pub fn load_stations(&self, db: &Database) -> anyhow::Result<()> {
        let csv_path = self.root.join("stations.csv");
        if let Some(csv) = read_optional(&csv_path)? {
            return db.load_stations(&csv);
        }
        let json_path = self.root.join("stations.json");
        match read_optional(&json_path)? {
            Some(json) => db.load_stations_json(&json),
            None => anyhow::bail!(
                "no stations.csv or stations.json in {}",
                self.root.display()
            ),
        }
    }

    /// Load the registry and check the requested station is in it.
    pub fn load_station(&self, db: &Database, station_id: &str) -> anyhow::Result<()> {
        self.load_stations(db)?;
        let registry = db.query_station_registry()?;
        if !registry.contains(station_id) {
            return Err(HtfError::UnknownStation(station_id.to_string()).into());
        }
        Ok(())
    }

    pub fn load_levels(&self, db: &Database, station_id: &str) -> anyhow::Result<bool> {
        match read_optional(&self.levels_path(station_id))? {
            Some(json) => db.load_levels(station_id, &json).map(|_| true),
            None => {
                info!("[HTF] data_dir: no levels file for {}", station_id);
                Ok(false)
            }
        }
    }

    /// Load a daily min/max record, plain or gzip-compressed.
    pub fn load_daily(&self, db: &Database, station_id: &str) -> anyhow::Result<bool> {
        let dir = self.root.join("day_min_max");
        let plain = read_optional(&dir.join(format!("{station_id}.csv")))?;
        let csv = match plain {
            Some(csv) => Some(csv),
            None => read_gzip_optional(&dir.join(format!("{station_id}.csv.gz")))?,
        };
        match csv {
            Some(csv) => db.load_daily(station_id, &csv).map(|_| true),
            None => {
                info!("[HTF] data_dir: no daily record for {}", station_id);
                Ok(false)
            }
        }
    }

    pub fn load_observed(
        &self,
        db: &Database,
        station_id: &str,
        key: &HeightKey,
    ) -> anyhow::Result<bool> {
        match read_optional(&self.observed_path(station_id, key))? {
            Some(json) => db.load_observed(station_id, key, &json).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn load_projection(
        &self,
        db: &Database,
        station_id: &str,
        scenario: Scenario,
        key: &HeightKey,
    ) -> anyhow::Result<bool> {
        match read_optional(&self.projection_path(station_id, scenario, key))? {
            Some(json) => db.load_projection(station_id, scenario, key, &json).map(|_| true),
            None => Ok(false),
        }
    }
}

/// Read a whole file, `None` when it does not exist.
pub fn read_optional(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    Ok(Some(contents))
}

/// Read and decompress a whole gzip file, `None` when it does not exist.
pub fn read_gzip_optional(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let mut contents = String::new();
    GzDecoder::new(file)
        .read_to_string(&mut contents)
        .map_err(|e| anyhow::anyhow!("Failed to decompress {}: {}", path.display(), e))?;
    Ok(Some(contents))
}
