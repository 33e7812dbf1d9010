use crate::error::HtfError;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A NOAA tide gauge station.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Station {
    /// External tide gauge identifier (e.g., "8443970" for Boston)
    pub id: String,
    /// Human-readable name of the station
    pub name: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

#[derive(Deserialize)]
struct StationEntry {
    name: String,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StationsJson {
    List(Vec<Station>),
    ById(BTreeMap<String, StationEntry>),
}

impl Station {
    /// Parse a CSV string of station data into a vector of Stations.
    ///
    /// Expected CSV columns: id, name, lat, lon
    pub fn parse_station_csv(csv_object: &str) -> Result<Vec<Station>, HtfError> {
        let mut station_list: Vec<Station> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let id = record.get(0).unwrap_or("").trim().to_string();
            if id.is_empty() {
                return Err(HtfError::InvalidPayload(format!(
                    "station row without id: {:?}",
                    record
                )));
            }
            let name = record.get(1).unwrap_or("").trim().to_string();
            let lat = parse_coordinate(record.get(2), &id, "lat")?;
            let lon = parse_coordinate(record.get(3), &id, "lon")?;
            station_list.push(Station { id, name, lat, lon });
        }
        Ok(station_list)
    }

    /// Parse station JSON: either a list of `{id, name, lat, lon}` records or
    /// an object keyed by station id.
    pub fn parse_station_json(json: &str) -> Result<Vec<Station>, HtfError> {
        let parsed: StationsJson = serde_json::from_str(json)?;
        Ok(match parsed {
            StationsJson::List(list) => list,
            StationsJson::ById(map) => map
                .into_iter()
                .map(|(id, entry)| Station {
                    id,
                    name: entry.name,
                    lat: entry.lat,
                    lon: entry.lon,
                })
                .collect(),
        })
    }
}

fn parse_coordinate(field: Option<&str>, id: &str, what: &str) -> Result<f64, HtfError> {
    field
        .unwrap_or("")
        .trim()
        .parse::<f64>()
        .map_err(|_| HtfError::InvalidPayload(format!("station {id}: bad {what} {field:?}")))
}

/// Read-only station registry, built once at startup and passed to whoever
/// needs station metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationRegistry {
    stations: Vec<Station>,
}

impl StationRegistry {
    pub fn new(stations: Vec<Station>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let stations: Vec<Station> = stations
            .into_iter()
            .filter(|station| {
                let fresh = seen.insert(station.id.clone());
                if !fresh {
                    log::warn!("[HTF] registry: duplicate station id {}", station.id);
                }
                fresh
            })
            .collect();
        log::info!("[HTF] registry: {} stations", stations.len());
        Self { stations }
    }

    /// Look up a station by id. An unknown id is fatal for the request.
    pub fn get(&self, station_id: &str) -> Result<&Station, HtfError> {
        self.stations
            .iter()
            .find(|station| station.id == station_id)
            .ok_or_else(|| HtfError::UnknownStation(station_id.to_string()))
    }

    pub fn contains(&self, station_id: &str) -> bool {
        self.get(station_id).is_ok()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
