//! Conversion of station-datum levels into the MHHW-relative level payload.

use crate::levels::{Datums, FloodLevels, LevelKey, LevelPayload, ReturnLevels, TopTenEvent};
use crate::unit::round_to;
use serde::Deserialize;

/// Levels as published for a station, in meters on the station datum.
///
/// Return-period heights and top-ten events are already published relative
/// to MHHW and pass through untouched.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct StationDatumLevels {
    pub msl: f64,
    pub mllw: f64,
    pub mhhw: f64,
    #[serde(default)]
    pub hat: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    /// Great diurnal range.
    pub gt: f64,
    #[serde(default)]
    pub nos_minor: Option<f64>,
    #[serde(default)]
    pub nos_moderate: Option<f64>,
    #[serde(default)]
    pub nos_major: Option<f64>,
    #[serde(default)]
    pub nws_minor: Option<f64>,
    #[serde(default)]
    pub nws_moderate: Option<f64>,
    #[serde(default)]
    pub nws_major: Option<f64>,
    #[serde(default)]
    pub extremes: Option<ReturnLevels>,
    #[serde(default)]
    pub topten: Vec<TopTenEvent>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Derived NOAA threshold on the station datum, used when the official
/// category is not published. Only defined for the three NOAA categories.
pub fn derived_noaa_threshold(category: LevelKey, gt: f64, mllw: f64) -> Option<f64> {
    let (slope, offset) = match category {
        LevelKey::Minor => (1.04, 0.5),
        LevelKey::Moderate => (1.03, 0.8),
        LevelKey::Major => (1.04, 1.17),
        _ => return None,
    };
    Some(round_to(slope * gt + offset + mllw, 2))
}

impl StationDatumLevels {
    fn above_mhhw(&self, height: f64) -> f64 {
        round_to(height - self.mhhw, 3)
    }

    fn noaa_or_derived(&self, published: Option<f64>, category: LevelKey) -> Option<f64> {
        published
            .or_else(|| {
                let derived = derived_noaa_threshold(category, self.gt, self.mllw);
                if derived.is_some() {
                    log::info!("[HTF] ingest: no published {category} threshold, using derived value");
                }
                derived
            })
            .map(|h| self.above_mhhw(h))
    }

    /// Re-express every level relative to MHHW.
    pub fn normalize(&self) -> LevelPayload {
        let datums = Datums {
            msl: self.above_mhhw(self.msl),
            mllw: self.above_mhhw(self.mllw),
            mhhw: 0.0,
            hat: self.hat.map(|h| self.above_mhhw(h)),
            lat: self.lat.map(|h| self.above_mhhw(h)),
            gt: Some(self.gt),
        };
        let flood = FloodLevels {
            minor: self.noaa_or_derived(self.nos_minor, LevelKey::Minor),
            moderate: self.noaa_or_derived(self.nos_moderate, LevelKey::Moderate),
            major: self.noaa_or_derived(self.nos_major, LevelKey::Major),
            nws_minor: self.nws_minor.map(|h| self.above_mhhw(h)),
            nws_moderate: self.nws_moderate.map(|h| self.above_mhhw(h)),
            nws_major: self.nws_major.map(|h| self.above_mhhw(h)),
        };
        LevelPayload {
            datums,
            flood,
            extremes: self.extremes.clone(),
            topten: self.topten.clone(),
            updated: self.updated.clone(),
        }
    }
}
