use crate::error::HtfError;
use crate::threshold::{HeightKey, CUSTOM_LABEL, CUSTOM_VALUE};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic key of a reference level.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKey {
    Msl,
    Mllw,
    Mhhw,
    Minor,
    Moderate,
    Major,
    NwsMinor,
    NwsModerate,
    NwsMajor,
    #[serde(rename = "100yr")]
    Return100,
    #[serde(rename = "10yr")]
    Return10,
    #[serde(rename = "2yr")]
    Return2,
    #[serde(rename = "1yr")]
    Return1,
}

/// Grouping of level keys by where they come from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LevelKind {
    Datum,
    Flood,
    ReturnPeriod,
}

impl LevelKey {
    /// Catalog order: datums, then flood categories, then return periods from
    /// the rarest down.
    pub const CATALOG_ORDER: [LevelKey; 13] = [
        LevelKey::Msl,
        LevelKey::Mllw,
        LevelKey::Mhhw,
        LevelKey::Minor,
        LevelKey::Moderate,
        LevelKey::Major,
        LevelKey::NwsMinor,
        LevelKey::NwsModerate,
        LevelKey::NwsMajor,
        LevelKey::Return100,
        LevelKey::Return10,
        LevelKey::Return2,
        LevelKey::Return1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelKey::Msl => "msl",
            LevelKey::Mllw => "mllw",
            LevelKey::Mhhw => "mhhw",
            LevelKey::Minor => "minor",
            LevelKey::Moderate => "moderate",
            LevelKey::Major => "major",
            LevelKey::NwsMinor => "nws_minor",
            LevelKey::NwsModerate => "nws_moderate",
            LevelKey::NwsMajor => "nws_major",
            LevelKey::Return100 => "100yr",
            LevelKey::Return10 => "10yr",
            LevelKey::Return2 => "2yr",
            LevelKey::Return1 => "1yr",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LevelKey::Msl => "Mean Sea Level",
            LevelKey::Mllw => "Mean Lower Low Water",
            LevelKey::Mhhw => "Mean Higher High Water",
            LevelKey::Minor => "NOAA Minor",
            LevelKey::Moderate => "NOAA Moderate",
            LevelKey::Major => "NOAA Major",
            LevelKey::NwsMinor => "NWS Minor",
            LevelKey::NwsModerate => "NWS Moderate",
            LevelKey::NwsMajor => "NWS Major",
            LevelKey::Return100 => "100-year flood",
            LevelKey::Return10 => "10-year flood",
            LevelKey::Return2 => "2-year flood",
            LevelKey::Return1 => "1-year flood",
        }
    }

    pub fn kind(&self) -> LevelKind {
        match self {
            LevelKey::Msl | LevelKey::Mllw | LevelKey::Mhhw => LevelKind::Datum,
            LevelKey::Return100 | LevelKey::Return10 | LevelKey::Return2 | LevelKey::Return1 => {
                LevelKind::ReturnPeriod
            }
            _ => LevelKind::Flood,
        }
    }

    /// Bare datums are never selectable as a flooding threshold.
    pub fn is_datum(&self) -> bool {
        self.kind() == LevelKind::Datum
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelKey {
    type Err = HtfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        LevelKey::CATALOG_ORDER
            .iter()
            .copied()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| HtfError::InvalidThreshold(format!("unknown level '{s}'")))
    }
}

/// Tidal datums relative to MHHW. `gt` (great diurnal range) is kept in
/// station units since it is only used for derived thresholds.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Datums {
    pub msl: f64,
    pub mllw: f64,
    pub mhhw: f64,
    #[serde(default)]
    pub hat: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub gt: Option<f64>,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct FloodLevels {
    #[serde(default)]
    pub minor: Option<f64>,
    #[serde(default)]
    pub moderate: Option<f64>,
    #[serde(default)]
    pub major: Option<f64>,
    #[serde(default)]
    pub nws_minor: Option<f64>,
    #[serde(default)]
    pub nws_moderate: Option<f64>,
    #[serde(default)]
    pub nws_major: Option<f64>,
}

/// Extreme water levels by return period.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct ReturnLevels {
    #[serde(rename = "100yr", default)]
    pub yr100: Option<f64>,
    #[serde(rename = "10yr", default)]
    pub yr10: Option<f64>,
    #[serde(rename = "2yr", default)]
    pub yr2: Option<f64>,
    #[serde(rename = "1yr", default)]
    pub yr1: Option<f64>,
}

/// One of the ten highest observed water levels.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TopTenEvent {
    pub date: String,
    #[serde(alias = "height_m")]
    pub height: f64,
}

/// Per-station level payload, every height in meters relative to MHHW.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LevelPayload {
    pub datums: Datums,
    #[serde(default)]
    pub flood: FloodLevels,
    /// Stations without extreme-water-level statistics carry `null`.
    #[serde(default)]
    pub extremes: Option<ReturnLevels>,
    #[serde(default)]
    pub topten: Vec<TopTenEvent>,
    #[serde(default)]
    pub updated: Option<String>,
}

impl LevelPayload {
    pub fn parse(json: &str) -> Result<Self, HtfError> {
        let payload: LevelPayload = serde_json::from_str(json)?;
        payload.validate()?;
        Ok(payload)
    }

    fn validate(&self) -> Result<(), HtfError> {
        let non_finite = LevelKey::CATALOG_ORDER
            .iter()
            .filter_map(|key| self.height_of(*key).map(|h| (key, h)))
            .find(|(_, h)| !h.is_finite());
        if let Some((key, h)) = non_finite {
            return Err(HtfError::InvalidPayload(format!("level {key} = {h}")));
        }
        if self.datums.mhhw.abs() > 1e-6 {
            log::warn!(
                "[HTF] levels: mhhw is {} rather than 0, payload may not be MHHW-relative",
                self.datums.mhhw
            );
        }
        Ok(())
    }

    /// Height in meters above MHHW for a semantic key, if the station has it.
    pub fn height_of(&self, key: LevelKey) -> Option<f64> {
        let extremes = self.extremes.as_ref();
        match key {
            LevelKey::Msl => Some(self.datums.msl),
            LevelKey::Mllw => Some(self.datums.mllw),
            LevelKey::Mhhw => Some(self.datums.mhhw),
            LevelKey::Minor => self.flood.minor,
            LevelKey::Moderate => self.flood.moderate,
            LevelKey::Major => self.flood.major,
            LevelKey::NwsMinor => self.flood.nws_minor,
            LevelKey::NwsModerate => self.flood.nws_moderate,
            LevelKey::NwsMajor => self.flood.nws_major,
            LevelKey::Return100 => extremes.and_then(|e| e.yr100),
            LevelKey::Return10 => extremes.and_then(|e| e.yr10),
            LevelKey::Return2 => extremes.and_then(|e| e.yr2),
            LevelKey::Return1 => extremes.and_then(|e| e.yr1),
        }
    }
}

/// A named level as handed to rendering.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ReferenceLevel {
    #[serde(rename = "value")]
    pub key: LevelKey,
    pub label: String,
    /// Display height in the catalog unit, rounded to 2 decimals.
    pub height: f64,
    pub height_key: HeightKey,
    pub height_m: f64,
}

/// One entry of a selection list.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ThresholdOption {
    pub value: String,
    pub label: String,
}

/// Row of the combined top-ten / return-period table.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextEntry {
    /// An observed event, height in display units.
    #[serde(rename = "topten")]
    TopTen { date: String, height: f64 },
    /// A return-period level, height in display units.
    #[serde(rename = "return")]
    ReturnPeriod { label: String, height: f64 },
}

impl ContextEntry {
    pub fn height(&self) -> f64 {
        match self {
            ContextEntry::TopTen { height, .. } | ContextEntry::ReturnPeriod { height, .. } => {
                *height
            }
        }
    }
}

/// Ordered catalog of a station's reference levels in one display unit.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct LevelCatalog {
    pub unit: Unit,
    pub levels: Vec<ReferenceLevel>,
    pub topten: Vec<TopTenEvent>,
    pub updated: Option<String>,
}

impl LevelCatalog {
    /// Build the catalog from a payload. Levels the station lacks are dropped;
    /// only msl, mllw and mhhw survive from the datums.
    pub fn build(payload: &LevelPayload, unit: Unit) -> Self {
        let levels: Vec<ReferenceLevel> = LevelKey::CATALOG_ORDER
            .iter()
            .filter_map(|key| {
                payload.height_of(*key).map(|height_m| ReferenceLevel {
                    key: *key,
                    label: key.label().to_string(),
                    height: unit.display(height_m),
                    height_key: HeightKey::from_meters_unclamped(height_m),
                    height_m,
                })
            })
            .collect();
        log::debug!("[HTF] levels: catalog of {} levels in {}", levels.len(), unit);
        Self {
            unit,
            levels,
            topten: payload.topten.clone(),
            updated: payload.updated.clone(),
        }
    }

    pub fn levels(&self) -> &[ReferenceLevel] {
        &self.levels
    }

    pub fn get(&self, key: LevelKey) -> Option<&ReferenceLevel> {
        self.levels.iter().find(|level| level.key == key)
    }

    /// First non-datum level whose height key equals `key`.
    pub fn find_threshold_by_key(&self, key: &HeightKey) -> Option<&ReferenceLevel> {
        self.levels
            .iter()
            .find(|level| !level.key.is_datum() && level.height_key == *key)
    }

    /// Selectable thresholds: every non-datum level plus a trailing custom entry.
    pub fn threshold_options(&self) -> Vec<ThresholdOption> {
        self.levels
            .iter()
            .filter(|level| !level.key.is_datum())
            .map(|level| ThresholdOption {
                value: level.key.as_str().to_string(),
                label: level.label.clone(),
            })
            .chain(std::iter::once(ThresholdOption {
                value: CUSTOM_VALUE.to_string(),
                label: CUSTOM_LABEL.to_string(),
            }))
            .collect()
    }

    /// Order in which levels are drawn as reference lines: MLLW is left out
    /// and the currently selected level comes last so it is drawn on top.
    pub fn highlight_order(&self, selected: &HeightKey) -> Vec<&ReferenceLevel> {
        let selected = self.find_threshold_by_key(selected);
        let selected_key = selected.map(|level| level.key);
        let mut order: Vec<&ReferenceLevel> = self
            .levels
            .iter()
            .filter(|level| level.key != LevelKey::Mllw && Some(level.key) != selected_key)
            .collect();
        order.extend(selected);
        order
    }

    /// Interleave the top-ten observed events with the return-period levels.
    ///
    /// Return periods are walked from the rarest down; each is preceded by the
    /// events at or above it and below the previous (rarer) level.
    pub fn return_period_context(&self) -> Vec<ContextEntry> {
        let events: Vec<(&str, f64)> = self
            .topten
            .iter()
            .map(|event| (event.date.as_str(), self.unit.display(event.height)))
            .collect();
        let mut context = Vec::new();
        let mut upper = f64::INFINITY;
        for level in self
            .levels
            .iter()
            .filter(|level| level.key.kind() == LevelKind::ReturnPeriod)
        {
            for (date, height) in events.iter() {
                if *height >= level.height && *height < upper {
                    context.push(ContextEntry::TopTen {
                        date: date.to_string(),
                        height: *height,
                    });
                }
            }
            context.push(ContextEntry::ReturnPeriod {
                label: level.label.clone(),
                height: level.height,
            });
            upper = level.height;
        }
        context
    }
}
