//! Threshold resolution: named flood category <-> centimeter height key <->
//! display height.
//!
//! The [`HeightKey`] is the single join key between named reference levels
//! and numeric heights. Its string form is the zero-padded centimeter count
//! used in data file names (`0.70 m -> "070"`).

use crate::error::HtfError;
use crate::levels::{LevelCatalog, LevelKey};
use crate::unit::{round_to, Unit, FEET_PER_METER};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lowest custom threshold a user may enter, in meters above MHHW.
pub const MIN_CUSTOM_HEIGHT_M: f64 = 0.0;

/// Highest custom threshold a user may enter, in meters above MHHW.
pub const MAX_CUSTOM_HEIGHT_M: f64 = 3.0;

/// Option value and label for a threshold that matches no named level.
pub const CUSTOM_VALUE: &str = "custom";
pub const CUSTOM_LABEL: &str = "Custom";

/// Category selected when a station is first loaded.
pub const DEFAULT_CATEGORY: LevelKey = LevelKey::Minor;

/// Centimeter-quantized height relative to MHHW.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct HeightKey(i64);

impl HeightKey {
    pub fn from_centimeters(centimeters: i64) -> Self {
        HeightKey(centimeters)
    }

    pub fn centimeters(&self) -> i64 {
        self.0
    }

    pub fn meters(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Key for a fixed named level. Not clamped: negative datums and extreme
    /// return levels above 3 m keep their true value.
    pub fn from_meters_unclamped(height_m: f64) -> Self {
        if !height_m.is_finite() {
            return HeightKey(0);
        }
        HeightKey((100.0 * height_m).round() as i64)
    }

    /// Strict validation for keys arriving from a query string: exactly
    /// three digits and no more than 300 cm.
    pub fn parse_query(s: &str) -> Option<Self> {
        let valid = s.len() == 3 && s.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return None;
        }
        let centimeters: i64 = s.parse().ok()?;
        let max_cm = (MAX_CUSTOM_HEIGHT_M * 100.0) as i64;
        (centimeters <= max_cm).then_some(HeightKey(centimeters))
    }
}

impl fmt::Display for HeightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for HeightKey {
    type Err = HtfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(HeightKey)
            .map_err(|_| HtfError::InvalidThreshold(format!("height key '{s}'")))
    }
}

impl Serialize for HeightKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HeightKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Key for a user-entered custom height: clamped to [0, 3] m and rounded to
/// the nearest centimeter.
pub fn height_to_key(height_m: f64) -> HeightKey {
    let height_m = if height_m.is_finite() { height_m } else { MIN_CUSTOM_HEIGHT_M };
    let clamped = height_m.clamp(MIN_CUSTOM_HEIGHT_M, MAX_CUSTOM_HEIGHT_M);
    HeightKey((clamped * 100.0).round() as i64)
}

/// Canonical display height of a key, rounded to 2 decimals.
pub fn key_to_height(key: &HeightKey, unit: Unit) -> f64 {
    round_to(unit.from_meters(key.meters()), 2)
}

/// Outcome of matching a height key against a station's catalog.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Resolution {
    /// The matched flood category, or `None` for a custom height.
    pub category: Option<LevelKey>,
    pub label: String,
}

impl Resolution {
    pub fn is_custom(&self) -> bool {
        self.category.is_none()
    }

    /// Option value as used by selection lists ("minor", ..., "custom").
    pub fn value(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or(CUSTOM_VALUE)
    }
}

/// Match a height key to the first catalog level sharing it, skipping the
/// bare datums (MSL, MHHW, MLLW). Never fails: no match means "Custom".
pub fn resolve_selection(key: &HeightKey, catalog: &LevelCatalog) -> Resolution {
    match catalog.find_threshold_by_key(key) {
        Some(level) => Resolution {
            category: Some(level.key),
            label: level.label.clone(),
        },
        None => Resolution {
            category: None,
            label: CUSTOM_LABEL.to_string(),
        },
    }
}

/// Resolved threshold handed to rendering: key, name and both unit heights.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ThresholdDescriptor {
    pub key: HeightKey,
    pub name: String,
    pub height_m: f64,
    pub height_ft: f64,
}

/// The currently active threshold for one request or session.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ThresholdSelection {
    pub key: HeightKey,
    pub resolution: Resolution,
}

impl ThresholdSelection {
    /// Select a key directly, re-resolving it against the catalog.
    pub fn from_key(key: HeightKey, catalog: &LevelCatalog) -> Self {
        let resolution = resolve_selection(&key, catalog);
        Self { key, resolution }
    }

    /// Select a named category. Returns `None` when the station does not
    /// define that category or when it is a bare datum.
    ///
    /// Two categories may share a key (e.g. NOAA and NWS minor); the
    /// selection then reports whichever the catalog lists first.
    pub fn from_category(category: LevelKey, catalog: &LevelCatalog) -> Option<Self> {
        if category.is_datum() {
            return None;
        }
        let level = catalog.get(category)?;
        Some(Self::from_key(level.height_key, catalog))
    }

    /// Select a custom height entered in display units.
    pub fn from_display_height(
        value: f64,
        unit: Unit,
        catalog: &LevelCatalog,
    ) -> Result<Self, HtfError> {
        if !value.is_finite() {
            return Err(HtfError::InvalidThreshold(value.to_string()));
        }
        let height_m = round_to(unit.to_meters(value), 2);
        Ok(Self::from_key(height_to_key(height_m), catalog))
    }

    /// Interpret free-form threshold input: a category name ("minor",
    /// "nws_moderate", "10yr"), a three-digit key ("070"), or a numeric
    /// height in display units ("2.3").
    pub fn parse_input(input: &str, unit: Unit, catalog: &LevelCatalog) -> Result<Self, HtfError> {
        let input = input.trim();
        if let Ok(category) = input.parse::<LevelKey>() {
            return Self::from_category(category, catalog).ok_or_else(|| {
                HtfError::MissingData(format!("no '{category}' threshold for this station"))
            });
        }
        if let Some(key) = HeightKey::parse_query(input) {
            return Ok(Self::from_key(key, catalog));
        }
        match input.parse::<f64>() {
            Ok(value) => Self::from_display_height(value, unit, catalog),
            Err(_) => Err(HtfError::InvalidThreshold(input.to_string())),
        }
    }

    /// The station default: NOAA minor if defined.
    pub fn default_for(catalog: &LevelCatalog) -> Option<Self> {
        Self::from_category(DEFAULT_CATEGORY, catalog)
    }

    pub fn name(&self) -> &str {
        &self.resolution.label
    }

    pub fn is_custom(&self) -> bool {
        self.resolution.is_custom()
    }

    pub fn height_m(&self) -> f64 {
        key_to_height(&self.key, Unit::Meters)
    }

    pub fn display_height(&self, unit: Unit) -> f64 {
        key_to_height(&self.key, unit)
    }

    pub fn descriptor(&self) -> ThresholdDescriptor {
        ThresholdDescriptor {
            key: self.key,
            name: self.resolution.label.clone(),
            height_m: self.height_m(),
            height_ft: round_to(self.key.meters() * FEET_PER_METER, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LevelCatalog, LevelPayload};

    const LEVELS_JSON: &str = r#"{
        "datums": {"msl": -0.35, "mllw": -1.2, "mhhw": 0.0, "hat": 0.3, "lat": -1.5, "gt": 1.2},
        "flood": {"minor": 0.7, "moderate": 1.0, "major": 1.4,
                  "nws_minor": 0.7, "nws_moderate": null, "nws_major": null},
        "extremes": {"100yr": 1.9, "10yr": 1.5, "2yr": 1.1, "1yr": 0.8},
        "topten": [],
        "updated": "May 01, 2022"
    }"#;

    fn catalog(unit: Unit) -> LevelCatalog {
        LevelCatalog::build(&LevelPayload::parse(LEVELS_JSON).unwrap(), unit)
    }

    #[test]
    fn test_height_to_key() {
        assert_eq!(height_to_key(0.753).to_string(), "075");
        assert_eq!(height_to_key(0.7).to_string(), "070");
        assert_eq!(height_to_key(0.29).to_string(), "029");
        assert_eq!(height_to_key(-0.4).to_string(), "000");
        assert_eq!(height_to_key(3.5).to_string(), "300");
        assert_eq!(height_to_key(f64::NAN).to_string(), "000");
    }

    #[test]
    fn test_unclamped_keys_for_named_levels() {
        assert_eq!(HeightKey::from_meters_unclamped(-0.35).to_string(), "-35");
        assert_eq!(HeightKey::from_meters_unclamped(-0.05).to_string(), "-05");
        assert_eq!(HeightKey::from_meters_unclamped(10.25).to_string(), "1025");
    }

    #[test]
    fn test_height_key_round_trip_in_meters() {
        for cm in 0..=300 {
            let h = cm as f64 * 0.01;
            let expected = round_to(h, 2);
            assert_eq!(key_to_height(&height_to_key(h), Unit::Meters), expected, "h = {h}");
        }
    }

    #[test]
    fn test_key_to_height_in_feet() {
        assert_eq!(key_to_height(&HeightKey(70), Unit::Feet), 2.3);
        assert_eq!(key_to_height(&HeightKey(100), Unit::Feet), 3.28);
        assert_eq!(key_to_height(&HeightKey(-35), Unit::Feet), -1.15);
        assert_eq!(key_to_height(&HeightKey(0), Unit::Feet), 0.0);
    }

    #[test]
    fn test_every_key_converts_consistently() {
        for cm in -500..=2000 {
            let key = HeightKey(cm);
            let meters = key_to_height(&key, Unit::Meters);
            assert_eq!(meters, cm as f64 / 100.0, "key {cm}");
            let feet = key_to_height(&key, Unit::Feet);
            assert_eq!(feet, round_to(meters * FEET_PER_METER, 2), "key {cm}");
            assert!((feet - meters * FEET_PER_METER).abs() <= 0.005 + 1e-9, "key {cm}");
        }
    }

    #[test]
    fn test_parse_query_keys() {
        assert_eq!(HeightKey::parse_query("070"), Some(HeightKey(70)));
        assert_eq!(HeightKey::parse_query("300"), Some(HeightKey(300)));
        assert_eq!(HeightKey::parse_query("301"), None);
        assert_eq!(HeightKey::parse_query("70"), None);
        assert_eq!(HeightKey::parse_query("0.7"), None);
        assert_eq!(HeightKey::parse_query("-70"), None);
    }

    #[test]
    fn test_height_key_serde_as_string() {
        let json = serde_json::to_string(&HeightKey(70)).unwrap();
        assert_eq!(json, "\"070\"");
        let key: HeightKey = serde_json::from_str("\"070\"").unwrap();
        assert_eq!(key, HeightKey(70));
    }

    #[test]
    fn test_resolve_selection_first_match_wins() {
        let catalog = catalog(Unit::Meters);
        // NOAA minor and NWS minor share 0.70 m; NOAA minor is listed first
        let resolution = resolve_selection(&HeightKey(70), &catalog);
        assert_eq!(resolution.category, Some(LevelKey::Minor));
        assert_eq!(resolution.label, "NOAA Minor");
    }

    #[test]
    fn test_resolve_selection_skips_datums() {
        let catalog = catalog(Unit::Meters);
        // MHHW sits at 0 cm but a bare datum is never a threshold
        let resolution = resolve_selection(&HeightKey(0), &catalog);
        assert!(resolution.is_custom());
        assert_eq!(resolution.label, "Custom");
        assert_eq!(resolution.value(), "custom");
    }

    #[test]
    fn test_custom_height_resolves_to_category_when_it_coincides() {
        let catalog = catalog(Unit::Feet);
        // 3.28 ft -> 1.00 m -> NOAA Moderate
        let selection = ThresholdSelection::from_display_height(3.28, Unit::Feet, &catalog).unwrap();
        assert_eq!(selection.key.to_string(), "100");
        assert_eq!(selection.resolution.category, Some(LevelKey::Moderate));

        let selection = ThresholdSelection::from_display_height(0.55, Unit::Meters, &catalog).unwrap();
        assert!(selection.is_custom());
        assert_eq!(selection.name(), "Custom");
    }

    #[test]
    fn test_category_and_height_round_trip_agree() {
        let catalog = catalog(Unit::Meters);
        let by_category = ThresholdSelection::from_category(LevelKey::Major, &catalog).unwrap();
        let by_height =
            ThresholdSelection::from_display_height(by_category.height_m(), Unit::Meters, &catalog)
                .unwrap();
        assert_eq!(by_category, by_height);
    }

    #[test]
    fn test_from_category_rejects_datums_and_absent_levels() {
        let catalog = catalog(Unit::Meters);
        assert!(ThresholdSelection::from_category(LevelKey::Mhhw, &catalog).is_none());
        assert!(ThresholdSelection::from_category(LevelKey::NwsMajor, &catalog).is_none());
    }

    #[test]
    fn test_parse_input() {
        let catalog = catalog(Unit::Feet);
        let minor = ThresholdSelection::parse_input("minor", Unit::Feet, &catalog).unwrap();
        assert_eq!(minor.key, HeightKey(70));

        let by_key = ThresholdSelection::parse_input("140", Unit::Feet, &catalog).unwrap();
        assert_eq!(by_key.resolution.category, Some(LevelKey::Major));

        let by_height = ThresholdSelection::parse_input("2.5", Unit::Feet, &catalog).unwrap();
        assert_eq!(by_height.key, HeightKey(76));

        assert!(matches!(
            ThresholdSelection::parse_input("high", Unit::Feet, &catalog),
            Err(HtfError::InvalidThreshold(_))
        ));
        assert!(matches!(
            ThresholdSelection::parse_input("nws_major", Unit::Feet, &catalog),
            Err(HtfError::MissingData(_))
        ));
    }

    #[test]
    fn test_descriptor() {
        let catalog = catalog(Unit::Feet);
        let selection = ThresholdSelection::default_for(&catalog).unwrap();
        let descriptor = selection.descriptor();
        assert_eq!(descriptor.key.to_string(), "070");
        assert_eq!(descriptor.name, "NOAA Minor");
        assert_eq!(descriptor.height_m, 0.7);
        assert_eq!(descriptor.height_ft, 2.3);
    }
}
