//! Request-scoped settings, built once from the command line and passed down.

use anyhow::anyhow;
use clap::Args;
use htf_core::error::HtfError;
use htf_core::levels::LevelCatalog;
use htf_core::scenario::Scenario;
use htf_core::threshold::ThresholdSelection;
use htf_core::unit::Unit;
use std::path::PathBuf;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Directory holding stations, levels, daily records and payloads
    #[arg(short = 'd', long, global = true, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Display unit: meters or feet
    #[arg(short = 'u', long, global = true, default_value = "feet")]
    pub units: Unit,
}

/// What one request asks for. Each request gets its own; nothing here is
/// shared between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub unit: Unit,
    pub scenario: Scenario,
    /// Raw threshold input: a category name, a three-digit key or a height
    /// in `unit`. `None` selects the station default.
    pub threshold: Option<String>,
}

impl RequestConfig {
    pub fn new(unit: Unit, scenario: Scenario, threshold: Option<String>) -> Self {
        Self {
            unit,
            scenario,
            threshold,
        }
    }

    /// Resolve the threshold input against a station's catalog.
    pub fn resolve_threshold(&self, catalog: &LevelCatalog) -> anyhow::Result<ThresholdSelection> {
        match self.threshold.as_deref() {
            Some(input) => Ok(ThresholdSelection::parse_input(input, self.unit, catalog)?),
            None => ThresholdSelection::default_for(catalog).ok_or_else(|| {
                anyhow!(HtfError::MissingData(
                    "station has no default threshold; pass --threshold".to_string()
                ))
            }),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self::new(Unit::default(), Scenario::default(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use htf_core::levels::LevelPayload;

    fn catalog(unit: Unit) -> LevelCatalog {
        let payload = LevelPayload::parse(
            r#"{
                "datums": {"msl": -0.45, "mllw": -1.35, "mhhw": 0.0},
                "flood": {"minor": 0.55, "moderate": 0.86},
                "extremes": null,
                "topten": []
            }"#,
        )
        .unwrap();
        LevelCatalog::build(&payload, unit)
    }

    #[test]
    fn test_defaults() {
        let config = RequestConfig::default();
        assert_eq!(config.unit, Unit::Feet);
        assert_eq!(config.scenario, Scenario::Int);
        let selection = config.resolve_threshold(&catalog(Unit::Feet)).unwrap();
        assert_eq!(selection.name(), "NOAA Minor");
        assert_eq!(selection.key.to_string(), "055");
    }

    #[test]
    fn test_numeric_threshold_in_feet() {
        let config = RequestConfig::new(Unit::Feet, Scenario::Int, Some("2".to_string()));
        let selection = config.resolve_threshold(&catalog(Unit::Feet)).unwrap();
        // 2 ft = 0.6096 m, keyed at 61 cm
        assert_eq!(selection.key.to_string(), "061");
        assert!(selection.is_custom());
    }

    #[test]
    fn test_bad_threshold_input() {
        let config = RequestConfig::new(Unit::Meters, Scenario::Int, Some("high".to_string()));
        let err = config.resolve_threshold(&catalog(Unit::Meters)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HtfError>(),
            Some(HtfError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_missing_category() {
        let config = RequestConfig::new(Unit::Meters, Scenario::Int, Some("major".to_string()));
        let err = config.resolve_threshold(&catalog(Unit::Meters)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HtfError>(),
            Some(HtfError::MissingData(_))
        ));
    }
}
