use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversion factor from meters to feet.
pub const FEET_PER_METER: f64 = 3.28084;

/// Display unit for every height leaving the core. All stored heights are
/// meters relative to MHHW; conversion happens once, where display values
/// are produced.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Meters,
    #[default]
    Feet,
}

impl Unit {
    /// Short label used next to numbers ("m" / "ft").
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Unit::Meters => "m",
            Unit::Feet => "ft",
        }
    }

    /// Long label ("meters" / "feet").
    pub fn long_name(&self) -> &'static str {
        match self {
            Unit::Meters => "meters",
            Unit::Feet => "feet",
        }
    }

    /// Multiplier applied to a height in meters.
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Meters => 1.0,
            Unit::Feet => FEET_PER_METER,
        }
    }

    /// Convert a height in meters to this unit without rounding.
    pub fn from_meters(&self, meters: f64) -> f64 {
        meters * self.factor()
    }

    /// Convert a height in meters to a display value rounded to centimeter
    /// (or hundredth-of-a-foot) precision.
    pub fn display(&self, meters: f64) -> f64 {
        round_to(self.from_meters(meters), 2)
    }

    /// Convert a height expressed in this unit back to meters.
    pub fn to_meters(&self, value: f64) -> f64 {
        value / self.factor()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metric" => Ok(Unit::Meters),
            "ft" | "foot" | "feet" | "english" => Ok(Unit::Feet),
            other => Err(format!("unknown unit '{other}' (expected meters or feet)")),
        }
    }
}

/// Round half away from zero to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_conversion() {
        assert_eq!(Unit::Meters.display(0.753), 0.75);
        assert_eq!(Unit::Feet.display(1.0), 3.28);
        assert_eq!(Unit::Feet.display(-0.5), -1.64);
    }

    #[test]
    fn test_to_meters_inverts_from_meters() {
        let feet = Unit::Feet.from_meters(0.7);
        assert!((Unit::Feet.to_meters(feet) - 0.7).abs() < 1e-12);
        assert_eq!(Unit::Meters.to_meters(0.7), 0.7);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("feet".parse::<Unit>().unwrap(), Unit::Feet);
        assert_eq!("FT".parse::<Unit>().unwrap(), Unit::Feet);
        assert_eq!("meters".parse::<Unit>().unwrap(), Unit::Meters);
        assert!("furlongs".parse::<Unit>().is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.345678, 3), 2.346);
        assert_eq!(round_to(-0.125, 1), -0.1);
        assert_eq!(round_to(12.0, 0), 12.0);
    }
}
