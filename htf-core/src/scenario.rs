use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sea-level-rise trajectories from the 2022 Interagency Task Force report,
/// plus the extrapolated observed trajectory.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[serde(rename = "traj")]
    ObservedTrajectory,
    Low,
    IntLow,
    #[default]
    Int,
    IntHigh,
    High,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::ObservedTrajectory,
        Scenario::Low,
        Scenario::IntLow,
        Scenario::Int,
        Scenario::IntHigh,
        Scenario::High,
    ];

    /// Identifier used in data file paths ("int_high").
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::ObservedTrajectory => "traj",
            Scenario::Low => "low",
            Scenario::IntLow => "int_low",
            Scenario::Int => "int",
            Scenario::IntHigh => "int_high",
            Scenario::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::ObservedTrajectory => "Observed Trajectory",
            Scenario::Low => "Low",
            Scenario::IntLow => "Intermediate Low",
            Scenario::Int => "Intermediate",
            Scenario::IntHigh => "Intermediate High",
            Scenario::High => "High",
        }
    }

    /// The observed trajectory is only extrapolated to mid-century.
    pub fn final_year(&self) -> i32 {
        match self {
            Scenario::ObservedTrajectory => 2050,
            _ => 2100,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    /// Accepts both the file form (`int_high`) and the URL form (`int-high`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.as_str() == normalized)
            .ok_or_else(|| format!("unknown scenario '{s}'"))
    }
}
