//! Numbers behind the narrative text: likelihood language, first-crossing
//! years, onset years, decade-change classes and pentad ranges.
//!
//! Everything is returned as structured values; phrasing is left to the
//! presentation layer.

use crate::projection::{ExceedanceTable, PercentileTable, ProjectionTables};
use htf_core::scenario::Scenario;
use serde::Serialize;

/// Cumulative probability a first crossing must reach.
pub const CROSSING_PROBABILITY: f64 = 0.25;

/// Day counts reported for annual first crossings.
pub const ANNUAL_CROSSING_COUNTS: [u32; 4] = [10, 20, 50, 100];

/// First sampled year and sampling step for first crossings.
pub const CROSSING_START_YEAR: i32 = 2030;
pub const CROSSING_STEP: i32 = 10;

/// At most this many crossing rows are reported.
pub const MAX_CROSSINGS: usize = 2;

/// "Likely" as a probability, the onset criterion.
pub const LIKELY_PROBABILITY: f64 = 0.66;

/// Days per year for routine and chronic flooding.
pub const ROUTINE_DAYS: u32 = 20;
pub const CHRONIC_DAYS: u32 = 50;

/// First year counted when accumulating first-occurrence probabilities.
pub const FIRST_OCCURRENCE_FROM: i32 = 2020;

/// A probability given either as a percent or a fraction.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Probability {
    Percent(f64),
    Fraction(f64),
}

impl Probability {
    pub fn percent(&self) -> f64 {
        match self {
            Probability::Percent(p) => *p,
            Probability::Fraction(p) => 100.0 * p,
        }
    }
}

/// IPCC calibrated likelihood language.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Likelihood {
    VirtuallyCertain,
    VeryLikely,
    Likely,
    AboutAsLikelyAsNot,
    Unlikely,
    VeryUnlikely,
    ExceptionallyUnlikely,
}

impl Likelihood {
    pub fn label(&self) -> &'static str {
        match self {
            Likelihood::VirtuallyCertain => "virtually certain",
            Likelihood::VeryLikely => "very likely",
            Likelihood::Likely => "likely",
            Likelihood::AboutAsLikelyAsNot => "about as likely as not",
            Likelihood::Unlikely => "unlikely",
            Likelihood::VeryUnlikely => "very unlikely",
            Likelihood::ExceptionallyUnlikely => "exceptionally unlikely",
        }
    }

    /// Percent-chance range quoted next to the label.
    pub fn range(&self) -> (u32, u32) {
        match self {
            Likelihood::VirtuallyCertain => (99, 100),
            Likelihood::VeryLikely => (90, 100),
            Likelihood::Likely => (66, 100),
            Likelihood::AboutAsLikelyAsNot => (33, 66),
            Likelihood::Unlikely => (0, 33),
            Likelihood::VeryUnlikely => (0, 10),
            Likelihood::ExceptionallyUnlikely => (0, 1),
        }
    }

    /// Range quoted for a bucket chosen by [`Likelihood::from_chance_probability`].
    /// Its middle buckets split at 67 rather than 66.
    pub fn chance_range(&self) -> (u32, u32) {
        match self {
            Likelihood::Likely => (67, 100),
            Likelihood::AboutAsLikelyAsNot => (33, 67),
            other => other.range(),
        }
    }

    /// Bucket the probability that an outcome occurs. Lower bounds are
    /// inclusive: exactly 66% is "likely".
    pub fn from_probability(probability: Probability) -> Self {
        let p = probability.percent();
        if p >= 99.0 {
            Likelihood::VirtuallyCertain
        } else if p >= 90.0 {
            Likelihood::VeryLikely
        } else if p >= 66.0 {
            Likelihood::Likely
        } else if p >= 33.0 {
            Likelihood::AboutAsLikelyAsNot
        } else if p >= 10.0 {
            Likelihood::Unlikely
        } else if p >= 1.0 {
            Likelihood::VeryUnlikely
        } else {
            Likelihood::ExceptionallyUnlikely
        }
    }

    /// Bucket the likelihood that a sea-level change contributed to a change
    /// in flooding days, given the probability the flooding change arose by
    /// chance. Bounds are exclusive: a 1% chance is already "very likely".
    pub fn from_chance_probability(chance: Probability) -> Self {
        let p = chance.percent();
        if p < 1.0 {
            Likelihood::VirtuallyCertain
        } else if p < 10.0 {
            Likelihood::VeryLikely
        } else if p < 33.0 {
            Likelihood::Likely
        } else if p < 67.0 {
            Likelihood::AboutAsLikelyAsNot
        } else if p < 90.0 {
            Likelihood::Unlikely
        } else if p < 99.0 {
            Likelihood::VeryUnlikely
        } else {
            Likelihood::ExceptionallyUnlikely
        }
    }
}

/// A sampled year by which at least `count` days in one period reach a
/// cumulative probability of [`CROSSING_PROBABILITY`].
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Crossing {
    pub year: i32,
    pub count: u32,
    pub probability: f64,
}

/// `1 - prod(1 - p)` over the rows of one at-least-N column.
pub fn cumulative_probability(p: &[f64]) -> Vec<f64> {
    let mut none_yet = 1.0;
    p.iter()
        .map(|p| {
            none_yet *= 1.0 - p;
            1.0 - none_yet
        })
        .collect()
}

/// First years at which a single period reaches each day count.
///
/// Years are sampled every decade from 2030. Rows where no count qualifies
/// are skipped and only the first two rows are kept; each row reports its
/// highest qualifying count and a count already reported is not repeated.
/// `counts` limits the columns considered (all columns when `None`).
pub fn first_crossings(table: &ExceedanceTable, counts: Option<&[u32]>) -> Vec<Crossing> {
    let columns: Vec<(u32, Vec<f64>)> = table
        .counts()
        .filter(|n| counts.map_or(true, |wanted| wanted.contains(n)))
        .filter_map(|n| table.at_least(n).map(|p| (n, cumulative_probability(p))))
        .collect();
    let Some(last_year) = table.years().last().copied() else {
        return Vec::new();
    };

    let mut crossings: Vec<Crossing> = Vec::new();
    let mut rows = 0;
    for year in (CROSSING_START_YEAR..=last_year).step_by(CROSSING_STEP as usize) {
        if rows == MAX_CROSSINGS {
            break;
        }
        let Some(row) = table.years().iter().position(|y| *y == year) else {
            continue;
        };
        let best = columns
            .iter()
            .filter(|(_, cumulative)| cumulative[row] >= CROSSING_PROBABILITY)
            .max_by_key(|(n, _)| *n);
        let Some((count, cumulative)) = best else {
            continue;
        };
        rows += 1;
        if crossings.iter().all(|c| c.count != *count) {
            crossings.push(Crossing {
                year,
                count: *count,
                probability: cumulative[row],
            });
        }
    }
    crossings
}

/// When an annual count of at least N days becomes likely.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(tag = "kind", content = "year", rename_all = "snake_case")]
pub enum Onset {
    /// Already likely in the first projected year.
    Already,
    Beginning(i32),
    /// Still not likely by the given final year.
    NotBy(i32),
}

/// Onset of at least `n` flooding days per year at the "likely" level.
pub fn onset(table: &ExceedanceTable, n: u32) -> Option<Onset> {
    let p = table.at_least(n)?;
    let years = table.years();
    let (first, last) = (*p.first()?, *p.last()?);
    if first >= LIKELY_PROBABILITY {
        return Some(Onset::Already);
    }
    if last < LIKELY_PROBABILITY {
        return Some(Onset::NotBy(*years.last()?));
    }
    let row = p.iter().position(|v| *v >= LIKELY_PROBABILITY)?;
    Some(Onset::Beginning(years[row]))
}

/// First year the accumulated first-occurrence probability of `n` days,
/// counted from 2020, exceeds `p`.
pub fn cumulative_first_year(table: &ExceedanceTable, n: u32, p: f64) -> Option<i32> {
    let first_year = table.first_year(n)?;
    let mut total = 0.0;
    table
        .years()
        .iter()
        .zip(first_year)
        .filter(|(year, _)| **year >= FIRST_OCCURRENCE_FROM)
        .find_map(|(year, prob)| {
            total += prob;
            (total > p).then_some(*year)
        })
}

/// First year the probability of at least `n` days reaches one half.
pub fn expected_year(table: &ExceedanceTable, n: u32) -> Option<i32> {
    let p = table.at_least(n)?;
    table
        .years()
        .iter()
        .zip(p)
        .find(|(_, p)| **p >= 0.5)
        .map(|(year, _)| *year)
}

/// First year the median annual count reaches `days`.
pub fn first_year_median_at_least(annual: &PercentileTable, days: f64) -> Option<i32> {
    annual
        .series(50)?
        .into_iter()
        .find(|(_, median)| *median >= days)
        .map(|(year, _)| year)
}

/// Qualifier for multiplicative change language.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Exactly,
    MoreThan,
    Almost,
}

/// How flooding days change from one decade to the next.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeClass {
    NoChange,
    /// The earlier count was zero, so no percentage exists.
    FromZero { increase: bool },
    Decrease { percent: f64 },
    Increase { percent: f64 },
    /// Doubles, triples or quadruples.
    Multiplied { times: u32, qualifier: Qualifier },
    /// "Increases by a factor of N" for larger changes.
    Factor { factor: u32, qualifier: Qualifier },
}

/// Classify the change from `c1` to `c2` by `100 * (c2 - c1) / c1`.
pub fn classify_change(c1: f64, c2: f64) -> ChangeClass {
    if c2 == c1 {
        return ChangeClass::NoChange;
    }
    if c1 == 0.0 {
        return ChangeClass::FromZero { increase: c2 > 0.0 };
    }
    let dpct = 100.0 * (c2 - c1) / c1;
    if dpct < 0.0 {
        return ChangeClass::Decrease { percent: -dpct };
    }
    if dpct < 100.0 {
        return ChangeClass::Increase { percent: dpct };
    }
    let around = |exact: f64| {
        if dpct == exact {
            Qualifier::Exactly
        } else if dpct > exact {
            Qualifier::MoreThan
        } else {
            Qualifier::Almost
        }
    };
    if dpct < 175.0 {
        ChangeClass::Multiplied {
            times: 2,
            qualifier: around(100.0),
        }
    } else if dpct < 275.0 {
        ChangeClass::Multiplied {
            times: 3,
            qualifier: around(200.0),
        }
    } else if dpct < 375.0 {
        ChangeClass::Multiplied {
            times: 4,
            qualifier: around(300.0),
        }
    } else {
        let factor = (dpct / 100.0).floor() as u32;
        let remainder = dpct % 100.0;
        if remainder == 0.0 {
            ChangeClass::Factor {
                factor,
                qualifier: Qualifier::Exactly,
            }
        } else if remainder <= 75.0 {
            ChangeClass::Factor {
                factor,
                qualifier: Qualifier::MoreThan,
            }
        } else {
            ChangeClass::Factor {
                factor: factor + 1,
                qualifier: Qualifier::Almost,
            }
        }
    }
}

/// Flooding days a pentad is likely to see, from the 17th and 83rd
/// percentiles.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DaysRange {
    Zero,
    OneOrFewer,
    Between { low: f64, high: f64 },
}

impl DaysRange {
    fn from_bounds(low: f64, high: f64) -> Self {
        if high > 1.0 {
            DaysRange::Between { low, high }
        } else if high == 1.0 {
            DaysRange::OneOrFewer
        } else {
            DaysRange::Zero
        }
    }
}

pub const LIKELY_RANGE: (u32, u32) = (17, 83);

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct PentadOutlook {
    pub pentad: i32,
    pub label: String,
    pub mean_month: DaysRange,
    pub max_month: DaysRange,
    /// 83rd percentile of the most extreme month.
    pub max_month_high: f64,
}

/// Likely range of average and most-extreme-month flooding days in a pentad.
pub fn pentad_outlook(tables: &ProjectionTables, pentad: i32) -> Option<PentadOutlook> {
    let (lo, hi) = LIKELY_RANGE;
    let mean = &tables.pentad_mean_month;
    let max = &tables.pentad_max_month;
    let max_month_high = max.get(pentad, hi)?;
    Some(PentadOutlook {
        pentad,
        label: format!("{}–{}", pentad, pentad + 4),
        mean_month: DaysRange::from_bounds(mean.get(pentad, lo)?, mean.get(pentad, hi)?),
        max_month: DaysRange::from_bounds(max.get(pentad, lo)?, max_month_high),
        max_month_high,
    })
}

/// First pentad whose most extreme month likely reaches `days`.
pub fn first_pentad_max_month_at_least(table: &PercentileTable, days: f64) -> Option<i32> {
    table
        .series(LIKELY_RANGE.1)?
        .into_iter()
        .find(|(_, high)| *high >= days)
        .map(|(pentad, _)| pentad)
}

/// Extreme-month outlook for a scenario.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtremeMonths {
    /// Months with five or more flooding days do not become likely.
    NotLikely { by: i32 },
    Pentad(PentadOutlook),
}

/// Months with this many days mark the start of severe extreme months.
pub const SEVERE_MONTH_DAYS: f64 = 5.0;

/// Days in the most extreme month that select the reported pentad.
pub const REPORTED_MONTH_DAYS: f64 = 10.0;

/// Outlook for the final pentad of the scenario, or for the first pentad
/// whose extreme month likely reaches ten days.
pub fn extreme_months(tables: &ProjectionTables, scenario: Scenario) -> Option<ExtremeMonths> {
    let last_pentad = match scenario {
        Scenario::ObservedTrajectory => 2050,
        _ => 2095,
    };
    let last = pentad_outlook(tables, last_pentad)?;
    if last.max_month_high < SEVERE_MONTH_DAYS {
        return Some(ExtremeMonths::NotLikely {
            by: scenario.final_year(),
        });
    }
    let reported = first_pentad_max_month_at_least(&tables.pentad_max_month, REPORTED_MONTH_DAYS)
        .and_then(|pentad| pentad_outlook(tables, pentad))
        .unwrap_or(last);
    Some(ExtremeMonths::Pentad(reported))
}

/// Numbers for the projection narrative of one selection.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ProjectionNarrative {
    pub routine_onset: Option<Onset>,
    pub chronic_onset: Option<Onset>,
    pub annual_crossings: Vec<Crossing>,
    pub monthly_crossings: Vec<Crossing>,
    pub extreme_months: Option<ExtremeMonths>,
    pub decade_before: Option<ChangeClass>,
    pub decade_after: Option<ChangeClass>,
}

/// Gather every narrative derivation for a projection. `yoi_counts` are the
/// median counts at `[yoi - 10, yoi, yoi + 10]` when an inflection exists.
pub fn projection_narrative(
    tables: &ProjectionTables,
    scenario: Scenario,
    yoi_counts: Option<[f64; 3]>,
) -> ProjectionNarrative {
    let annual = &tables.annual_probabilities;
    ProjectionNarrative {
        routine_onset: onset(annual, ROUTINE_DAYS),
        chronic_onset: onset(annual, CHRONIC_DAYS),
        annual_crossings: first_crossings(annual, Some(&ANNUAL_CROSSING_COUNTS)),
        monthly_crossings: first_crossings(&tables.monthly_probabilities, None),
        extreme_months: extreme_months(tables, scenario),
        decade_before: yoi_counts.map(|c| classify_change(c[0], c[1])),
        decade_after: yoi_counts.map(|c| classify_change(c[1], c[2])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::fixtures::PROJECTION_JSON;
    use std::collections::BTreeMap;

    fn exceedance(years: Vec<i32>, columns: &[(&str, Vec<f64>)]) -> ExceedanceTable {
        let at_least: BTreeMap<String, Vec<f64>> = columns
            .iter()
            .map(|(n, p)| (n.to_string(), p.clone()))
            .collect();
        ExceedanceTable::new(years, &at_least, &at_least).unwrap()
    }

    #[test]
    fn test_first_crossing_exact_index() {
        let years: Vec<i32> = (2030..=2100).step_by(10).collect();
        assert_eq!(years.len(), 8);
        let table = exceedance(years, &[("10", vec![0.05; 8])]);
        let crossings = first_crossings(&table, Some(&ANNUAL_CROSSING_COUNTS));
        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].year, 2080);
        assert_eq!(crossings[0].count, 10);
        assert!((crossings[0].probability - (1.0 - 0.95f64.powi(6))).abs() < 1e-12);
    }

    #[test]
    fn test_first_crossing_reports_highest_count_per_row() {
        let years: Vec<i32> = (2020..=2060).collect();
        let rows = years.len();
        let table = exceedance(
            years,
            &[
                ("10", vec![0.5; rows]),
                ("20", vec![0.05; rows]),
                ("50", vec![0.0; rows]),
            ],
        );
        let crossings = first_crossings(&table, Some(&ANNUAL_CROSSING_COUNTS));
        // by 2030 both 10 and 20 days qualify; 2040 repeats 20 and is dropped
        assert_eq!(
            crossings.iter().map(|c| (c.year, c.count)).collect::<Vec<_>>(),
            vec![(2030, 20)]
        );
    }

    #[test]
    fn test_no_crossing() {
        let years: Vec<i32> = (2020..=2100).collect();
        let rows = years.len();
        let table = exceedance(years, &[("10", vec![0.0; rows])]);
        assert!(first_crossings(&table, None).is_empty());
    }

    #[test]
    fn test_likelihood_boundaries_are_lower_inclusive() {
        use Likelihood::*;
        let cases = [
            (100.0, VirtuallyCertain),
            (99.0, VirtuallyCertain),
            (98.9, VeryLikely),
            (90.0, VeryLikely),
            (66.0, Likely),
            (65.9, AboutAsLikelyAsNot),
            (33.0, AboutAsLikelyAsNot),
            (10.0, Unlikely),
            (1.0, VeryUnlikely),
            (0.5, ExceptionallyUnlikely),
        ];
        for (p, expected) in cases {
            assert_eq!(Likelihood::from_probability(Probability::Percent(p)), expected, "{p}");
        }
        assert_eq!(Likelihood::from_probability(Probability::Fraction(0.66)), Likely);
        assert_eq!(Likely.range(), (66, 100));
        assert_eq!(AboutAsLikelyAsNot.label(), "about as likely as not");
    }

    #[test]
    fn test_chance_likelihood_is_strict() {
        use Likelihood::*;
        assert_eq!(Likelihood::from_chance_probability(Probability::Percent(0.3)), VirtuallyCertain);
        assert_eq!(Likelihood::from_chance_probability(Probability::Percent(1.0)), VeryLikely);
        assert_eq!(Likelihood::from_chance_probability(Probability::Percent(33.0)), AboutAsLikelyAsNot);
        assert_eq!(Likelihood::from_chance_probability(Probability::Percent(67.0)), Unlikely);
        assert_eq!(
            Likelihood::from_chance_probability(Probability::Fraction(0.995)),
            ExceptionallyUnlikely
        );
    }

    #[test]
    fn test_chance_ranges_match_chance_buckets() {
        use Likelihood::*;
        assert_eq!(Likely.chance_range(), (67, 100));
        assert_eq!(AboutAsLikelyAsNot.chance_range(), (33, 67));
        assert_eq!(VeryLikely.chance_range(), VeryLikely.range());
        assert_eq!(Unlikely.chance_range(), (0, 33));
        // a 20% chance lands in "likely", whose quoted range is 67-100
        let bucket = Likelihood::from_chance_probability(Probability::Percent(20.0));
        assert_eq!(bucket, Likely);
        assert_eq!(bucket.chance_range().0, 100 - 33);
    }

    #[test]
    fn test_onset() {
        let years = vec![2020, 2030, 2040, 2050];
        let table = exceedance(
            years,
            &[
                ("20", vec![0.1, 0.5, 0.66, 0.9]),
                ("50", vec![0.0, 0.1, 0.2, 0.3]),
                ("10", vec![0.7, 0.8, 0.9, 1.0]),
            ],
        );
        assert_eq!(onset(&table, 20), Some(Onset::Beginning(2040)));
        assert_eq!(onset(&table, 50), Some(Onset::NotBy(2050)));
        assert_eq!(onset(&table, 10), Some(Onset::Already));
        assert_eq!(onset(&table, 100), None);
    }

    #[test]
    fn test_cumulative_first_year_and_expected() {
        let tables = ProjectionTables::from_json(PROJECTION_JSON).unwrap();
        let annual = &tables.annual_probabilities;
        // running sums 0.1, 0.25, 0.45, 0.6, 0.7
        assert_eq!(cumulative_first_year(annual, 10, 0.3), Some(2022));
        assert_eq!(cumulative_first_year(annual, 10, 0.5), Some(2023));
        assert_eq!(cumulative_first_year(annual, 10, 0.99), None);
        assert_eq!(expected_year(annual, 10), Some(2024));
        assert_eq!(expected_year(annual, 20), None);
        assert_eq!(first_year_median_at_least(&tables.annual, 5.0), Some(2023));
    }

    #[test]
    fn test_classify_change() {
        use ChangeClass::*;
        assert_eq!(classify_change(4.0, 4.0), NoChange);
        assert_eq!(classify_change(0.0, 0.0), NoChange);
        assert_eq!(classify_change(0.0, 3.0), FromZero { increase: true });
        assert_eq!(classify_change(10.0, 5.0), Decrease { percent: 50.0 });
        assert_eq!(classify_change(10.0, 15.0), Increase { percent: 50.0 });
        assert_eq!(
            classify_change(10.0, 20.0),
            Multiplied { times: 2, qualifier: Qualifier::Exactly }
        );
        assert_eq!(
            classify_change(10.0, 27.0),
            Multiplied { times: 2, qualifier: Qualifier::MoreThan }
        );
        assert_eq!(
            classify_change(10.0, 28.0),
            Multiplied { times: 3, qualifier: Qualifier::Almost }
        );
        assert_eq!(
            classify_change(10.0, 30.0),
            Multiplied { times: 3, qualifier: Qualifier::Exactly }
        );
        assert_eq!(
            classify_change(10.0, 38.0),
            Multiplied { times: 4, qualifier: Qualifier::Almost }
        );
        assert_eq!(
            classify_change(10.0, 45.0),
            Multiplied { times: 4, qualifier: Qualifier::MoreThan }
        );
        assert_eq!(classify_change(10.0, 50.0), Factor { factor: 4, qualifier: Qualifier::Exactly });
        assert_eq!(classify_change(10.0, 55.0), Factor { factor: 4, qualifier: Qualifier::MoreThan });
        assert_eq!(classify_change(10.0, 59.0), Factor { factor: 5, qualifier: Qualifier::Almost });
    }

    #[test]
    fn test_pentad_outlook() {
        let tables = ProjectionTables::from_json(PROJECTION_JSON).unwrap();
        let outlook = pentad_outlook(&tables, 2020).unwrap();
        assert_eq!(outlook.label, "2020–2024");
        assert_eq!(outlook.mean_month, DaysRange::OneOrFewer);
        assert_eq!(outlook.max_month, DaysRange::Between { low: 2.0, high: 6.0 });
        assert_eq!(first_pentad_max_month_at_least(&tables.pentad_max_month, 10.0), Some(2025));
        assert_eq!(pentad_outlook(&tables, 2095), None);
    }

    #[test]
    fn test_projection_narrative() {
        let tables = ProjectionTables::from_json(PROJECTION_JSON).unwrap();
        let narrative = projection_narrative(&tables, Scenario::Int, Some([2.0, 4.0, 12.0]));
        assert_eq!(narrative.routine_onset, Some(Onset::NotBy(2024)));
        assert_eq!(narrative.chronic_onset, None);
        assert_eq!(
            narrative.decade_before,
            Some(ChangeClass::Multiplied { times: 2, qualifier: Qualifier::Exactly })
        );
        assert_eq!(
            narrative.decade_after,
            Some(ChangeClass::Multiplied { times: 3, qualifier: Qualifier::Exactly })
        );
        // the fixture has no pentad for the end of the century
        assert_eq!(narrative.extreme_months, None);
    }
}
