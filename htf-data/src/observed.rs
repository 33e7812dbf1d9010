use chrono::{Datelike, NaiveDate};
use htf_core::daily::{DailyRecord, ValidDay};
use htf_core::date_range::DateRange;
use htf_core::error::HtfError;
use htf_core::threshold::ThresholdSelection;
use htf_core::unit::{round_to, Unit};
use htf_utils::dates::meteorological_year_for_date;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A day whose maximum exceeded the threshold, height in display units.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct FloodingDay {
    pub date: NaiveDate,
    pub height: f64,
}

/// Precomputed comparison of the first and last ten years of a record.
/// Consumed as published; nothing here recomputes it.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LongTermChange {
    pub first_10_span: [i32; 2],
    pub last_10_span: [i32; 2],
    /// Change in mean sea level between the periods, meters.
    pub msl_change: f64,
    pub f10_htf: f64,
    pub f10_htf_pyr: f64,
    pub l10_htf: f64,
    pub l10_htf_pyr: f64,
    pub htf_pyr_change: f64,
    /// Percent chance the change in flooding days arose without the change
    /// in sea level.
    pub htf_pyr_diff_prob: f64,
}

impl LongTermChange {
    pub fn first_period_label(&self) -> String {
        format!("{}–{}", self.first_10_span[0], self.first_10_span[1])
    }

    pub fn last_period_label(&self) -> String {
        format!("{}–{}", self.last_10_span[0], self.last_10_span[1])
    }

    pub fn msl_change_in(&self, unit: Unit) -> f64 {
        unit.display(self.msl_change)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnnualSeries {
    pub years: Vec<i32>,
    pub counts: Vec<Option<u32>>,
}

/// Observed flood-count payload as stored per (station, threshold key).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ObservedPayload {
    pub annual: AnnualSeries,
    /// Calendar year -> twelve monthly counts.
    pub monthly: BTreeMap<i32, Vec<u32>>,
    pub climatology: Vec<u32>,
    #[serde(default)]
    pub long_term: Option<LongTermChange>,
}

impl ObservedPayload {
    pub fn parse(json: &str) -> Result<Self, HtfError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A (calendar year, month) pair, month 1-based.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for MonthRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .unwrap_or(&"?");
        write!(f, "{} {}", name, self.year)
    }
}

/// Highest count and every period that reached it.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct MaxCount<T> {
    pub count: u32,
    pub when: Vec<T>,
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ClimatologyMonth {
    pub month: u32,
    pub name: String,
    pub total: u32,
    pub percent: u32,
}

/// Flood-day counts by meteorological year, by (calendar year, month) and
/// by month of year.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct FloodCounts {
    /// `None` marks a meteorological year with no valid observation.
    pub annual: BTreeMap<i32, Option<u32>>,
    pub monthly: BTreeMap<i32, [u32; 12]>,
    pub climatology: [u32; 12],
}

impl FloodCounts {
    /// Count exceedances of `threshold` over fully observed days. Heights and
    /// threshold must share a unit.
    pub fn from_days(days: &[ValidDay], threshold: f64) -> (Vec<FloodingDay>, FloodCounts) {
        let mut counts = FloodCounts::default();
        let (Some(first), Some(last)) = (days.first(), days.last()) else {
            return (Vec::new(), counts);
        };

        for year in meteorological_year_for_date(&first.date)..=meteorological_year_for_date(&last.date) {
            counts.annual.insert(year, None);
        }
        for year in first.date.year()..=last.date.year() {
            counts.monthly.insert(year, [0; 12]);
        }

        let mut flooding_days = Vec::new();
        for day in days {
            let annual = counts
                .annual
                .entry(meteorological_year_for_date(&day.date))
                .or_insert(None);
            let annual = annual.get_or_insert(0);
            if day.max > threshold {
                *annual += 1;
                let month_index = day.date.month0() as usize;
                if let Some(months) = counts.monthly.get_mut(&day.date.year()) {
                    months[month_index] += 1;
                }
                counts.climatology[month_index] += 1;
                flooding_days.push(FloodingDay {
                    date: day.date,
                    height: day.max,
                });
            }
        }
        (flooding_days, counts)
    }

    /// Counts from a precomputed observed payload.
    pub fn from_payload(payload: &ObservedPayload) -> Result<FloodCounts, HtfError> {
        let annual_series = &payload.annual;
        if annual_series.years.len() != annual_series.counts.len() {
            return Err(HtfError::InvalidPayload(format!(
                "annual: {} years but {} counts",
                annual_series.years.len(),
                annual_series.counts.len()
            )));
        }
        let annual = annual_series
            .years
            .iter()
            .copied()
            .zip(annual_series.counts.iter().copied())
            .collect();

        let mut monthly = BTreeMap::new();
        for (year, months) in payload.monthly.iter() {
            let months: [u32; 12] = months.as_slice().try_into().map_err(|_| {
                HtfError::InvalidPayload(format!("monthly {year}: expected 12 counts"))
            })?;
            monthly.insert(*year, months);
        }

        let climatology: [u32; 12] = payload
            .climatology
            .as_slice()
            .try_into()
            .map_err(|_| HtfError::InvalidPayload("climatology: expected 12 totals".to_string()))?;

        Ok(FloodCounts {
            annual,
            monthly,
            climatology,
        })
    }

    pub fn to_payload(&self, long_term: Option<LongTermChange>) -> ObservedPayload {
        ObservedPayload {
            annual: AnnualSeries {
                years: self.annual.keys().copied().collect(),
                counts: self.annual.values().copied().collect(),
            },
            monthly: self
                .monthly
                .iter()
                .map(|(year, months)| (*year, months.to_vec()))
                .collect(),
            climatology: self.climatology.to_vec(),
            long_term,
        }
    }

    pub fn climatology_months(&self) -> Vec<ClimatologyMonth> {
        let percents = climatology_percent(&self.climatology);
        self.climatology
            .iter()
            .zip(percents)
            .enumerate()
            .map(|(i, (total, percent))| ClimatologyMonth {
                month: i as u32 + 1,
                name: MONTH_NAMES[i].to_string(),
                total: *total,
                percent,
            })
            .collect()
    }

    /// Highest annual count among observed years and the years tying it.
    pub fn annual_max(&self) -> Option<MaxCount<i32>> {
        let count = self.annual.values().flatten().copied().max()?;
        let when = self
            .annual
            .iter()
            .filter(|(_, c)| **c == Some(count))
            .map(|(year, _)| *year)
            .collect();
        Some(MaxCount { count, when })
    }

    /// Highest single-month count and the months tying it; `None` when no
    /// month had a flooding day.
    pub fn monthly_max(&self) -> Option<MaxCount<MonthRef>> {
        let count = self.monthly.values().flat_map(|m| m.iter()).copied().max()?;
        if count == 0 {
            return None;
        }
        let when = self
            .monthly
            .iter()
            .flat_map(|(year, months)| {
                months
                    .iter()
                    .enumerate()
                    .filter(move |(_, c)| **c == count)
                    .map(move |(i, _)| MonthRef {
                        year: *year,
                        month: i as u32 + 1,
                    })
            })
            .collect();
        Some(MaxCount { count, when })
    }
}

/// Integer percent of the total for each month; all zero when nothing
/// flooded. Percentages are truncated toward zero, not rounded, so they
/// need not sum to 100.
pub fn climatology_percent(totals: &[u32; 12]) -> [u32; 12] {
    let total: u32 = totals.iter().sum();
    if total == 0 {
        return [0; 12];
    }
    totals.map(|t| 100 * t / total)
}

/// How often flooding days happen historically.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceCategory {
    /// At least once a year on average.
    Common,
    /// At least once a decade.
    Infrequent,
    Rare,
}

impl OccurrenceCategory {
    pub fn from_rate(floods_per_year: f64) -> Self {
        if floods_per_year >= 1.0 {
            OccurrenceCategory::Common
        } else if floods_per_year >= 0.1 {
            OccurrenceCategory::Infrequent
        } else {
            OccurrenceCategory::Rare
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ObservedSummary {
    pub first_obs: Option<NaiveDate>,
    pub last_obs: Option<NaiveDate>,
    pub record_length_years: f64,
    /// Record length rounded to whole years, as quoted in text.
    pub record_length: i64,
    /// Calendar days from first to last observation, inclusive.
    pub span_days: usize,
    /// Days inside the span without a valid min/max pair.
    pub missing_days: usize,
    /// Uninterrupted stretches of valid observations.
    pub observed_runs: Vec<DateRange>,
    pub max_observed: Option<f64>,
    pub flood_count: usize,
    pub floods_per_year: f64,
    pub occurrence: OccurrenceCategory,
    pub climatology: Vec<ClimatologyMonth>,
    pub annual_max: Option<MaxCount<i32>>,
    pub monthly_max: Option<MaxCount<MonthRef>>,
    pub long_term: Option<LongTermChange>,
}

/// Everything derived from a daily record for one threshold.
#[derive(Debug, PartialEq, Clone)]
pub struct ObservedAnalysis {
    pub unit: Unit,
    pub threshold: f64,
    pub flooding_days: Vec<FloodingDay>,
    pub counts: FloodCounts,
    pub summary: ObservedSummary,
}

/// Count observed flooding days for a threshold.
///
/// The record is converted to `unit` (partial rows masked) before counting,
/// and the threshold is compared at its canonical display height.
pub fn analyze_observed(
    record: &DailyRecord,
    selection: &ThresholdSelection,
    unit: Unit,
    long_term: Option<LongTermChange>,
) -> ObservedAnalysis {
    let display = record.to_unit(unit);
    let threshold = selection.display_height(unit);
    let days = display.valid_days();
    let (flooding_days, counts) = FloodCounts::from_days(&days, threshold);

    let span = display.observed_span();
    let record_length_years = display.record_length_years();
    let floods_per_year = if record_length_years > 0.0 {
        round_to(flooding_days.len() as f64 / record_length_years, 1)
    } else {
        0.0
    };
    let observed_runs = display.run_spans();
    let missing_days = display.missing_dates().len();
    log::info!(
        "[HTF] observed: {} flooding days above {} {} over {:.1} years",
        flooding_days.len(),
        threshold,
        unit,
        record_length_years
    );
    if missing_days > 0 {
        log::info!(
            "[HTF] observed: {} missing days across {} runs",
            missing_days,
            observed_runs.len()
        );
    }

    let summary = ObservedSummary {
        first_obs: span.map(|s| s.start()),
        last_obs: span.map(|s| s.end()),
        record_length_years,
        record_length: record_length_years.round() as i64,
        span_days: span.map(|s| s.num_days()).unwrap_or(0),
        missing_days,
        observed_runs,
        max_observed: display.max_observed(),
        flood_count: flooding_days.len(),
        floods_per_year,
        occurrence: OccurrenceCategory::from_rate(floods_per_year),
        climatology: counts.climatology_months(),
        annual_max: counts.annual_max(),
        monthly_max: counts.monthly_max(),
        long_term,
    };

    ObservedAnalysis {
        unit,
        threshold,
        flooding_days,
        counts,
        summary,
    }
}
