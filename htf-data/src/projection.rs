use htf_core::error::HtfError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentile columns every projection table must carry.
pub const REQUIRED_PERCENTILES: [u32; 5] = [5, 17, 50, 83, 95];

/// Percentile columns over an integer index (year, pentad start or month).
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct PercentileTable {
    index: Vec<i32>,
    columns: BTreeMap<u32, Vec<f64>>,
}

impl PercentileTable {
    /// Build a table from string-keyed columns, checking that each column
    /// matches the index length and that the required percentiles exist.
    pub fn new(index: Vec<i32>, raw: &BTreeMap<String, Vec<f64>>) -> Result<Self, HtfError> {
        let columns = parse_columns(raw, index.len())?;
        if let Some(missing) = REQUIRED_PERCENTILES
            .iter()
            .find(|p| !columns.contains_key(p))
        {
            return Err(HtfError::InvalidPayload(format!(
                "missing {missing}th percentile"
            )));
        }
        Ok(Self { index, columns })
    }

    pub fn index(&self) -> &[i32] {
        &self.index
    }

    pub fn percentiles(&self) -> impl Iterator<Item = u32> + '_ {
        self.columns.keys().copied()
    }

    pub fn get(&self, at: i32, percentile: u32) -> Option<f64> {
        let row = self.index.iter().position(|i| *i == at)?;
        self.columns.get(&percentile).map(|column| column[row])
    }

    /// One percentile column as `(index, value)` pairs in index order.
    pub fn series(&self, percentile: u32) -> Option<Vec<(i32, f64)>> {
        let column = self.columns.get(&percentile)?;
        Some(self.index.iter().copied().zip(column.iter().copied()).collect())
    }

    pub fn row(&self, at: i32) -> Option<BTreeMap<u32, f64>> {
        let row = self.index.iter().position(|i| *i == at)?;
        Some(
            self.columns
                .iter()
                .map(|(p, column)| (*p, column[row]))
                .collect(),
        )
    }
}

/// Exceedance probabilities indexed by year, one column per day count N.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ExceedanceTable {
    years: Vec<i32>,
    /// P(at least N flooding days in the period).
    at_least: BTreeMap<u32, Vec<f64>>,
    /// P(the first period with at least N days is this year).
    first_year: BTreeMap<u32, Vec<f64>>,
}

impl ExceedanceTable {
    pub fn new(
        years: Vec<i32>,
        at_least: &BTreeMap<String, Vec<f64>>,
        first_year: &BTreeMap<String, Vec<f64>>,
    ) -> Result<Self, HtfError> {
        let at_least = parse_columns(at_least, years.len())?;
        let first_year = parse_columns(first_year, years.len())?;
        Ok(Self {
            years,
            at_least,
            first_year,
        })
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.at_least.keys().copied()
    }

    pub fn at_least(&self, n: u32) -> Option<&[f64]> {
        self.at_least.get(&n).map(Vec::as_slice)
    }

    pub fn first_year(&self, n: u32) -> Option<&[f64]> {
        self.first_year.get(&n).map(Vec::as_slice)
    }
}

fn parse_columns(
    raw: &BTreeMap<String, Vec<f64>>,
    rows: usize,
) -> Result<BTreeMap<u32, Vec<f64>>, HtfError> {
    raw.iter()
        .map(|(key, column)| {
            let key: u32 = key
                .trim()
                .parse()
                .map_err(|_| HtfError::InvalidPayload(format!("column '{key}' is not an integer")))?;
            if column.len() != rows {
                return Err(HtfError::InvalidPayload(format!(
                    "column {key}: {} rows, expected {rows}",
                    column.len()
                )));
            }
            Ok((key, column.clone()))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawAnnual {
    years: Vec<i32>,
    percentiles: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct RawPentad {
    pentads: Vec<i32>,
    percentiles: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct RawProbabilities {
    years: Vec<i32>,
    prob_at_least_n: BTreeMap<String, Vec<f64>>,
    prob_first_year: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct RawProjection {
    #[serde(default)]
    yoi: Option<[i32; 3]>,
    annual_percentiles: RawAnnual,
    /// Target year -> percentile -> twelve monthly values.
    #[serde(default)]
    monthly_percentiles: BTreeMap<i32, BTreeMap<String, Vec<f64>>>,
    pentad_mean_month_percentiles: RawPentad,
    pentad_max_season_percentiles: RawPentad,
    pentad_max_month_percentiles: RawPentad,
    annual_probabilities: RawProbabilities,
    monthly_probabilities: RawProbabilities,
}

/// Normalized ensemble projection for one (station, scenario, threshold).
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ProjectionTables {
    /// Inflection triple shipped with the payload, if one was computed.
    pub yoi: Option<[i32; 3]>,
    /// Flooding days per year by calendar year.
    pub annual: PercentileTable,
    /// Monthly climatology (index 1-12) per target year.
    pub monthly: BTreeMap<i32, PercentileTable>,
    pub pentad_mean_month: PercentileTable,
    pub pentad_max_season: PercentileTable,
    pub pentad_max_month: PercentileTable,
    pub annual_probabilities: ExceedanceTable,
    pub monthly_probabilities: ExceedanceTable,
}

impl ProjectionTables {
    pub fn from_json(json: &str) -> Result<Self, HtfError> {
        let raw: RawProjection = serde_json::from_str(json)?;
        let months: Vec<i32> = (1..=12).collect();
        let monthly = raw
            .monthly_percentiles
            .iter()
            .map(|(year, columns)| {
                PercentileTable::new(months.clone(), columns).map(|table| (*year, table))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let pentad = |p: &RawPentad| PercentileTable::new(p.pentads.clone(), &p.percentiles);
        let probabilities = |p: &RawProbabilities| {
            ExceedanceTable::new(p.years.clone(), &p.prob_at_least_n, &p.prob_first_year)
        };

        Ok(Self {
            yoi: raw.yoi,
            annual: PercentileTable::new(
                raw.annual_percentiles.years.clone(),
                &raw.annual_percentiles.percentiles,
            )?,
            monthly,
            pentad_mean_month: pentad(&raw.pentad_mean_month_percentiles)?,
            pentad_max_season: pentad(&raw.pentad_max_season_percentiles)?,
            pentad_max_month: pentad(&raw.pentad_max_month_percentiles)?,
            annual_probabilities: probabilities(&raw.annual_probabilities)?,
            monthly_probabilities: probabilities(&raw.monthly_probabilities)?,
        })
    }

    /// The 50th-percentile annual series the inflection search runs on.
    pub fn annual_median(&self) -> Vec<(i32, f64)> {
        self.annual.series(50).unwrap_or_default()
    }

    /// Monthly climatology for exactly `year`; `None` when that target year
    /// was not projected.
    pub fn monthly_for(&self, year: i32) -> Option<&PercentileTable> {
        self.monthly.get(&year)
    }
}

/// Normalize a projection payload. `None` input (no projection was
/// computed for this combination) is passed through as `None`.
pub fn load_projection(payload: Option<&str>) -> Result<Option<ProjectionTables>, HtfError> {
    match payload {
        Some(json) => ProjectionTables::from_json(json).map(Some),
        None => {
            log::info!("[HTF] projection: none for this combination");
            Ok(None)
        }
    }
}
