use crate::date_range::DateRange;
use crate::error::HtfError;
use crate::unit::{round_to, Unit};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use htf_utils::dates::{parse_date_prefix, record_length_years};
use serde::{Deserialize, Serialize};

/// One row of a daily min/max record. Either bound may be missing.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DailyObservation {
    /// Both bounds present.
    pub fn as_valid(&self) -> Option<ValidDay> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(ValidDay {
                date: self.date,
                min,
                max,
            }),
            _ => None,
        }
    }
}

/// A fully observed day.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct ValidDay {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
}

/// Date-ordered daily min/max water levels for one station.
///
/// Gaps stay gaps: nothing here interpolates across a missing day.
#[derive(Debug, PartialEq, Clone)]
pub struct DailyRecord {
    unit: Unit,
    observations: Vec<DailyObservation>,
}

impl DailyRecord {
    /// A record in meters above MHHW. Rows are sorted by date.
    pub fn new(mut observations: Vec<DailyObservation>) -> Self {
        observations.sort_by_key(|obs| obs.date);
        Self {
            unit: Unit::Meters,
            observations,
        }
    }

    /// Parse a `date,min,max` CSV. The first column is the date (a time
    /// suffix is ignored); `min` and `max` are located by header name.
    pub fn parse_csv(csv_object: &str) -> Result<Self, HtfError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .from_reader(csv_object.as_bytes());
        let headers = rdr.headers()?.clone();
        let min_col = column_index(&headers, "min")?;
        let max_col = column_index(&headers, "max")?;

        let mut observations: Vec<DailyObservation> = Vec::new();
        for row in rdr.records() {
            let record = row?;
            let raw_date = record.get(0).unwrap_or("");
            let date = parse_date_prefix(raw_date)
                .map_err(|e| HtfError::InvalidPayload(e.to_string()))?;
            observations.push(DailyObservation {
                date,
                min: parse_level(record.get(min_col)),
                max: parse_level(record.get(max_col)),
            });
        }
        log::debug!("[HTF] daily: parsed {} rows", observations.len());
        Ok(Self::new(observations))
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn observations(&self) -> &[DailyObservation] {
        &self.observations
    }

    /// The record in a display unit. A row missing either bound loses both,
    /// then feet values are rounded to 3 decimals.
    pub fn to_unit(&self, unit: Unit) -> DailyRecord {
        let observations = self
            .observations
            .iter()
            .map(|obs| match obs.as_valid() {
                Some(day) => DailyObservation {
                    date: day.date,
                    min: Some(convert(day.min, self.unit, unit)),
                    max: Some(convert(day.max, self.unit, unit)),
                },
                None => DailyObservation {
                    date: obs.date,
                    min: None,
                    max: None,
                },
            })
            .collect();
        DailyRecord { unit, observations }
    }

    /// Fully observed days in date order.
    pub fn valid_days(&self) -> Vec<ValidDay> {
        self.observations
            .iter()
            .filter_map(DailyObservation::as_valid)
            .collect()
    }

    /// First and last fully observed dates.
    pub fn observed_span(&self) -> Option<DateRange> {
        let mut valid = self.observations.iter().filter_map(DailyObservation::as_valid);
        let first = valid.next()?;
        let last = valid.last().unwrap_or(first);
        Some(DateRange(first.date, last.date))
    }

    /// Years between the first and last valid observation; 0 for an empty
    /// record.
    pub fn record_length_years(&self) -> f64 {
        self.observed_span()
            .map(|span| record_length_years(&span.start(), &span.end()))
            .unwrap_or(0.0)
    }

    /// Highest daily maximum on record.
    pub fn max_observed(&self) -> Option<f64> {
        self.observations
            .iter()
            .filter_map(DailyObservation::as_valid)
            .map(|day| day.max)
            .reduce(f64::max)
    }

    /// Split the valid days wherever consecutive dates are more than one day
    /// apart.
    pub fn contiguous_runs(&self) -> Vec<Vec<ValidDay>> {
        let mut runs: Vec<Vec<ValidDay>> = Vec::new();
        for day in self.valid_days() {
            let adjacent = runs
                .last()
                .and_then(|run| run.last())
                .is_some_and(|prev| (day.date - prev.date).num_days() <= 1);
            match runs.last_mut() {
                Some(run) if adjacent => run.push(day),
                _ => runs.push(vec![day]),
            }
        }
        runs
    }

    /// First and last date of each contiguous run.
    pub fn run_spans(&self) -> Vec<DateRange> {
        self.contiguous_runs()
            .iter()
            .filter_map(|run| Some(DateRange(run.first()?.date, run.last()?.date)))
            .collect()
    }

    /// Calendar days inside the observed span with no valid observation.
    pub fn missing_dates(&self) -> Vec<NaiveDate> {
        let Some(span) = self.observed_span() else {
            return Vec::new();
        };
        let valid: std::collections::HashSet<NaiveDate> =
            self.valid_days().iter().map(|day| day.date).collect();
        span.filter(|date| !valid.contains(date)).collect()
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, HtfError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| HtfError::InvalidPayload(format!("daily record has no '{name}' column")))
}

fn parse_level(field: Option<&str>) -> Option<f64> {
    field
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    if from == to {
        return value;
    }
    round_to(to.from_meters(from.to_meters(value)), 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_DATA: &str = "\
date,min,max
2021-06-13,-1.10,0.41
2021-06-14 00:00:00,-1.05,
2021-06-15,-0.98,0.75
2021-06-16,-1.01,0.52
2021-06-19,-1.20,0.30
2021-06-20,NaN,NaN
2021-06-21,-1.15,0.33
";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_csv() {
        let record = DailyRecord::parse_csv(CSV_DATA).unwrap();
        assert_eq!(record.observations().len(), 7);
        assert_eq!(record.observations()[1].date, ymd(2021, 6, 14));
        assert_eq!(record.observations()[1].min, Some(-1.05));
        assert_eq!(record.observations()[1].max, None);
        assert_eq!(record.observations()[5].min, None);
    }

    #[test]
    fn test_parse_csv_requires_columns() {
        let err = DailyRecord::parse_csv("date,low,high\n2021-01-01,0,1\n").unwrap_err();
        assert!(matches!(err, HtfError::InvalidPayload(_)));
    }

    #[test]
    fn test_partial_rows_are_masked() {
        let record = DailyRecord::parse_csv(CSV_DATA).unwrap().to_unit(Unit::Feet);
        let masked = record.observations()[1];
        assert_eq!(masked.min, None);
        assert_eq!(masked.max, None);
        assert_eq!(record.valid_days().len(), 5);
        assert_eq!(record.observations()[2].max, Some(2.461));
    }

    #[test]
    fn test_span_and_record_length() {
        let record = DailyRecord::parse_csv(CSV_DATA).unwrap();
        let span = record.observed_span().unwrap();
        assert_eq!(span.start(), ymd(2021, 6, 13));
        assert_eq!(span.end(), ymd(2021, 6, 21));
        assert!((record.record_length_years() - 8.0 / 365.25).abs() < 1e-12);
        assert_eq!(record.max_observed(), Some(0.75));
    }

    #[test]
    fn test_contiguous_runs_split_at_gaps() {
        let record = DailyRecord::parse_csv(CSV_DATA).unwrap();
        let runs = record.contiguous_runs();
        let lengths: Vec<usize> = runs.iter().map(Vec::len).collect();
        // 06-14 and 06-20 are masked, breaking the record three times
        assert_eq!(lengths, vec![1, 2, 1, 1]);
        assert_eq!(runs[1][0].date, ymd(2021, 6, 15));
        let spans = record.run_spans();
        assert_eq!(spans[1], DateRange(ymd(2021, 6, 15), ymd(2021, 6, 16)));
        assert_eq!(spans.iter().map(DateRange::num_days).sum::<usize>(), 5);
    }

    #[test]
    fn test_missing_dates() {
        let record = DailyRecord::parse_csv(CSV_DATA).unwrap();
        assert_eq!(
            record.missing_dates(),
            vec![ymd(2021, 6, 14), ymd(2021, 6, 17), ymd(2021, 6, 18), ymd(2021, 6, 20)]
        );
    }

    #[test]
    fn test_empty_record() {
        let record = DailyRecord::new(Vec::new());
        assert!(record.observed_span().is_none());
        assert_eq!(record.record_length_years(), 0.0);
        assert!(record.contiguous_runs().is_empty());
        assert!(record.run_spans().is_empty());
        assert!(record.missing_dates().is_empty());
    }
}
