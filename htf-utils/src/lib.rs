//! Shared utility functions for HTF crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{Datelike, NaiveDate};

    /// First calendar month of a meteorological year.
    pub const METEOROLOGICAL_YEAR_START_MONTH: u32 = 5;

    /// Average year length used when converting a day span to years.
    pub const DAYS_PER_YEAR: f64 = 365.25;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| DateError(format!("{s}: {e}")))
    }

    /// Parse the leading "YYYY-MM-DD" of a timestamp such as
    /// "1990-01-01 00:00:00" or "1990-01-01T00:00:00".
    pub fn parse_date_prefix(s: &str) -> Result<NaiveDate, DateError> {
        let s = s.trim();
        match s.get(..10) {
            Some(head) => parse_date(head),
            None => Err(DateError(format!("{s}: too short for YYYY-MM-DD"))),
        }
    }

    /// Get the meteorological year for a given date.
    /// Meteorological years run May 1 to April 30 and are labeled by the
    /// year containing January.
    /// e.g., Dec 31 1900 -> 1901, Apr 30 1901 -> 1901, May 1 1901 -> 1902
    pub fn meteorological_year_for_date(date: &NaiveDate) -> i32 {
        if date.month() >= METEOROLOGICAL_YEAR_START_MONTH {
            date.year() + 1
        } else {
            date.year()
        }
    }

    /// First and last calendar day of a meteorological year.
    pub fn meteorological_year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(year - 1, METEOROLOGICAL_YEAR_START_MONTH, 1)?;
        let end = NaiveDate::from_ymd_opt(year, METEOROLOGICAL_YEAR_START_MONTH - 1, 30)?;
        Some((start, end))
    }

    /// Length of a record in (fractional) years between two dates.
    pub fn record_length_years(first: &NaiveDate, last: &NaiveDate) -> f64 {
        (*last - *first).num_days() as f64 / DAYS_PER_YEAR
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_meteorological_year_for_date() {
            let dec31 = NaiveDate::from_ymd_opt(1900, 12, 31).unwrap();
            assert_eq!(meteorological_year_for_date(&dec31), 1901);

            let apr30 = NaiveDate::from_ymd_opt(1901, 4, 30).unwrap();
            assert_eq!(meteorological_year_for_date(&apr30), 1901);

            let may1 = NaiveDate::from_ymd_opt(1901, 5, 1).unwrap();
            assert_eq!(meteorological_year_for_date(&may1), 1902);
        }

        #[test]
        fn test_meteorological_year_bounds() {
            let (start, end) = meteorological_year_bounds(2021).unwrap();
            assert_eq!(start, NaiveDate::from_ymd_opt(2020, 5, 1).unwrap());
            assert_eq!(end, NaiveDate::from_ymd_opt(2021, 4, 30).unwrap());
            assert_eq!(meteorological_year_for_date(&start), 2021);
            assert_eq!(meteorological_year_for_date(&end), 2021);
        }

        #[test]
        fn test_record_length_years() {
            let first = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            let last = NaiveDate::from_ymd_opt(2004, 1, 1).unwrap();
            // 1461 days / 365.25
            assert!((record_length_years(&first, &last) - 4.0).abs() < 1e-12);
            assert_eq!(record_length_years(&first, &first), 0.0);
        }

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_parse_date_prefix() {
            let expected = NaiveDate::from_ymd_opt(1990, 1, 2).unwrap();
            assert_eq!(parse_date_prefix("1990-01-02 00:00:00").unwrap(), expected);
            assert_eq!(parse_date_prefix("1990-01-02").unwrap(), expected);
            assert!(parse_date_prefix("1990").is_err());
            assert!(parse_date("not a date").is_err());
        }
    }
}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
