use chrono::NaiveDate;
use serde::Serialize;
use std::mem::replace;

/// Inclusive span of calendar days. Iterating yields every date from the
/// start through the end.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }

    /// Number of days remaining in the span (0 once exhausted).
    pub fn num_days(&self) -> usize {
        if self.0 > self.1 {
            0
        } else {
            (self.1 - self.0).num_days() as usize + 1
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0.succ_opt()?;
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn test_date_range_iteration() {
        let start = NaiveDate::from_ymd_opt(2020, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
        let range = DateRange(start, end);
        assert_eq!(range.num_days(), 5);
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        assert_eq!(dates[4], end);
    }

    #[test]
    fn test_date_range_single_day() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        let range = DateRange(start, start);
        assert_eq!(range.num_days(), 1);
        let dates: Vec<NaiveDate> = range.collect();
        assert_eq!(dates, vec![start]);
    }

    #[test]
    fn test_date_range_empty() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
        let range = DateRange(start, end);
        assert_eq!(range.num_days(), 0);
        assert_eq!(range.count(), 0);
    }
}
