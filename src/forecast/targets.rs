//! Forecast target dates.

use chrono::NaiveDate;

use crate::domain::Granularity;

/// Dates at which to evaluate a forecast over `[start, end]`.
///
/// `Daily` yields every date in the range. `Monthly`/`Yearly` yield one date per
/// bucket touched by the range: the bucket's period start, which may precede
/// `start` for the first bucket.
pub fn target_dates(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    let mut out: Vec<NaiveDate> = Vec::new();
    for date in start.iter_days().take_while(|d| *d <= end) {
        let bucket = granularity.bucket_start(date);
        if out.last() != Some(&bucket) {
            out.push(bucket);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_enumerates_inclusive_range() {
        let dates = target_dates(d(2030, 1, 30), d(2030, 2, 2), Granularity::Daily);
        assert_eq!(dates, vec![d(2030, 1, 30), d(2030, 1, 31), d(2030, 2, 1), d(2030, 2, 2)]);
    }

    #[test]
    fn monthly_uses_period_starts() {
        let dates = target_dates(d(2030, 1, 15), d(2030, 4, 10), Granularity::Monthly);
        assert_eq!(dates, vec![d(2030, 1, 1), d(2030, 2, 1), d(2030, 3, 1), d(2030, 4, 1)]);
    }

    #[test]
    fn yearly_uses_january_first() {
        let dates = target_dates(d(2029, 7, 1), d(2031, 2, 1), Granularity::Yearly);
        assert_eq!(dates, vec![d(2029, 1, 1), d(2030, 1, 1), d(2031, 1, 1)]);
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(target_dates(d(2030, 2, 1), d(2030, 1, 1), Granularity::Daily).is_empty());
    }
}
