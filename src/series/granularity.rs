//! Granularity selection from a requested date span.

use chrono::NaiveDate;

use crate::domain::Granularity;

/// Longest span (days) still shown day by day.
pub const DAILY_MAX_SPAN_DAYS: i64 = 31;

/// Longest span (days) still shown month by month.
pub const MONTHLY_MAX_SPAN_DAYS: i64 = 365;

/// Pick the aggregation granularity for `[start, end]`.
///
/// The span is `end - start` in days. An inverted range counts as zero.
pub fn select(start: NaiveDate, end: NaiveDate) -> Granularity {
    let span = (end - start).num_days().max(0);
    if span <= DAILY_MAX_SPAN_DAYS {
        Granularity::Daily
    } else if span <= MONTHLY_MAX_SPAN_DAYS {
        Granularity::Monthly
    } else {
        Granularity::Yearly
    }
}
