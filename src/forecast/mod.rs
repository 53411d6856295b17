//! Linear-trend forecasting for dates outside the observed history.
//!
//! - `trend`: per-tier OLS fit on ordinal dates, rounded predictions
//! - `targets`: which dates a forecast is evaluated at for a given granularity

pub mod targets;
pub mod trend;

pub use targets::target_dates;
pub use trend::{TrendModel, ordinal, round2};

use chrono::NaiveDate;

use crate::domain::{Granularity, PriceRow, TimeSeries};
use crate::error::PipelineError;

/// Forecast `[start, end]` at `granularity`, trained on the whole `series`.
pub fn forecast(
    series: &TimeSeries,
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
) -> Result<Vec<PriceRow>, PipelineError> {
    let model = TrendModel::fit(series)?;
    Ok(model.predict_rows(&target_dates(start, end, granularity)))
}
