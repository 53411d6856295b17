//! Shared query pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate range -> load (cached) -> select granularity -> aggregate or forecast
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::{CacheMode, Dataset, Fetch, Loader, SeriesCache};
use crate::domain::{PriceTable, TableKind, TimeSeries};
use crate::error::PipelineError;
use crate::forecast::forecast;
use crate::series::{aggregate, select_granularity};

/// Longest accepted range: five 365-day years.
pub const MAX_SPAN_DAYS: i64 = 5 * 365;

/// A validated, inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Validate a user-supplied range: `start < end` and at most five years.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PipelineError> {
        if start >= end {
            return Err(PipelineError::Validation(
                "End date must be after start date.".to_string(),
            ));
        }
        if (end - start).num_days() > MAX_SPAN_DAYS {
            return Err(PipelineError::Validation("Date range exceeds 5 years.".to_string()));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Build the output table for `range` from a loaded `series`.
///
/// If any history falls inside the range, the in-range points are aggregated.
/// Otherwise the whole history is used to fit a trend and the range is
/// forecast.
pub fn run_query(series: &TimeSeries, range: DateRange) -> Result<PriceTable, PipelineError> {
    let granularity = select_granularity(range.start, range.end);
    let in_range = series.in_range(range.start, range.end);

    if in_range.is_empty() {
        tracing::info!(
            start = %range.start,
            end = %range.end,
            ?granularity,
            "no history in range; forecasting"
        );
        let rows = forecast(series, range.start, range.end, granularity)?;
        return Ok(PriceTable {
            kind: TableKind::Forecast,
            granularity,
            rows,
        });
    }

    tracing::info!(
        start = %range.start,
        end = %range.end,
        ?granularity,
        points = in_range.len(),
        "aggregating history"
    );
    Ok(PriceTable {
        kind: TableKind::Historical,
        granularity,
        rows: aggregate(in_range, granularity),
    })
}

/// All outputs of one query.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub range: DateRange,
    pub table: PriceTable,
    pub dataset: Arc<Dataset>,
}

/// Loader + cache pair serving queries.
pub struct QueryService<F, C> {
    loader: Loader<F>,
    cache: C,
}

impl<F: Fetch, C: SeriesCache> QueryService<F, C> {
    pub fn new(loader: Loader<F>, cache: C) -> Self {
        Self { loader, cache }
    }

    /// Load (or reuse) the price history.
    pub fn dataset(&self, mode: CacheMode) -> Result<Arc<Dataset>, PipelineError> {
        self.cache.get_or_load(mode, &|| self.loader.load())
    }

    /// Run a validated query.
    pub fn query(&self, range: DateRange, mode: CacheMode) -> Result<QueryOutput, PipelineError> {
        let dataset = self.dataset(mode)?;
        let table = run_query(&dataset.series, range)?;
        Ok(QueryOutput { range, table, dataset })
    }

    /// Validate raw dates, then query. Invalid ranges never touch the loader.
    pub fn query_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        mode: CacheMode,
    ) -> Result<QueryOutput, PipelineError> {
        let range = DateRange::new(start, end)?;
        self.query(range, mode)
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn source(&self) -> String {
        self.loader.source().describe()
    }
}
