//! Price history loading: fetch -> decode -> parse -> dedup -> sort.

use std::collections::HashSet;

use crate::data::parser::parse_prices;
use crate::data::source::Fetch;
use crate::data::table::decode_sheet;
use crate::domain::{PricePoint, RawRecord, TimeSeries};
use crate::error::PipelineError;

/// Row accounting for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub bad_dates: usize,
    pub bad_prices: usize,
    pub duplicates: usize,
    pub kept: usize,
}

impl LoadReport {
    pub fn dropped(&self) -> usize {
        self.bad_dates + self.bad_prices + self.duplicates
    }
}

/// A cleaned price history plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub series: TimeSeries,
    pub report: LoadReport,
    pub source: String,
}

/// Loads the price history from a [`Fetch`] source.
pub struct Loader<F> {
    source: F,
}

impl<F: Fetch> Loader<F> {
    pub fn new(source: F) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    /// Fetch and clean the full history. Fetch failures are fatal; bad rows
    /// are dropped.
    pub fn load(&self) -> Result<Dataset, PipelineError> {
        let bytes = self.source.fetch()?;
        let sheet = decode_sheet(&bytes)?;

        let (series, mut report) = clean_records(sheet.records);
        report.rows_read = sheet.rows_read;
        report.bad_dates = sheet.bad_dates;

        tracing::info!(
            rows_read = report.rows_read,
            bad_dates = report.bad_dates,
            bad_prices = report.bad_prices,
            duplicates = report.duplicates,
            kept = report.kept,
            "price history loaded"
        );

        Ok(Dataset {
            series,
            report,
            source: self.source.describe(),
        })
    }
}

/// Turn raw records into a [`TimeSeries`].
///
/// Records are processed in input order: unparseable price text is dropped
/// first, then any record whose date was already kept. The survivors are sorted
/// ascending by date.
pub fn clean_records(records: Vec<RawRecord>) -> (TimeSeries, LoadReport) {
    let mut report = LoadReport::default();
    let mut seen = HashSet::with_capacity(records.len());
    let mut points = Vec::with_capacity(records.len());

    for record in records {
        let prices = match parse_prices(&record.text) {
            Ok(prices) => prices,
            Err(err) => {
                tracing::debug!(date = %record.date, %err, "dropping row with unparseable prices");
                report.bad_prices += 1;
                continue;
            }
        };

        if !seen.insert(record.date) {
            tracing::debug!(date = %record.date, "dropping duplicate date");
            report.duplicates += 1;
            continue;
        }

        points.push(PricePoint {
            date: record.date,
            prices,
        });
    }

    points.sort_by_key(|p| p.date);
    report.kept = points.len();

    (TimeSeries::from_sorted_unique(points), report)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::TierPrices;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn raw(date: NaiveDate, text: &str) -> RawRecord {
        RawRecord {
            date,
            text: text.to_string(),
        }
    }

    struct StubSource(Result<Vec<u8>, PipelineError>);

    impl Fetch for StubSource {
        fn fetch(&self) -> Result<Vec<u8>, PipelineError> {
            self.0.clone()
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    #[test]
    fn keeps_first_of_duplicate_dates() {
        let (series, report) = clean_records(vec![
            raw(d(2024, 1, 2), "₹100 ₹90 ₹80"),
            raw(d(2024, 1, 2), "₹999 ₹999 ₹999"),
        ]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].prices, TierPrices::new(100.0, 90.0, 80.0));
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn parse_failures_do_not_claim_a_date() {
        // The first row for the date is unparseable, so the second one is kept.
        let (series, report) = clean_records(vec![
            raw(d(2024, 1, 2), "price unavailable"),
            raw(d(2024, 1, 2), "₹100 ₹90 ₹80"),
        ]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].prices.k24, 100.0);
        assert_eq!(report.bad_prices, 1);
        assert_eq!(report.duplicates, 0);
    }

    #[test]
    fn output_is_sorted_ascending() {
        let (series, report) = clean_records(vec![
            raw(d(2024, 3, 1), "₹3 ₹3 ₹3"),
            raw(d(2024, 1, 1), "₹1 ₹1 ₹1"),
            raw(d(2024, 2, 1), "₹2 ₹2 ₹2"),
        ]);
        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 2, 1), d(2024, 3, 1)]);
        assert_eq!(report.kept, 3);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let (series, report) = clean_records(Vec::new());
        assert!(series.is_empty());
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn load_reports_all_drop_reasons() {
        let csv = "Date,Raw\n\
                   02-01-2024,\"₹6,400 ₹5,900 ₹4,800\"\n\
                   bogus,\"₹1 ₹1 ₹1\"\n\
                   03-01-2024,no prices today\n\
                   01-01-2024,\"₹6,300 ₹5,800 ₹4,700\"\n\
                   02-01-2024,\"₹1 ₹1 ₹1\"\n";
        let loader = Loader::new(StubSource(Ok(csv.as_bytes().to_vec())));
        let dataset = loader.load().unwrap();

        assert_eq!(
            dataset.report,
            LoadReport {
                rows_read: 5,
                bad_dates: 1,
                bad_prices: 1,
                duplicates: 1,
                kept: 2,
            }
        );
        assert_eq!(dataset.report.dropped(), 3);
        assert_eq!(dataset.series.first_date(), Some(d(2024, 1, 1)));
        assert_eq!(dataset.series.points()[1].prices.k24, 6400.0);
        assert_eq!(dataset.source, "stub");
    }

    #[test]
    fn fetch_errors_propagate() {
        let loader = Loader::new(StubSource(Err(PipelineError::Fetch("status 503".to_string()))));
        assert_eq!(
            loader.load().unwrap_err(),
            PipelineError::Fetch("status 503".to_string())
        );
    }
}
