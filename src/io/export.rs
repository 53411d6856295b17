//! Export a price table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use serde::Serialize;

use crate::domain::{PriceTable, TableKind};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    date: String,
    kind: &'a str,
    #[serde(rename = "24K")]
    k24: f64,
    #[serde(rename = "22K")]
    k22: f64,
    #[serde(rename = "18K")]
    k18: f64,
}

/// Write the table to `path` with a `date,kind,24K,22K,18K` header.
pub fn write_table_csv(path: &Path, table: &PriceTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let kind = match table.kind {
        TableKind::Historical => "historical",
        TableKind::Forecast => "forecast",
    };

    for row in &table.rows {
        writer
            .serialize(ExportRow {
                date: table.granularity.format_bucket(row.bucket),
                kind,
                k24: row.prices.k24,
                k22: row.prices.k22,
                k18: row.prices.k18,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = table.rows.len(), "exported price table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Granularity, PriceRow, TierPrices};

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gold.csv");
        let table = PriceTable {
            kind: TableKind::Forecast,
            granularity: Granularity::Yearly,
            rows: vec![
                PriceRow {
                    bucket: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                    prices: TierPrices::new(9100.5, 8342.25, 6825.0),
                },
                PriceRow {
                    bucket: NaiveDate::from_ymd_opt(2031, 1, 1).unwrap(),
                    prices: TierPrices::new(9500.0, 8700.0, 7125.75),
                },
            ],
        };

        write_table_csv(&path, &table).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,kind,24K,22K,18K");
        assert_eq!(lines[1], "2030,forecast,9100.5,8342.25,6825.0");
        assert_eq!(lines[2], "2031,forecast,9500.0,8700.0,7125.75");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let table = PriceTable {
            kind: TableKind::Historical,
            granularity: Granularity::Daily,
            rows: Vec::new(),
        };
        let err = write_table_csv(Path::new("/nonexistent-dir/x/gold.csv"), &table).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
