//! Price sheet decoding.
//!
//! The upstream resource is a two-column sheet: a `DD-MM-YYYY` date and a
//! free-text price cell. It is published as an XLSX workbook; a CSV export with
//! the same layout is accepted too. The format is detected from the payload
//! bytes, not from the URL.
//!
//! Rows whose date cannot be read are skipped (and counted), matching how bad
//! price text is handled further down the pipeline.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use chrono::NaiveDate;

use crate::domain::RawRecord;
use crate::error::PipelineError;

/// Date format used by the sheet's first column.
pub const SHEET_DATE_FORMAT: &str = "%d-%m-%Y";

/// Local file header signature; every XLSX file is a zip archive.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Csv,
}

impl SheetFormat {
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            SheetFormat::Xlsx
        } else {
            SheetFormat::Csv
        }
    }
}

/// Decoded sheet rows plus row accounting.
#[derive(Debug, Clone, Default)]
pub struct DecodedSheet {
    pub records: Vec<RawRecord>,
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    /// Rows skipped because the date cell was missing or malformed.
    pub bad_dates: usize,
}

impl DecodedSheet {
    fn push(&mut self, date: Option<NaiveDate>, text: String) {
        self.rows_read += 1;
        match date {
            Some(date) => self.records.push(RawRecord { date, text }),
            None => {
                self.bad_dates += 1;
                tracing::debug!(row = self.rows_read, "skipping row with unreadable date");
            }
        }
    }
}

/// Decode a fetched payload into raw records, in sheet order.
pub fn decode_sheet(bytes: &[u8]) -> Result<DecodedSheet, PipelineError> {
    let format = SheetFormat::detect(bytes);
    tracing::debug!(?format, bytes = bytes.len(), "decoding price sheet");

    let sheet = match format {
        SheetFormat::Xlsx => decode_xlsx(bytes)?,
        SheetFormat::Csv => decode_csv(bytes)?,
    };

    if sheet.rows_read == 0 {
        return Err(PipelineError::Payload("sheet has no data rows".to_string()));
    }
    Ok(sheet)
}

fn decode_xlsx(bytes: &[u8]) -> Result<DecodedSheet, PipelineError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| PipelineError::Payload(format!("failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::Payload("workbook has no worksheets".to_string()))?
        .map_err(|e| PipelineError::Payload(format!("failed to read worksheet: {e}")))?;

    let mut sheet = DecodedSheet::default();
    // First row is the header.
    for row in range.rows().skip(1) {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let date = row.first().and_then(date_from_cell);
        let text = row.get(1).map(text_from_cell).unwrap_or_default();
        sheet.push(date, text);
    }
    Ok(sheet)
}

fn decode_csv(bytes: &[u8]) -> Result<DecodedSheet, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut sheet = DecodedSheet::default();
    for (idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| PipelineError::Payload(format!("malformed CSV at data row {}: {e}", idx + 1)))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let date = record.get(0).and_then(parse_sheet_date);
        let text = record.get(1).unwrap_or_default().to_string();
        sheet.push(date, text);
    }
    Ok(sheet)
}

/// Parse a `DD-MM-YYYY` date string.
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), SHEET_DATE_FORMAT).ok()
}

fn date_from_cell(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::String(s) => parse_sheet_date(s),
        Data::DateTime(dt) => dt.as_datetime().map(|dt| dt.date()),
        Data::DateTimeIso(s) => s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        _ => None,
    }
}

fn text_from_cell(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn detects_format_from_magic_bytes() {
        assert_eq!(SheetFormat::detect(b"PK\x03\x04rest"), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::detect(b"Date,Raw\n"), SheetFormat::Csv);
        assert_eq!(SheetFormat::detect(b""), SheetFormat::Csv);
    }

    #[test]
    fn decodes_csv_rows_in_order() {
        let csv = "Date,Raw\n\
                   02-01-2024,\"₹6,400 ₹5,900 ₹4,800\"\n\
                   01-01-2024,\"₹6,300 ₹5,800 ₹4,700\"\n";
        let sheet = decode_sheet(csv.as_bytes()).unwrap();
        assert_eq!(sheet.rows_read, 2);
        assert_eq!(sheet.bad_dates, 0);
        assert_eq!(sheet.records[0].date, d(2024, 1, 2));
        assert_eq!(sheet.records[1].date, d(2024, 1, 1));
        assert_eq!(sheet.records[0].text, "₹6,400 ₹5,900 ₹4,800");
    }

    #[test]
    fn skips_rows_with_bad_dates() {
        let csv = "Date,Raw\n2024-01-02,x\n,y\n03-01-2024,z\n";
        let sheet = decode_sheet(csv.as_bytes()).unwrap();
        assert_eq!(sheet.rows_read, 3);
        assert_eq!(sheet.bad_dates, 2);
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records[0].date, d(2024, 1, 3));
    }

    #[test]
    fn missing_text_column_yields_empty_text() {
        let sheet = decode_sheet(b"Date,Raw\n05-02-2024\n").unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records[0].text, "");
    }

    #[test]
    fn header_only_sheet_is_a_payload_error() {
        let err = decode_sheet(b"Date,Raw\n").unwrap_err();
        assert!(matches!(err, PipelineError::Payload(_)));
    }

    #[test]
    fn corrupt_workbook_is_a_payload_error() {
        let err = decode_sheet(b"PK\x03\x04not really a zip").unwrap_err();
        assert!(matches!(err, PipelineError::Payload(_)));
    }

    #[test]
    fn decodes_first_worksheet_of_a_workbook() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Date").unwrap();
        sheet.write_string(0, 1, "Raw").unwrap();
        sheet.write_string(1, 0, "02-01-2024").unwrap();
        sheet.write_string(1, 1, "24K ₹6,400 22K ₹5,900 18K ₹4,800").unwrap();
        let date_format = Format::new().set_num_format("dd-mm-yyyy");
        let native = ExcelDateTime::from_ymd(2024, 1, 3).unwrap();
        sheet.write_datetime_with_format(2, 0, &native, &date_format).unwrap();
        sheet.write_string(2, 1, "₹1 ₹2 ₹3").unwrap();
        // A plain number in the date column is not a date.
        sheet.write_number(3, 0, 45000.0).unwrap();
        sheet.write_string(3, 1, "₹7 ₹8 ₹9").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        assert_eq!(SheetFormat::detect(&bytes), SheetFormat::Xlsx);
        let decoded = decode_sheet(&bytes).unwrap();
        assert_eq!(decoded.rows_read, 3);
        assert_eq!(decoded.bad_dates, 1);
        assert_eq!(
            decoded.records,
            vec![
                RawRecord {
                    date: d(2024, 1, 2),
                    text: "24K ₹6,400 22K ₹5,900 18K ₹4,800".to_string(),
                },
                RawRecord {
                    date: d(2024, 1, 3),
                    text: "₹1 ₹2 ₹3".to_string(),
                },
            ]
        );
    }

    #[test]
    fn sheet_dates_are_day_first() {
        assert_eq!(parse_sheet_date(" 07-03-2024 "), Some(d(2024, 3, 7)));
        assert_eq!(parse_sheet_date("31-02-2024"), None);
        assert_eq!(parse_sheet_date("2024-03-07"), None);
    }
}
