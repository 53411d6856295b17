//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::QueryOutput;
use crate::data::LoadReport;
use crate::domain::{PriceTable, Tier};

/// Shown above a forecast table.
pub const FORECAST_NOTICE: &str = "No historical data available for selected range. Showing predicted prices.";

/// Header block: range, granularity, data source.
pub fn format_query_summary(output: &QueryOutput) -> String {
    let mut out = String::new();

    out.push_str("=== gold - Gold Price Trend ===\n");
    out.push_str(&format!(
        "Range: {} .. {} ({} days)\n",
        output.range.start(),
        output.range.end(),
        output.range.span_days()
    ));
    out.push_str(&format!("View: {}\n", output.table.granularity.display_name()));

    let series = &output.dataset.series;
    let history = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "-".to_string(),
    };
    out.push_str(&format!("History: {history} | {}\n", format_load_report(&output.dataset.report)));
    out.push_str(&format!("Source: {}\n", output.dataset.source));

    if output.table.is_forecast() {
        out.push('\n');
        out.push_str(FORECAST_NOTICE);
        out.push('\n');
    }
    out.push('\n');

    out
}

/// One-line load accounting.
pub fn format_load_report(report: &LoadReport) -> String {
    format!(
        "rows={} kept={} dropped={} (date={}, price={}, duplicate={})",
        report.rows_read,
        report.kept,
        report.dropped(),
        report.bad_dates,
        report.bad_prices,
        report.duplicates
    )
}

/// Format the price table.
pub fn format_price_table(table: &PriceTable) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<12}", "Date"));
    for tier in Tier::ALL {
        out.push_str(&format!(" {:>12}", tier.label()));
    }
    out.push('\n');

    out.push_str(&format!("{:-<12}", ""));
    for _ in Tier::ALL {
        out.push_str(&format!(" {:-<12}", ""));
    }
    out.push('\n');

    for row in &table.rows {
        out.push_str(&format!("{:<12}", table.granularity.format_bucket(row.bucket)));
        for tier in Tier::ALL {
            out.push_str(&format!(" {:>12}", fmt_price(row.prices.get(tier))));
        }
        out.push('\n');
    }

    if table.rows.is_empty() {
        out.push_str("(no rows)\n");
    }

    out
}

/// Prices with thousands separators and two decimals: `1,234,567.89`.
pub fn fmt_price(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
