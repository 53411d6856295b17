//! Command-line parsing for the gold price viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gold", version, about = "Gold price history and linear-trend forecasts (24K/22K/18K)")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the price table for a date range, optionally exporting it to CSV.
    Table(RangeArgs),
    /// Render the price table as an ASCII chart (one line per tier).
    Plot(PlotArgs),
    /// Launch the interactive TUI (default).
    Tui(TuiArgs),
}

/// Where to read the price sheet from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Price sheet URL (XLSX or CSV). Overrides GOLD_DATA_URL.
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Read the price sheet from a local file instead of the network.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Cache lifetime in seconds (0 = until exit). Overrides GOLD_CACHE_TTL_SECS.
    #[arg(long, global = true, value_name = "SECS")]
    pub cache_ttl_secs: Option<u64>,
}

/// A required date range.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// First date (inclusive), YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last date (inclusive), YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    pub end: NaiveDate,

    /// Export the table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for the ASCII chart.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Initial form values for the TUI.
#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// Initial start date, YYYY-MM-DD (default: 30 days before end).
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Initial end date, YYYY-MM-DD (default: today).
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}"))
}
