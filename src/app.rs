//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves configuration
//! - sets up logging
//! - builds the query service (source + cache)
//! - prints tables/plots or launches the TUI

use clap::Parser;

use crate::cli::{Cli, Command, PlotArgs, RangeArgs, TuiArgs};
use crate::data::{CacheMode, Fetch, FileSource, HttpSource, Loader, MemoryCache};
use crate::error::AppError;
use crate::logging::{self, LogTarget};

pub mod config;
pub mod pipeline;

use config::{AppConfig, DataLocation};
use pipeline::{QueryOutput, QueryService};

/// Query service as wired by the binary.
pub type GoldService = QueryService<Box<dyn Fetch>, MemoryCache>;

/// Entry point for the `gold` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli.source)?;

    // `gold` with no subcommand behaves like `gold tui`.
    match cli.command.unwrap_or_else(|| Command::Tui(TuiArgs::default())) {
        Command::Table(args) => {
            logging::init(LogTarget::Stderr)?;
            handle_table(&config, args)
        }
        Command::Plot(args) => {
            logging::init(LogTarget::Stderr)?;
            handle_plot(&config, args)
        }
        Command::Tui(args) => {
            let target = match &config.log_file {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Off,
            };
            logging::init(target)?;
            crate::tui::run(build_service(&config), args)
        }
    }
}

/// Wire the configured source and cache into a query service.
pub fn build_service(config: &AppConfig) -> GoldService {
    let source: Box<dyn Fetch> = match &config.location {
        DataLocation::Url(url) => Box::new(HttpSource::new(url.clone())),
        DataLocation::File(path) => Box::new(FileSource::new(path.clone())),
    };
    QueryService::new(Loader::new(source), MemoryCache::new(config.cache_ttl))
}

fn run_range(config: &AppConfig, args: &RangeArgs) -> Result<QueryOutput, AppError> {
    let service = build_service(config);
    let output = service.query_dates(args.start, args.end, CacheMode::Use)?;

    if let Some(path) = &args.export {
        crate::io::export::write_table_csv(path, &output.table)?;
    }
    Ok(output)
}

fn handle_table(config: &AppConfig, args: RangeArgs) -> Result<(), AppError> {
    let output = run_range(config, &args)?;

    println!("{}", crate::report::format_query_summary(&output));
    println!("{}", crate::report::format_price_table(&output.table));

    Ok(())
}

fn handle_plot(config: &AppConfig, args: PlotArgs) -> Result<(), AppError> {
    let output = run_range(config, &args.range)?;

    println!("{}", crate::report::format_query_summary(&output));
    println!(
        "{}",
        crate::plot::render_price_plot(&output.table, args.width, args.height)
    );

    Ok(())
}
