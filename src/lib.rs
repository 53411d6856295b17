//! `gold-trend` library crate.
//!
//! The binary (`gold`) is a thin wrapper around this library so that:
//!
//! - the load/aggregate/forecast pipeline is testable without a network or a terminal
//! - the same query service drives the CLI tables, ASCII plots and the TUI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod series;
pub mod tui;
