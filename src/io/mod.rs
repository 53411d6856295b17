//! Input/output helpers.
//!
//! - price table exports (CSV) (`export`)

pub mod export;

pub use export::*;
