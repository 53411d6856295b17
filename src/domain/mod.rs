//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - price tiers and per-tier values (`Tier`, `TierPrices`)
//! - raw and cleaned observations (`RawRecord`, `PricePoint`, `TimeSeries`)
//! - query outputs (`Granularity`, `PriceRow`, `PriceTable`)

pub mod types;

pub use types::*;
