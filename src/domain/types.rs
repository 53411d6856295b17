//! Shared domain types.
//!
//! These types are intentionally kept small and `Copy` where possible: a full
//! price history is a few thousand points, and every request rebuilds its output
//! table from scratch.

use chrono::{Datelike, NaiveDate};

/// Purity grade whose price is tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    K24,
    K22,
    K18,
}

impl Tier {
    /// All tiers in the field order used by the upstream price text.
    pub const ALL: [Tier; 3] = [Tier::K24, Tier::K22, Tier::K18];

    pub fn label(self) -> &'static str {
        match self {
            Tier::K24 => "24K",
            Tier::K22 => "22K",
            Tier::K18 => "18K",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One price per tier (currency units per gram).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TierPrices {
    pub k24: f64,
    pub k22: f64,
    pub k18: f64,
}

impl TierPrices {
    pub fn new(k24: f64, k22: f64, k18: f64) -> Self {
        Self { k24, k22, k18 }
    }

    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::K24 => self.k24,
            Tier::K22 => self.k22,
            Tier::K18 => self.k18,
        }
    }

    /// Per-tier maximum of two observations.
    pub fn max(self, other: TierPrices) -> TierPrices {
        TierPrices {
            k24: self.k24.max(other.k24),
            k22: self.k22.max(other.k22),
            k18: self.k18.max(other.k18),
        }
    }
}

/// A raw sheet row before the price text is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub text: String,
}

/// A cleaned observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub prices: TierPrices,
}

/// Cleaned price history: unique dates, ascending.
///
/// Only the loader constructs a `TimeSeries` from raw data; everything else
/// treats it as read-only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Build a series from points that already satisfy the ordering and
    /// uniqueness invariants.
    pub(crate) fn from_sorted_unique(points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Points with `start <= date <= end`.
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> &[PricePoint] {
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        if lo >= hi { &[] } else { &self.points[lo..hi] }
    }
}

/// Aggregation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Daily,
    Monthly,
    Yearly,
}

impl Granularity {
    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Monthly => "Monthly",
            Granularity::Yearly => "Yearly",
        }
    }

    /// Period-start date of the bucket containing `date`.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Monthly => date.with_day(1).unwrap_or(date),
            Granularity::Yearly => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Human-readable bucket label (`2024-03-05`, `2024-03`, `2024`).
    pub fn format_bucket(self, bucket: NaiveDate) -> String {
        match self {
            Granularity::Daily => bucket.format("%Y-%m-%d").to_string(),
            Granularity::Monthly => bucket.format("%Y-%m").to_string(),
            Granularity::Yearly => bucket.format("%Y").to_string(),
        }
    }
}

/// One output row: a bucket and its per-tier value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRow {
    pub bucket: NaiveDate,
    pub prices: TierPrices,
}

/// Whether a table holds observed or model-evaluated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Historical,
    Forecast,
}

/// Result of one query: aggregated history or a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub kind: TableKind,
    pub granularity: Granularity,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn is_forecast(&self) -> bool {
        self.kind == TableKind::Forecast
    }

    /// `[min, max]` over all tiers and rows, if any rows exist.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for row in &self.rows {
            for tier in Tier::ALL {
                let v = row.prices.get(tier);
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
    }
}
