//! Bucket aggregation (per-tier maximum).

use std::collections::BTreeMap;

use crate::domain::{Granularity, PricePoint, PriceRow, TierPrices};

/// Collapse `points` to one row per bucket.
///
/// `Daily` is a pass-through. `Monthly`/`Yearly` take the per-tier maximum of
/// every point in the bucket and label the row with the period start. Bucket
/// order comes from the bucket dates, not from the input order.
pub fn aggregate(points: &[PricePoint], granularity: Granularity) -> Vec<PriceRow> {
    if granularity == Granularity::Daily {
        return points
            .iter()
            .map(|p| PriceRow {
                bucket: p.date,
                prices: p.prices,
            })
            .collect();
    }

    let mut buckets = BTreeMap::new();
    for p in points {
        buckets
            .entry(granularity.bucket_start(p.date))
            .and_modify(|acc: &mut TierPrices| *acc = acc.max(p.prices))
            .or_insert(p.prices);
    }

    buckets
        .into_iter()
        .map(|(bucket, prices)| PriceRow { bucket, prices })
        .collect()
}
