//! Per-tier linear trend over the full price history.

use chrono::{Datelike, NaiveDate};

use crate::domain::{PriceRow, Tier, TierPrices, TimeSeries};
use crate::error::PipelineError;
use crate::math::{FitFailure, LinearFit, fit_line};

/// Independent variable for the fit: days since 0001-12-31 (0001-01-01 is 1).
pub fn ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Round half away from zero to 2 decimal places.
///
/// Ties go away from zero, not to even: `round2(0.125) == 0.13`.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One fitted line per tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendModel {
    pub k24: LinearFit,
    pub k22: LinearFit,
    pub k18: LinearFit,
}

impl TrendModel {
    /// Fit each tier independently against the ordinal date of every point.
    pub fn fit(series: &TimeSeries) -> Result<Self, PipelineError> {
        let xs: Vec<f64> = series.points().iter().map(|p| ordinal(p.date)).collect();
        let fit_tier = |tier: Tier| -> Result<LinearFit, PipelineError> {
            let ys: Vec<f64> = series.points().iter().map(|p| p.prices.get(tier)).collect();
            fit_line(&xs, &ys).map_err(|failure| match failure {
                FitFailure::TooFewPoints(points) => PipelineError::InsufficientData { tier, points },
                FitFailure::DegenerateX => PipelineError::InsufficientData { tier, points: 1 },
            })
        };

        let model = TrendModel {
            k24: fit_tier(Tier::K24)?,
            k22: fit_tier(Tier::K22)?,
            k18: fit_tier(Tier::K18)?,
        };

        tracing::debug!(
            n = series.len(),
            slope_24k = model.k24.slope,
            slope_22k = model.k22.slope,
            slope_18k = model.k18.slope,
            "trend model fitted"
        );
        Ok(model)
    }

    /// Evaluate every tier's line at `date`, rounded to 2 decimals.
    pub fn predict(&self, date: NaiveDate) -> TierPrices {
        let x = ordinal(date);
        TierPrices::new(
            round2(self.k24.eval(x)),
            round2(self.k22.eval(x)),
            round2(self.k18.eval(x)),
        )
    }

    /// One forecast row per target date.
    pub fn predict_rows(&self, targets: &[NaiveDate]) -> Vec<PriceRow> {
        targets
            .iter()
            .map(|&bucket| PriceRow {
                bucket,
                prices: self.predict(bucket),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::PricePoint;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> TimeSeries {
        TimeSeries::from_sorted_unique(
            points
                .iter()
                .map(|&(date, v)| PricePoint {
                    date,
                    prices: TierPrices::new(v, v * 0.9, v * 0.75),
                })
                .collect(),
        )
    }

    #[test]
    fn ordinal_matches_proleptic_day_count() {
        assert_eq!(ordinal(d(1, 1, 1)), 1.0);
        assert_eq!(ordinal(d(2000, 1, 1)), 730_120.0);
        assert_eq!(ordinal(d(2000, 1, 2)) - ordinal(d(2000, 1, 1)), 1.0);
    }

    #[test]
    fn extrapolates_two_points_exactly() {
        let day0 = d(2024, 1, 1);
        let model = TrendModel::fit(&series(&[(day0, 100.0), (day0 + Duration::days(10), 200.0)])).unwrap();
        let predicted = model.predict(day0 + Duration::days(20));
        assert_eq!(predicted.k24, 300.0);
        assert_eq!(predicted.k22, 270.0);
        assert_eq!(predicted.k18, 225.0);
    }

    #[test]
    fn predictions_are_rounded_to_cents() {
        let day0 = d(2024, 1, 1);
        let model = TrendModel::fit(&series(&[(day0, 0.0), (day0 + Duration::days(3), 1.0)])).unwrap();
        // slope 1/3 per day
        assert_eq!(model.predict(day0 + Duration::days(1)).k24, 0.33);
        assert_eq!(model.predict(day0 + Duration::days(2)).k24, 0.67);
    }

    #[test]
    fn single_point_is_insufficient() {
        let err = TrendModel::fit(&series(&[(d(2024, 1, 1), 100.0)])).unwrap_err();
        assert_eq!(err, PipelineError::InsufficientData { tier: Tier::K24, points: 1 });

        let err = TrendModel::fit(&TimeSeries::default()).unwrap_err();
        assert_eq!(err, PipelineError::InsufficientData { tier: Tier::K24, points: 0 });
    }

    #[test]
    fn round2_is_half_away_from_zero() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(-2.345_000_1), -2.35);
        assert_eq!(round2(7.0), 7.0);
        assert_eq!(round2(0.125), 0.13);
    }
}
