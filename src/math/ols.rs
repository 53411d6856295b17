//! Ordinary least squares for a straight line.
//!
//! We solve
//!
//! ```text
//! minimize Σ (y_i - (slope * x_i + intercept))^2
//! ```
//!
//! in closed form. The x values here are ordinal day numbers (~740_000), so the
//! sums are taken around the mean of x. Without centring, `Σx²` is ~10^15 for a
//! few years of history, and `n Σx² - (Σx)²` loses most of its precision to
//! cancellation.

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Number of observations used.
    pub n: usize,
}

impl LinearFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Why a line could not be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitFailure {
    /// Fewer than two observations.
    TooFewPoints(usize),
    /// All x values are equal (vertical line).
    DegenerateX,
}

/// Fit a degree-1 polynomial to `(xs[i], ys[i])`.
///
/// `xs` and `ys` must have the same length; extra elements of the longer slice
/// are ignored.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LinearFit, FitFailure> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Err(FitFailure::TooFewPoints(n));
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let nf = n as f64;
    let x_mean = xs.iter().sum::<f64>() / nf;
    let y_mean = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    if sxx == 0.0 || !sxx.is_finite() {
        return Err(FitFailure::DegenerateX);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    Ok(LinearFit { slope, intercept, n })
}
