//! Smoothing engine.
//!
//! Indicators are pure functions: price series in, aligned smoothed series out.
//! They are computed once per analysis run over the full loaded series.

pub mod ema;

pub use ema::{ema_of_series, Ema};

use crate::domain::{PriceSeries, SmoothedSeries};
use crate::error::Result;

/// Trait for smoothing indicators.
///
/// # Look-ahead contamination guard
/// No output value at index t may depend on a close at t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_13").
    fn name(&self) -> &str;

    /// Compute the indicator over the whole series.
    ///
    /// The output has the same length and dates as `series`.
    fn compute(&self, series: &PriceSeries) -> Result<SmoothedSeries>;
}

/// Compute one EMA per span, in the order the spans were given.
///
/// Fails with `InsufficientData` for an empty series and `InvalidSpan` for a
/// zero span. Either failure aborts the whole set.
pub fn smooth_all(series: &PriceSeries, spans: &[usize]) -> Result<Vec<SmoothedSeries>> {
    spans
        .iter()
        .map(|&span| Ema::new(span)?.compute(series))
        .collect()
}

/// Create a daily series from close prices for testing.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    use crate::domain::PricePoint;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(base_date + chrono::Duration::days(i as i64), close))
        .collect();
    PriceSeries::new("TEST", points).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
