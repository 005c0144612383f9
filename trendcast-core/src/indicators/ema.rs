//! Exponential Moving Average (EMA), "adjust=false" form.
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[0] = close[0].
//! alpha = 2 / (span + 1).
//!
//! Evaluated as EMA[t-1] + alpha * (close[t] - EMA[t-1]): a flat stretch of
//! closes leaves the EMA bit-for-bit unchanged, so two EMAs of a constant
//! series stay exactly equal.
//!
//! The recurrence is strictly left to right; each value depends on the last.

use super::Indicator;
use crate::domain::{PriceSeries, SmoothedSeries};
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    /// Fails with `InvalidSpan` for a span of zero.
    pub fn new(span: usize) -> Result<Self> {
        if span == 0 {
            return Err(AnalysisError::InvalidSpan(span));
        }
        Ok(Self {
            span,
            name: format!("ema_{span}"),
        })
    }

    pub fn span(&self) -> usize {
        self.span
    }

    pub fn alpha(&self) -> f64 {
        smoothing_factor(self.span)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, series: &PriceSeries) -> Result<SmoothedSeries> {
        if series.is_empty() {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if series.len() < self.span {
            tracing::debug!(
                symbol = series.symbol(),
                span = self.span,
                len = series.len(),
                "series shorter than span; early EMA values are low-confidence"
            );
        }
        let values = ema_of_series(&series.closes(), self.span);
        SmoothedSeries::aligned_with(series, self.span, values)
    }
}

/// alpha = 2 / (span + 1).
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute raw EMA values from a pre-extracted f64 slice.
///
/// Returns an empty vector for empty input. `span` is assumed >= 1.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let Some(&seed) = values.first() else {
        return Vec::new();
    };
    let alpha = smoothing_factor(span);

    let mut result = Vec::with_capacity(values.len());
    result.push(seed);
    let mut prev = seed;
    for &v in &values[1..] {
        // Rounding must not carry the value outside [prev, v].
        let ema = (prev + alpha * (v - prev)).clamp(prev.min(v), prev.max(v));
        result.push(ema);
        prev = ema;
    }
    result
}
