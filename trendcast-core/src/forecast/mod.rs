//! Forecasting: univariate forecasters and the adapter that turns their output
//! into a single predictive interval.
//!
//! Forecasters implement a two-step capability: `fit` a frame of (date, value)
//! rows into a model, then `predict` rows for each day of the horizon. The
//! adapter owns every policy decision (minimum length, last-row selection,
//! interval ordering, error mapping); forecasters only do the math.

pub mod adapter;
pub mod holt;
pub mod linear;

pub use adapter::{ForecastAdapter, MIN_FORECAST_POINTS};
pub use holt::HoltForecaster;
pub use linear::LinearTrendForecaster;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::PriceSeries;

/// Forecaster-internal failures. The adapter folds all of these into
/// `AnalysisError::ForecastUnavailable`.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("need at least {required} observations, got {actual}")]
    TooShort { required: usize, actual: usize },

    #[error("fit did not converge: {0}")]
    NotConverged(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Two-column input frame: observation dates and values.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastFrame {
    pub ds: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl ForecastFrame {
    pub fn from_series(series: &PriceSeries) -> Self {
        Self {
            ds: series.dates(),
            y: series.closes(),
        }
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.ds.last().copied()
    }

    /// Calendar days elapsed since the first observation, per row.
    pub fn day_offsets(&self) -> Vec<f64> {
        match self.ds.first() {
            Some(&first) => self
                .ds
                .iter()
                .map(|d| (*d - first).num_days() as f64)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Mean calendar days between consecutive observations.
    pub fn mean_spacing_days(&self) -> Option<f64> {
        match (self.ds.first(), self.ds.last()) {
            (Some(&first), Some(&last)) if self.ds.len() > 1 => {
                Some((last - first).num_days() as f64 / (self.ds.len() - 1) as f64)
            }
            _ => None,
        }
    }
}

/// One predicted row: point estimate with its interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub date: NaiveDate,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A model that has been fitted to a frame.
pub trait FittedModel: Send + Sync {
    /// Predict one row per calendar day, `horizon` days past the last
    /// observation. Rows are in date order.
    fn predict(&self, horizon: usize) -> Result<Vec<PredictionRow>, ForecastError>;
}

/// A univariate forecaster.
///
/// # Invariants
/// - `fit` holds no state between calls; two fits of the same frame are
///   independent and produce equal predictions.
pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&self, frame: &ForecastFrame) -> Result<Box<dyn FittedModel>, ForecastError>;
}

/// Selectable bundled forecasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    /// Double exponential smoothing (level + trend).
    #[default]
    Holt,
    /// Least-squares trend on calendar days.
    Linear,
}

impl ForecastMethod {
    pub fn build(self, interval_width: f64) -> Box<dyn Forecaster> {
        match self {
            ForecastMethod::Holt => Box::new(HoltForecaster::new(interval_width)),
            ForecastMethod::Linear => Box::new(LinearTrendForecaster::new(interval_width)),
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMethod::Holt => write!(f, "holt"),
            ForecastMethod::Linear => write!(f, "linear"),
        }
    }
}

impl FromStr for ForecastMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "holt" => Ok(ForecastMethod::Holt),
            "linear" => Ok(ForecastMethod::Linear),
            other => Err(format!("unknown forecast method '{other}' (expected holt or linear)")),
        }
    }
}

/// Two-sided z-score for a central interval of the given width.
///
/// `width` must lie in (0, 1); 0.8 gives ~1.2816, 0.95 gives ~1.96.
pub fn z_score(width: f64) -> f64 {
    inverse_normal_cdf(0.5 + width / 2.0)
}

/// Acklam's rational approximation of the standard normal quantile.
/// Relative error below 1.2e-9 over (0, 1).
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Validate an interval width shared by all bundled forecasters.
pub(crate) fn check_interval_width(width: f64) -> Result<(), ForecastError> {
    if width > 0.0 && width < 1.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter {
            name: "interval_width".into(),
            reason: format!("{width} is not in (0, 1)"),
        })
    }
}
