//! Holt's linear trend method (double exponential smoothing).
//!
//! level[t] = alpha * y[t] + (1 - alpha) * (level[t-1] + trend[t-1])
//! trend[t] = beta * (level[t] - level[t-1]) + (1 - beta) * trend[t-1]
//!
//! Seed: level = y[0], trend = y[1] - y[0].
//!
//! alpha and beta are picked by grid search on in-sample one-step-ahead squared
//! error. The model steps once per observation; predictions are converted to
//! calendar days with the mean observed spacing, so a 30-day horizon over a
//! weekday-only series is ~21 observation steps.

use chrono::Days;

use super::{
    check_interval_width, z_score, FittedModel, ForecastError, ForecastFrame, Forecaster,
    PredictionRow,
};

/// Minimum observations: two to seed, one more to produce a residual.
const MIN_OBSERVATIONS: usize = 3;

/// Candidate values for both alpha and beta.
const GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

#[derive(Debug, Clone)]
pub struct HoltForecaster {
    interval_width: f64,
}

impl HoltForecaster {
    pub fn new(interval_width: f64) -> Self {
        Self { interval_width }
    }
}

impl Default for HoltForecaster {
    fn default() -> Self {
        Self::new(0.8)
    }
}

/// Result of smoothing a series with fixed parameters.
#[derive(Debug, Clone, Copy)]
struct Pass {
    level: f64,
    trend: f64,
    sse: f64,
    residuals: usize,
}

fn smooth(y: &[f64], alpha: f64, beta: f64) -> Pass {
    let mut level = y[0];
    let mut trend = y[1] - y[0];
    let mut sse = 0.0;
    let mut residuals = 0;

    for (i, &value) in y.iter().enumerate().skip(1) {
        // The seed trend makes the step-1 forecast exact; it carries no error signal.
        if i >= 2 {
            let err = value - (level + trend);
            sse += err * err;
            residuals += 1;
        }
        let prev_level = level;
        level = alpha * value + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }

    Pass {
        level,
        trend,
        sse,
        residuals,
    }
}

impl Forecaster for HoltForecaster {
    fn name(&self) -> &str {
        "holt"
    }

    fn fit(&self, frame: &ForecastFrame) -> Result<Box<dyn FittedModel>, ForecastError> {
        check_interval_width(self.interval_width)?;
        if frame.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::TooShort {
                required: MIN_OBSERVATIONS,
                actual: frame.len(),
            });
        }
        let last_date = frame
            .last_date()
            .ok_or_else(|| ForecastError::NotConverged("empty frame".into()))?;
        let spacing = frame
            .mean_spacing_days()
            .filter(|s| *s > 0.0)
            .ok_or_else(|| ForecastError::NotConverged("observations share one date".into()))?;

        let mut best: Option<(f64, f64, Pass)> = None;
        for &alpha in &GRID {
            for &beta in &GRID {
                let pass = smooth(&frame.y, alpha, beta);
                if !pass.sse.is_finite() || !pass.level.is_finite() || !pass.trend.is_finite() {
                    continue;
                }
                if best.map_or(true, |(_, _, b)| pass.sse < b.sse) {
                    best = Some((alpha, beta, pass));
                }
            }
        }

        let (alpha, beta, pass) = best.ok_or_else(|| {
            ForecastError::NotConverged("no (alpha, beta) candidate gave a finite error".into())
        })?;
        let sigma = (pass.sse / pass.residuals as f64).sqrt();

        tracing::debug!(
            alpha,
            beta,
            level = pass.level,
            trend = pass.trend,
            sigma,
            "holt fit"
        );

        Ok(Box::new(HoltModel {
            level: pass.level,
            trend: pass.trend,
            sigma,
            z: z_score(self.interval_width),
            spacing_days: spacing,
            last_date,
        }))
    }
}

/// Fitted Holt model.
#[derive(Debug, Clone)]
pub struct HoltModel {
    level: f64,
    trend: f64,
    sigma: f64,
    z: f64,
    spacing_days: f64,
    last_date: chrono::NaiveDate,
}

impl FittedModel for HoltModel {
    fn predict(&self, horizon: usize) -> Result<Vec<PredictionRow>, ForecastError> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter {
                name: "horizon".into(),
                reason: "must be >= 1".into(),
            });
        }

        (1..=horizon)
            .map(|day| {
                let date = self
                    .last_date
                    .checked_add_days(Days::new(day as u64))
                    .ok_or_else(|| ForecastError::InvalidParameter {
                        name: "horizon".into(),
                        reason: format!("{day} days past {} is out of range", self.last_date),
                    })?;
                let steps = day as f64 / self.spacing_days;
                let point = self.level + steps * self.trend;
                let half = self.z * self.sigma * steps.sqrt();
                Ok(PredictionRow {
                    date,
                    point,
                    lower: point - half,
                    upper: point + half,
                })
            })
            .collect()
    }
}
