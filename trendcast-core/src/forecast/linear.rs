//! Least-squares linear trend over calendar days.
//!
//! y = intercept + slope * x, x = days since the first observation.
//! Prediction interval: point ± z * s * sqrt(1 + 1/n + (x - x̄)² / Sxx), with
//! s the residual standard error on n - 2 degrees of freedom.

use chrono::{Days, NaiveDate};

use super::{
    check_interval_width, z_score, FittedModel, ForecastError, ForecastFrame, Forecaster,
    PredictionRow,
};

const MIN_OBSERVATIONS: usize = 3;

#[derive(Debug, Clone)]
pub struct LinearTrendForecaster {
    interval_width: f64,
}

impl LinearTrendForecaster {
    pub fn new(interval_width: f64) -> Self {
        Self { interval_width }
    }
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl Forecaster for LinearTrendForecaster {
    fn name(&self) -> &str {
        "linear_trend"
    }

    fn fit(&self, frame: &ForecastFrame) -> Result<Box<dyn FittedModel>, ForecastError> {
        check_interval_width(self.interval_width)?;
        let n = frame.len();
        if n < MIN_OBSERVATIONS {
            return Err(ForecastError::TooShort {
                required: MIN_OBSERVATIONS,
                actual: n,
            });
        }
        let last_date = frame
            .last_date()
            .ok_or_else(|| ForecastError::NotConverged("empty frame".into()))?;

        let x = frame.day_offsets();
        let y = &frame.y;
        let nf = n as f64;
        let x_mean = x.iter().sum::<f64>() / nf;
        let y_mean = y.iter().sum::<f64>() / nf;

        let sxx: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();
        if sxx <= 0.0 {
            return Err(ForecastError::NotConverged(
                "all observations share one date".into(),
            ));
        }
        let sxy: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
            .sum();
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let sse: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (yi - (intercept + slope * xi)).powi(2))
            .sum();
        let residual_se = (sse / (nf - 2.0)).sqrt();

        if !slope.is_finite() || !intercept.is_finite() || !residual_se.is_finite() {
            return Err(ForecastError::NotConverged(
                "least-squares solution is not finite".into(),
            ));
        }

        tracing::debug!(slope, intercept, residual_se, "linear trend fit");

        Ok(Box::new(LinearTrendModel {
            intercept,
            slope,
            residual_se,
            z: z_score(self.interval_width),
            n: nf,
            x_mean,
            sxx,
            last_offset: x[n - 1],
            last_date,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct LinearTrendModel {
    intercept: f64,
    slope: f64,
    residual_se: f64,
    z: f64,
    n: f64,
    x_mean: f64,
    sxx: f64,
    last_offset: f64,
    last_date: NaiveDate,
}

impl FittedModel for LinearTrendModel {
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
                let x = self.last_offset + day as f64;
                let point = self.intercept + self.slope * x;
                let leverage = 1.0 + 1.0 / self.n + (x - self.x_mean).powi(2) / self.sxx;
                let half = self.z * self.residual_se * leverage.sqrt();
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
