//! Forecast adapter: series in, one ordered interval at the horizon out.
//!
//! Only the terminal-horizon row is exposed; intermediate rows are dropped.

use super::{ForecastError, ForecastFrame, Forecaster, PredictionRow};
use crate::config::MAX_HORIZON_DAYS;
use crate::domain::{ForecastInterval, PriceSeries};
use crate::error::{AnalysisError, Result};

/// Fewest observations the adapter will hand to a forecaster.
pub const MIN_FORECAST_POINTS: usize = 3;

/// Wraps a forecaster and enforces the interval contract.
pub struct ForecastAdapter<'a> {
    forecaster: &'a dyn Forecaster,
}

impl<'a> ForecastAdapter<'a> {
    pub fn new(forecaster: &'a dyn Forecaster) -> Self {
        Self { forecaster }
    }

    /// Project `series` forward `horizon` calendar days.
    ///
    /// # Errors
    /// `ForecastUnavailable` when the horizon is zero or beyond
    /// `MAX_HORIZON_DAYS`, the series has fewer than
    /// `MIN_FORECAST_POINTS` points, the forecaster fails, or its terminal row
    /// is not finite.
    pub fn forecast(&self, series: &PriceSeries, horizon: usize) -> Result<ForecastInterval> {
        if horizon == 0 {
            return Err(unavailable("horizon must be at least 1 day"));
        }
        if horizon > MAX_HORIZON_DAYS {
            return Err(unavailable(format!(
                "horizon of {horizon} days exceeds {MAX_HORIZON_DAYS}"
            )));
        }
        if series.len() < MIN_FORECAST_POINTS {
            return Err(unavailable(format!(
                "need at least {MIN_FORECAST_POINTS} points, got {}",
                series.len()
            )));
        }

        let frame = ForecastFrame::from_series(series);
        let model = self.forecaster.fit(&frame).map_err(from_forecaster)?;
        let rows = model.predict(horizon).map_err(from_forecaster)?;
        let last = rows
            .last()
            .ok_or_else(|| unavailable("forecaster returned no rows"))?;

        let interval = enforce_ordering(last)?;
        if interval.adjusted {
            tracing::warn!(
                forecaster = self.forecaster.name(),
                symbol = series.symbol(),
                raw_lower = last.lower,
                raw_point = last.point,
                raw_upper = last.upper,
                "forecast row out of order; clipped"
            );
        }
        tracing::debug!(
            forecaster = self.forecaster.name(),
            horizon,
            lower = interval.lower_bound,
            point = interval.point_estimate,
            upper = interval.upper_bound,
            "forecast interval"
        );
        Ok(interval)
    }
}

/// Turn a raw row into an interval satisfying lower <= point <= upper.
///
/// Swapped bounds are reordered and an out-of-range point is clamped into the
/// bounds; either repair sets `adjusted`. Non-finite rows are rejected.
pub fn enforce_ordering(row: &PredictionRow) -> Result<ForecastInterval> {
    if !(row.point.is_finite() && row.lower.is_finite() && row.upper.is_finite()) {
        return Err(unavailable(format!(
            "non-finite prediction for {}",
            row.date
        )));
    }

    let lower = row.lower.min(row.upper);
    let upper = row.lower.max(row.upper);
    let point = row.point.clamp(lower, upper);
    let adjusted = lower != row.lower || point != row.point;

    Ok(ForecastInterval {
        horizon_date: row.date,
        lower_bound: lower,
        point_estimate: point,
        upper_bound: upper,
        adjusted,
    })
}

fn unavailable(reason: impl Into<String>) -> AnalysisError {
    AnalysisError::ForecastUnavailable {
        reason: reason.into(),
    }
}

fn from_forecaster(err: ForecastError) -> AnalysisError {
    unavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use crate::forecast::{FittedModel, HoltForecaster};
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            "T",
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(base + chrono::Duration::days(i as i64), c))
                .collect(),
        )
        .unwrap()
    }

    fn row(lower: f64, point: f64, upper: f64) -> PredictionRow {
        PredictionRow {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            point,
            lower,
            upper,
        }
    }

    /// Forecaster that returns fixed rows regardless of input.
    struct Canned(Vec<PredictionRow>);

    struct CannedModel(Vec<PredictionRow>);

    impl FittedModel for CannedModel {
        fn predict(&self, _horizon: usize) -> std::result::Result<Vec<PredictionRow>, ForecastError> {
            Ok(self.0.clone())
        }
    }

    impl Forecaster for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        fn fit(
            &self,
            _frame: &ForecastFrame,
        ) -> std::result::Result<Box<dyn FittedModel>, ForecastError> {
            Ok(Box::new(CannedModel(self.0.clone())))
        }
    }

    struct Diverging;

    impl Forecaster for Diverging {
        fn name(&self) -> &str {
            "diverging"
        }

        fn fit(
            &self,
            _frame: &ForecastFrame,
        ) -> std::result::Result<Box<dyn FittedModel>, ForecastError> {
            Err(ForecastError::NotConverged("max iterations".into()))
        }
    }

    #[test]
    fn takes_terminal_row() {
        let canned = Canned(vec![row(1.0, 2.0, 3.0), row(10.0, 20.0, 30.0)]);
        let interval = ForecastAdapter::new(&canned)
            .forecast(&series(&[1.0, 2.0, 3.0]), 2)
            .unwrap();
        assert_eq!(interval.point_estimate, 20.0);
        assert!(!interval.adjusted);
    }

    #[test]
    fn clips_point_above_upper() {
        let canned = Canned(vec![row(1.0, 5.0, 3.0)]);
        let interval = ForecastAdapter::new(&canned)
            .forecast(&series(&[1.0, 2.0, 3.0]), 1)
            .unwrap();
        assert_eq!(interval.point_estimate, 3.0);
        assert!(interval.adjusted);
        assert!(interval.is_ordered());
    }

    #[test]
    fn swapped_bounds_are_reordered() {
        let interval = enforce_ordering(&row(9.0, 5.0, 1.0)).unwrap();
        assert_eq!(interval.lower_bound, 1.0);
        assert_eq!(interval.upper_bound, 9.0);
        assert_eq!(interval.point_estimate, 5.0);
        assert!(interval.adjusted);
    }

    #[test]
    fn non_finite_row_is_unavailable() {
        let err = enforce_ordering(&row(f64::NAN, 1.0, 2.0)).unwrap_err();
        assert_eq!(err.kind(), "ForecastUnavailable");
    }

    #[test]
    fn empty_prediction_is_unavailable() {
        let canned = Canned(vec![]);
        let err = ForecastAdapter::new(&canned)
            .forecast(&series(&[1.0, 2.0, 3.0]), 1)
            .unwrap_err();
        assert_eq!(err.kind(), "ForecastUnavailable");
    }

    #[test]
    fn fit_failure_maps_to_unavailable() {
        let err = ForecastAdapter::new(&Diverging)
            .forecast(&series(&[1.0, 2.0, 3.0, 4.0]), 5)
            .unwrap_err();
        assert_eq!(err.kind(), "ForecastUnavailable");
        assert!(err.to_string().contains("max iterations"));
    }

    #[test]
    fn short_series_is_unavailable() {
        let holt = HoltForecaster::default();
        let adapter = ForecastAdapter::new(&holt);
        assert!(adapter.forecast(&PriceSeries::empty("T"), 30).is_err());
        assert!(adapter.forecast(&series(&[1.0, 2.0]), 30).is_err());
        assert!(adapter.forecast(&series(&[1.0, 2.0, 3.0]), 30).is_ok());
    }

    #[test]
    fn zero_horizon_is_unavailable() {
        let holt = HoltForecaster::default();
        let err = ForecastAdapter::new(&holt)
            .forecast(&series(&[1.0, 2.0, 3.0]), 0)
            .unwrap_err();
        assert_eq!(err.kind(), "ForecastUnavailable");
    }

    #[test]
    fn horizon_beyond_cap_is_unavailable_without_predicting() {
        let holt = HoltForecaster::default();
        let adapter = ForecastAdapter::new(&holt);
        let s = series(&[1.0, 2.0, 3.0]);
        let err = adapter.forecast(&s, 200_000_000).unwrap_err();
        assert_eq!(err.kind(), "ForecastUnavailable");
        assert!(adapter.forecast(&s, MAX_HORIZON_DAYS).is_ok());
    }

    #[test]
    fn horizon_date_is_last_date_plus_horizon() {
        let holt = HoltForecaster::default();
        let s = series(&[10.0, 11.0, 10.5, 12.0, 11.5]);
        let interval = ForecastAdapter::new(&holt).forecast(&s, 30).unwrap();
        assert_eq!(
            interval.horizon_date,
            s.last().unwrap().date + chrono::Duration::days(30)
        );
        assert!(interval.is_ordered());
    }
}
