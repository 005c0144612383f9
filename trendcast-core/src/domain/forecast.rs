//! Forecast interval at the horizon and the price levels derived from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Predictive interval for the final forecast period.
///
/// # Invariant
/// `lower_bound <= point_estimate <= upper_bound`. The forecast adapter is the
/// only producer and clips before returning; `adjusted` records that it had to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastInterval {
    pub horizon_date: NaiveDate,
    pub lower_bound: f64,
    pub point_estimate: f64,
    pub upper_bound: f64,
    /// True when the raw forecaster row violated the ordering and was clipped.
    pub adjusted: bool,
}

impl ForecastInterval {
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    pub fn is_ordered(&self) -> bool {
        self.lower_bound <= self.point_estimate && self.point_estimate <= self.upper_bound
    }
}

/// "One level to buy, one level to sell" derived from a forecast interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestedLevels {
    /// Lower bound, floored at zero.
    pub buy: f64,
    /// Upper bound.
    pub sell: f64,
    pub horizon_date: NaiveDate,
}

impl SuggestedLevels {
    pub fn from_interval(interval: &ForecastInterval) -> Self {
        Self {
            buy: interval.lower_bound.max(0.0),
            sell: interval.upper_bound,
            horizon_date: interval.horizon_date,
        }
    }

    /// Human-readable suggestion line.
    pub fn message(&self) -> String {
        format!(
            "If price hits {:.2}, you might want to consider buying. \
             If price hits {:.2}, you might want to consider selling.",
            self.buy, self.sell
        )
    }
}
