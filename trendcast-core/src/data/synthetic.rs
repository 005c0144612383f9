//! Synthetic series loader for offline runs and tests.
//!
//! Produces a random walk from a starting price of 100.0 over weekdays only.
//! The walk is seeded from a BLAKE3 hash of the symbol, so the same symbol and
//! window always give the same series.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, SeriesLoader};
use crate::domain::{PricePoint, PriceSeries};

#[derive(Debug, Clone)]
pub struct SyntheticLoader {
    start_price: f64,
    /// Maximum absolute daily return.
    max_daily_move: f64,
}

impl SyntheticLoader {
    pub fn new(start_price: f64, max_daily_move: f64) -> Self {
        Self {
            start_price,
            max_daily_move,
        }
    }
}

impl Default for SyntheticLoader {
    fn default() -> Self {
        Self::new(100.0, 0.03)
    }
}

impl SeriesLoader for SyntheticLoader {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        if !(self.max_daily_move > 0.0 && self.max_daily_move < 1.0) {
            return Err(DataError::InvalidRequest(format!(
                "max daily move {} is not in (0, 1)",
                self.max_daily_move
            )));
        }

        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut points = Vec::new();
        let mut price = self.start_price;
        let mut current = start;

        while current <= end {
            let weekday = current.weekday();
            if weekday != Weekday::Sat && weekday != Weekday::Sun {
                let daily_return: f64 = rng.gen_range(-self.max_daily_move..self.max_daily_move);
                price *= 1.0 + daily_return;
                points.push(PricePoint::new(current, price));
            }
            current += chrono::Duration::days(1);
        }

        PriceSeries::new(symbol, points).map_err(|e| DataError::InvalidSeries(e.to_string()))
    }
}
