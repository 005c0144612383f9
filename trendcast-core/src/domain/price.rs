//! PriceSeries: the daily close series every stage consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// One daily close for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ordered daily close series for one symbol.
///
/// # Invariants
/// - Dates are strictly increasing (gaps allowed, duplicates and reordering not).
/// - Every close is finite and >= 0.
///
/// The only way to build a non-empty series is through [`PriceSeries::new`],
/// which checks both invariants. Loaders are responsible for normalizing raw
/// provider output before calling it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        validate_points(&points)?;
        Ok(Self {
            symbol: symbol.into(),
            points,
        })
    }

    /// Empty series for `symbol`. Valid by construction.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    /// Build from parallel date/close vectors.
    pub fn from_columns(
        symbol: impl Into<String>,
        dates: &[NaiveDate],
        closes: &[f64],
    ) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(AnalysisError::InvalidSeries(format!(
                "{} dates but {} closes",
                dates.len(),
                closes.len()
            )));
        }
        let points = dates
            .iter()
            .zip(closes)
            .map(|(&date, &close)| PricePoint { date, close })
            .collect();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Check the series invariant over a slice of points.
pub fn validate_points(points: &[PricePoint]) -> Result<()> {
    for (i, p) in points.iter().enumerate() {
        if !p.close.is_finite() {
            return Err(AnalysisError::InvalidSeries(format!(
                "non-finite close {} on {}",
                p.close, p.date
            )));
        }
        if p.close < 0.0 {
            return Err(AnalysisError::InvalidSeries(format!(
                "negative close {} on {}",
                p.close, p.date
            )));
        }
        if i > 0 && p.date <= points[i - 1].date {
            return Err(AnalysisError::InvalidSeries(format!(
                "date {} does not follow {}",
                p.date,
                points[i - 1].date
            )));
        }
    }
    Ok(())
}
