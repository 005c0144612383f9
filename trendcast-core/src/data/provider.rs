//! Series loader trait and structured error types.
//!
//! The SeriesLoader trait abstracts over data sources (Yahoo Finance, CSV
//! files, synthetic walks) so the pipeline can swap them and tests can mock
//! them.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{PricePoint, PriceSeries};

/// Structured error types for data operations.
///
/// These are designed to be displayable as a one-line CLI status.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request for {symbol} timed out after {timeout_secs}s")]
    Timeout { symbol: String, timeout_secs: u64 },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data for {symbol} in the requested window")]
    EmptyResult { symbol: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("file error: {0}")]
    File(String),

    #[error("invalid series from loader: {0}")]
    InvalidSeries(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for series loaders.
///
/// Implementations deliver one close per date, strictly ascending, already
/// normalized. An empty result is allowed here; the pipeline treats it as
/// `DataUnavailable`.
pub trait SeriesLoader: Send + Sync {
    /// Human-readable name of this loader.
    fn name(&self) -> &str;

    /// Load daily closes for `symbol` with dates in `[start, end]`.
    fn load_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError>;
}

/// Normalize raw (date, close) rows into a valid series.
///
/// - Rows with a missing, non-finite or negative close are dropped.
/// - Rows outside `[start, end]` are dropped.
/// - Rows are sorted by date; for duplicate dates the last row wins.
pub fn normalize_rows(
    symbol: &str,
    rows: impl IntoIterator<Item = (NaiveDate, Option<f64>)>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, DataError> {
    let mut points: Vec<PricePoint> = rows
        .into_iter()
        .filter(|(date, _)| *date >= start && *date <= end)
        .filter_map(|(date, close)| match close {
            Some(c) if c.is_finite() && c >= 0.0 => Some(PricePoint::new(date, c)),
            _ => None,
        })
        .collect();

    // Stable sort keeps provider order within a date, so `last` is the latest row.
    points.sort_by_key(|p| p.date);
    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for p in points {
        match deduped.last_mut() {
            Some(prev) if prev.date == p.date => *prev = p,
            _ => deduped.push(p),
        }
    }

    PriceSeries::new(symbol, deduped).map_err(|e| DataError::InvalidSeries(e.to_string()))
}
