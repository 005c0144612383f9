//! CSV series loader.
//!
//! Reads a file with at least a `date` and a `close` column (header names are
//! matched case-insensitively; `Date`/`Close` from common exports work as-is).
//! Other columns are ignored. Empty close cells are treated as missing.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::provider::{normalize_rows, DataError, SeriesLoader};
use crate::domain::PriceSeries;

/// Loads a single symbol's closes from a CSV file.
///
/// The symbol argument of `load_series` only labels the result; the file is
/// assumed to hold one instrument.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(&self) -> Result<Vec<(NaiveDate, Option<f64>)>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::File(format!("{}: {e}", self.path.display())))?;

        let headers = reader
            .headers()
            .map_err(|e| DataError::File(format!("{}: {e}", self.path.display())))?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    DataError::File(format!(
                        "{}: missing '{name}' column",
                        self.path.display()
                    ))
                })
        };
        let date_col = column("date")?;
        let close_col = column("close")?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| DataError::File(e.to_string()))?;
            let raw_date = record.get(date_col).unwrap_or_default();
            // Accept plain dates and datetime stamps; keep only the date part.
            let date = NaiveDate::parse_from_str(raw_date.get(..10).unwrap_or(raw_date), "%Y-%m-%d")
                .map_err(|e| {
                    DataError::File(format!(
                        "{} row {}: bad date '{raw_date}': {e}",
                        self.path.display(),
                        line + 2
                    ))
                })?;
            let raw_close = record.get(close_col).unwrap_or_default();
            let close = if raw_close.is_empty() {
                None
            } else {
                Some(raw_close.parse::<f64>().map_err(|e| {
                    DataError::File(format!(
                        "{} row {}: bad close '{raw_close}': {e}",
                        self.path.display(),
                        line + 2
                    ))
                })?)
            };
            rows.push((date, close));
        }
        Ok(rows)
    }
}

impl SeriesLoader for CsvLoader {
    fn name(&self) -> &str {
        "csv"
    }

    fn load_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let rows = self.read_rows()?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "read csv");
        normalize_rows(symbol, rows, start, end)
    }
}
