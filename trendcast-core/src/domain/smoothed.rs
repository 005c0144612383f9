//! SmoothedSeries: an indicator curve aligned one-to-one with its source.

use chrono::NaiveDate;
use serde::Serialize;

use super::PriceSeries;
use crate::error::{AnalysisError, Result};

/// EMA output for one span, aligned with the source `PriceSeries`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedSeries {
    span: usize,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl SmoothedSeries {
    /// Pair computed values with the source dates.
    ///
    /// Fails with `MisalignedSeries` when the lengths disagree.
    pub fn aligned_with(source: &PriceSeries, span: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != source.len() {
            return Err(AnalysisError::MisalignedSeries(format!(
                "span {span}: {} values for {} source points",
                values.len(),
                source.len()
            )));
        }
        Ok(Self {
            span,
            dates: source.dates(),
            values,
        })
    }

    pub fn span(&self) -> usize {
        self.span
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Display name used by the presentation layer, e.g. `EMA 13`.
    pub fn label(&self) -> String {
        format!("EMA {}", self.span)
    }

    /// Check that `other` covers exactly the same dates.
    pub fn ensure_aligned(&self, other: &SmoothedSeries) -> Result<()> {
        if self.len() != other.len() {
            return Err(AnalysisError::MisalignedSeries(format!(
                "EMA {} has {} points, EMA {} has {}",
                self.span,
                self.len(),
                other.span,
                other.len()
            )));
        }
        if let Some(i) = (0..self.len()).find(|&i| self.dates[i] != other.dates[i]) {
            return Err(AnalysisError::MisalignedSeries(format!(
                "dates diverge at index {i}: {} vs {}",
                self.dates[i], other.dates[i]
            )));
        }
        Ok(())
    }
}
