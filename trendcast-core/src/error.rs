//! Core error taxonomy.
//!
//! Every pipeline stage returns an `AnalysisError` rather than a partial result.
//! Component-level errors (`DataError`, `ForecastError`, `ConfigError`) carry
//! source detail and are folded into this taxonomy at the core boundary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;

/// Failure of a single analysis stage.
///
/// Designed to be displayable as a one-line status message in the CLI.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// The loader returned nothing, failed, or timed out.
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] DataError),

    /// The series is too short for the requested computation.
    #[error("insufficient data: need at least {required} point(s), got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Two series that must be aligned are not. Indicates a caller bug.
    #[error("misaligned series: {0}")]
    MisalignedSeries(String),

    /// Confirmation window is not smaller than the series length.
    #[error("invalid confirmation window {window} for series of length {len}")]
    InvalidWindow { window: usize, len: usize },

    /// The forecaster could not fit, converge, or produce a usable row.
    #[error("forecast unavailable: {reason}")]
    ForecastUnavailable { reason: String },

    /// EMA span must be a positive integer.
    #[error("invalid span {0}: must be >= 1")]
    InvalidSpan(usize),

    /// Points violate the price series invariant (ordering, finiteness, sign).
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl AnalysisError {
    /// Stable machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataUnavailable(_) => "DataUnavailable",
            Self::InsufficientData { .. } => "InsufficientData",
            Self::MisalignedSeries(_) => "MisalignedSeries",
            Self::InvalidWindow { .. } => "InvalidWindow",
            Self::ForecastUnavailable { .. } => "ForecastUnavailable",
            Self::InvalidSpan(_) => "InvalidSpan",
            Self::InvalidSeries(_) => "InvalidSeries",
            Self::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_error_converts_to_data_unavailable() {
        let err: AnalysisError = DataError::EmptyResult {
            symbol: "SPY".into(),
        }
        .into();
        assert_eq!(err.kind(), "DataUnavailable");
        assert!(err.to_string().contains("SPY"));
    }

    #[test]
    fn messages_are_single_line() {
        let errors = [
            AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            },
            AnalysisError::InvalidWindow { window: 5, len: 3 },
            AnalysisError::ForecastUnavailable {
                reason: "fit did not converge".into(),
            },
        ];
        for err in &errors {
            assert!(!err.to_string().contains('\n'), "{err}");
        }
    }
}
