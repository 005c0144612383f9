//! Serializable analysis configuration.
//!
//! The core never reads configuration from the environment: callers build an
//! `AnalysisConfig` (defaults, TOML file, CLI flags) and pass it in.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::forecast::ForecastMethod;

/// Longest history a run may request (about a century).
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

/// Furthest a forecast may project (ten years).
pub const MAX_HORIZON_DAYS: usize = 3_650;

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("serialize config: {0}")]
    Serialize(String),

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Signal detection mode. Each mode implies a default confirmation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalMode {
    /// Fire on the period the relation flips (k = 0).
    #[default]
    Crossover,
    /// Require three confirming periods (k = 3).
    Confirmed,
}

impl SignalMode {
    pub fn default_window(self) -> usize {
        match self {
            SignalMode::Crossover => 0,
            SignalMode::Confirmed => 3,
        }
    }
}

impl std::str::FromStr for SignalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crossover" => Ok(SignalMode::Crossover),
            "confirmed" => Ok(SignalMode::Confirmed),
            other => Err(format!(
                "unknown signal mode '{other}' (expected crossover or confirmed)"
            )),
        }
    }
}

/// Everything one analysis run needs besides the data itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ticker to analyze.
    pub symbol: String,
    /// Calendar days of history ending today.
    pub lookback_days: u32,
    /// EMA spans to compute and return.
    pub spans: Vec<usize>,
    /// Span of the fast line for crossover detection. Must be in `spans`.
    pub fast_span: usize,
    /// Span of the slow line for crossover detection. Must be in `spans`.
    pub slow_span: usize,
    pub mode: SignalMode,
    /// Explicit confirmation window; overrides the mode default.
    pub confirmation_window: Option<usize>,
    /// Calendar days to project forward.
    pub horizon_days: usize,
    /// Central coverage of the predictive interval, in (0, 1).
    pub interval_width: f64,
    pub forecast_method: ForecastMethod,
    /// Upper bound on each loader network request.
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            symbol: "SOL-USD".into(),
            lookback_days: 60,
            spans: vec![5, 8, 13],
            fast_span: 5,
            slow_span: 13,
            mode: SignalMode::Crossover,
            confirmation_window: None,
            horizon_days: 30,
            interval_width: 0.8,
            forecast_method: ForecastMethod::Holt,
            timeout_secs: 30,
        }
    }
}

impl AnalysisConfig {
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Confirmation window k in effect for this run.
    pub fn confirmation_window(&self) -> usize {
        self.confirmation_window
            .unwrap_or_else(|| self.mode.default_window())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol", "must not be empty"));
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(invalid(
                "lookback_days",
                format!("{} is not in 1..={MAX_LOOKBACK_DAYS}", self.lookback_days),
            ));
        }
        if self.spans.is_empty() {
            return Err(invalid("spans", "at least one span is required"));
        }
        if let Some(&bad) = self.spans.iter().find(|&&s| s == 0) {
            return Err(invalid("spans", format!("span {bad} must be >= 1")));
        }
        if self.fast_span == self.slow_span {
            return Err(invalid(
                "fast_span",
                format!("must differ from slow_span ({})", self.slow_span),
            ));
        }
        for (field, span) in [("fast_span", self.fast_span), ("slow_span", self.slow_span)] {
            if !self.spans.contains(&span) {
                return Err(invalid(
                    field,
                    format!("{span} is not one of the configured spans {:?}", self.spans),
                ));
            }
        }
        if !(1..=MAX_HORIZON_DAYS).contains(&self.horizon_days) {
            return Err(invalid(
                "horizon_days",
                format!("{} is not in 1..={MAX_HORIZON_DAYS}", self.horizon_days),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(invalid(
                "interval_width",
                format!("{} is not in (0, 1)", self.interval_width),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be >= 1"));
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hex digest of the full configuration.
    ///
    /// Two runs with identical configs share a fingerprint.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json =
            serde_json::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
