//! Analysis pipeline: one symbol, one config, one report.
//!
//! Loader → smoothing → crossover detection, and independently loader →
//! forecast. Each branch carries its own result so a forecast failure never
//! hides the signals and vice versa.

use chrono::{Days, NaiveDate};

use crate::config::{AnalysisConfig, ConfigError};
use crate::data::{DataError, SeriesLoader};
use crate::domain::{ForecastInterval, PriceSeries, SignalEvent, SmoothedSeries, SuggestedLevels};
use crate::error::{AnalysisError, Result};
use crate::forecast::{ForecastAdapter, Forecaster};
use crate::indicators::smooth_all;
use crate::signals::CrossoverDetector;

/// Everything the presentation layer needs to render one symbol.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub symbol: String,
    pub series: PriceSeries,
    /// Last observed close.
    pub current_price: Option<f64>,
    /// One EMA per configured span, in config order.
    pub smoothed: Result<Vec<SmoothedSeries>>,
    pub signals: Result<Vec<SignalEvent>>,
    pub forecast: Result<ForecastInterval>,
    /// Present iff the forecast succeeded.
    pub levels: Option<SuggestedLevels>,
    /// BLAKE3 digest of the config that produced this report.
    pub config_fingerprint: String,
}

impl AnalysisReport {
    /// True when every branch produced a value.
    pub fn is_complete(&self) -> bool {
        self.smoothed.is_ok() && self.signals.is_ok() && self.forecast.is_ok()
    }

    /// The smoothed line with the given span, if smoothing succeeded.
    pub fn ema(&self, span: usize) -> Option<&SmoothedSeries> {
        self.smoothed
            .as_ref()
            .ok()
            .and_then(|lines| lines.iter().find(|line| line.span() == span))
    }

    /// Most recent signal, if any.
    pub fn latest_signal(&self) -> Option<&SignalEvent> {
        self.signals.as_ref().ok().and_then(|events| events.last())
    }
}

/// Analyze an already-loaded series.
///
/// Pure: the result depends only on the arguments. Fails only when `config`
/// does not validate; every stage failure is reported inside the report.
pub fn analyze(
    series: PriceSeries,
    config: &AnalysisConfig,
    forecaster: &dyn Forecaster,
) -> Result<AnalysisReport> {
    config.validate()?;
    let config_fingerprint = config.fingerprint()?;

    let smoothed = smooth_all(&series, &config.spans);
    let signals = match &smoothed {
        Ok(lines) => detect_signals(&series, lines, config),
        // Detector is never run on a failed smoothing branch.
        Err(e) => Err(e.clone()),
    };
    let forecast = ForecastAdapter::new(forecaster).forecast(&series, config.horizon_days);
    let levels = forecast.as_ref().ok().map(SuggestedLevels::from_interval);

    log_outcome(&series, &smoothed, &signals, &forecast);

    Ok(AnalysisReport {
        symbol: series.symbol().to_string(),
        current_price: series.last().map(|p| p.close),
        series,
        smoothed,
        signals,
        forecast,
        levels,
        config_fingerprint,
    })
}

/// Load `[today - lookback_days, today]` for `config.symbol` and analyze it.
///
/// # Errors
/// - `InvalidConfig` if the config does not validate.
/// - `DataUnavailable` if the loader fails or returns no points.
pub fn run(
    loader: &dyn SeriesLoader,
    forecaster: &dyn Forecaster,
    config: &AnalysisConfig,
    today: NaiveDate,
) -> Result<AnalysisReport> {
    config.validate()?;

    let start = today
        .checked_sub_days(Days::new(u64::from(config.lookback_days)))
        .ok_or_else(|| ConfigError::Invalid {
            field: "lookback_days",
            reason: format!("{} days before {today} is out of range", config.lookback_days),
        })?;
    tracing::info!(
        symbol = %config.symbol,
        loader = loader.name(),
        forecaster = forecaster.name(),
        %start,
        end = %today,
        "loading series"
    );

    let series = loader.load_series(&config.symbol, start, today)?;
    if series.is_empty() {
        return Err(DataError::EmptyResult {
            symbol: config.symbol.clone(),
        }
        .into());
    }

    analyze(series, config, forecaster)
}

fn detect_signals(
    series: &PriceSeries,
    lines: &[SmoothedSeries],
    config: &AnalysisConfig,
) -> Result<Vec<SignalEvent>> {
    let line = |span: usize| {
        lines
            .iter()
            .find(|line| line.span() == span)
            .ok_or(AnalysisError::InvalidSpan(span))
    };
    let fast = line(config.fast_span)?;
    let slow = line(config.slow_span)?;
    CrossoverDetector::new(config.confirmation_window()).detect(series, fast, slow)
}

fn log_outcome(
    series: &PriceSeries,
    smoothed: &Result<Vec<SmoothedSeries>>,
    signals: &Result<Vec<SignalEvent>>,
    forecast: &Result<ForecastInterval>,
) {
    let symbol = series.symbol();
    if let Err(e) = smoothed {
        tracing::warn!(symbol, kind = e.kind(), error = %e, "smoothing failed");
    }
    match signals {
        Ok(events) => tracing::debug!(symbol, events = events.len(), "signals detected"),
        Err(e) => tracing::warn!(symbol, kind = e.kind(), error = %e, "signal detection failed"),
    }
    if let Err(e) = forecast {
        tracing::warn!(symbol, kind = e.kind(), error = %e, "forecast failed");
    }
}
