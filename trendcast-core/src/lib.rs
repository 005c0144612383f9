//! TrendCast Core: price smoothing, crossover signals and forecast levels.
//!
//! This crate contains the analytical pipeline:
//! - Domain types (price series, smoothed series, signal events, intervals)
//! - Exponential moving averages over a loaded series
//! - Crossover detection with a confirmation window
//! - Forecast adapter over pluggable univariate forecasters
//! - Series loaders (Yahoo Finance, CSV, synthetic)
//! - The `analyze`/`run` pipeline that ties them together

pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod indicators;
pub mod signals;

pub use analysis::{analyze, run, AnalysisReport};
pub use config::{AnalysisConfig, ConfigError, SignalMode};
pub use error::{AnalysisError, Result};
