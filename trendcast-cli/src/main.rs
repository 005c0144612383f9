//! TrendCast CLI: EMA crossover signals and forecast price levels.
//!
//! Commands:
//! - `analyze`: one-shot report for one or more symbols (text or JSON)
//! - `watch`: re-run the report for one symbol on a fixed interval

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trendcast_core::data::{CsvLoader, SeriesLoader, SyntheticLoader, YahooLoader};
use trendcast_core::forecast::{ForecastMethod, Forecaster};
use trendcast_core::{run, AnalysisConfig, AnalysisError, AnalysisReport, SignalMode};

#[derive(Parser)]
#[command(
    name = "trendcast",
    about = "TrendCast CLI: EMA crossover signals and forecast price levels"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more symbols once and print a report per symbol.
    Analyze {
        /// Symbols to analyze (e.g., SOL-USD AAPL SPY).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Emit one JSON document per symbol instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        options: AnalysisOptions,
    },
    /// Re-run the analysis for one symbol until interrupted.
    Watch {
        symbol: String,

        /// Seconds between refreshes.
        #[arg(long, default_value_t = 30)]
        interval_secs: u64,

        #[arg(long, default_value_t = false)]
        json: bool,

        #[command(flatten)]
        options: AnalysisOptions,
    },
}

/// Overrides applied on top of the defaults or the `--config` file.
#[derive(Args, Clone)]
struct AnalysisOptions {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Calendar days of history to load, ending today.
    #[arg(long)]
    lookback_days: Option<u32>,

    /// Comma-separated EMA spans (e.g., 5,8,13).
    #[arg(long, value_delimiter = ',')]
    spans: Option<Vec<usize>>,

    /// Fast EMA span for crossover detection.
    #[arg(long)]
    fast: Option<usize>,

    /// Slow EMA span for crossover detection.
    #[arg(long)]
    slow: Option<usize>,

    /// Signal mode: crossover (k = 0) or confirmed (k = 3).
    #[arg(long)]
    mode: Option<SignalMode>,

    /// Explicit confirmation window; overrides the mode.
    #[arg(long)]
    window: Option<usize>,

    /// Forecast horizon in calendar days.
    #[arg(long)]
    horizon: Option<usize>,

    /// Predictive interval coverage, in (0, 1).
    #[arg(long)]
    interval_width: Option<f64>,

    /// Forecaster: holt or linear.
    #[arg(long)]
    method: Option<ForecastMethod>,

    /// Read closes from a CSV file instead of Yahoo Finance.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Use a deterministic synthetic series instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Network timeout per request.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl AnalysisOptions {
    /// Defaults, then the config file, then explicit flags.
    fn to_config(&self, symbol: &str) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };
        config.symbol = symbol.to_string();
        if let Some(days) = self.lookback_days {
            config.lookback_days = days;
        }
        if let Some(spans) = &self.spans {
            config.spans = spans.clone();
        }
        if let Some(fast) = self.fast {
            config.fast_span = fast;
        }
        if let Some(slow) = self.slow {
            config.slow_span = slow;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(window) = self.window {
            config.confirmation_window = Some(window);
        }
        if let Some(horizon) = self.horizon {
            config.horizon_days = horizon;
        }
        if let Some(width) = self.interval_width {
            config.interval_width = width;
        }
        if let Some(method) = self.method {
            config.forecast_method = method;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }

    fn loader(&self, config: &AnalysisConfig) -> Result<Box<dyn SeriesLoader>> {
        if let Some(path) = &self.csv {
            return Ok(Box::new(CsvLoader::new(path)));
        }
        if self.synthetic {
            return Ok(Box::new(SyntheticLoader::default()));
        }
        Ok(Box::new(YahooLoader::new(config.timeout())?))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            symbols,
            json,
            options,
        } => run_analyze(&symbols, json, &options),
        Commands::Watch {
            symbol,
            interval_secs,
            json,
            options,
        } => run_watch(&symbol, interval_secs, json, &options),
    }
}

fn run_analyze(symbols: &[String], json: bool, options: &AnalysisOptions) -> Result<()> {
    let configs = symbols
        .iter()
        .map(|s| options.to_config(s))
        .collect::<Result<Vec<_>>>()?;
    let Some(first) = configs.first() else {
        bail!("at least one symbol is required");
    };
    let loader = options.loader(first)?;
    let forecaster = first.forecast_method.build(first.interval_width);
    let today = chrono::Local::now().date_naive();

    // Each symbol is an independent run; collect preserves input order.
    let outcomes: Vec<_> = configs
        .par_iter()
        .map(|config| {
            (
                config,
                run(loader.as_ref(), forecaster.as_ref(), config, today),
            )
        })
        .collect();

    let mut failed = 0;
    for (config, outcome) in &outcomes {
        if outcome.is_err() {
            failed += 1;
        }
        render(config, forecaster.as_ref(), outcome, json);
    }

    if failed > 0 {
        tracing::error!(failed, total = outcomes.len(), "some symbols could not be loaded");
        std::process::exit(1);
    }
    Ok(())
}

fn run_watch(symbol: &str, interval_secs: u64, json: bool, options: &AnalysisOptions) -> Result<()> {
    if interval_secs == 0 {
        bail!("--interval-secs must be at least 1");
    }
    let config = options.to_config(symbol)?;
    let loader = options.loader(&config)?;
    let forecaster = config.forecast_method.build(config.interval_width);
    let interval = Duration::from_secs(interval_secs);

    tracing::info!(symbol, interval_secs, loader = loader.name(), "watching");
    loop {
        let today = chrono::Local::now().date_naive();
        let outcome = run(loader.as_ref(), forecaster.as_ref(), &config, today);
        render(&config, forecaster.as_ref(), &outcome, json);
        std::thread::sleep(interval);
    }
}

fn render(
    config: &AnalysisConfig,
    forecaster: &dyn Forecaster,
    outcome: &trendcast_core::Result<AnalysisReport>,
    json: bool,
) {
    match (outcome, json) {
        (Ok(report), false) => print_report(config, forecaster, report),
        (Ok(report), true) => println!("{}", report_json(config, forecaster, report)),
        (Err(e), false) => println!("{}: {}", config.symbol, status_line(e)),
        (Err(e), true) => println!(
            "{}",
            json!({
                "symbol": config.symbol,
                "status": "error",
                "error": error_json(e),
            })
        ),
    }
}

/// One-line status for a failed stage, e.g. `[ForecastUnavailable] forecast unavailable: ...`.
fn status_line(err: &AnalysisError) -> String {
    format!("[{}] {err}", err.kind())
}

fn print_report(config: &AnalysisConfig, forecaster: &dyn Forecaster, report: &AnalysisReport) {
    println!("=== {} ===", report.symbol);
    if let (Some(first), Some(last)) = (report.series.first(), report.series.last()) {
        println!(
            "Data:      {} points, {} to {}",
            report.series.len(),
            first.date,
            last.date
        );
    }
    if let Some(price) = report.current_price {
        println!("Current:   {price:.2}");
    }

    match &report.smoothed {
        Ok(lines) => {
            let latest: Vec<String> = lines
                .iter()
                .filter_map(|line| line.last().map(|v| format!("{} {v:.2}", line.label())))
                .collect();
            println!("EMAs:      {}", latest.join("  "));
        }
        Err(e) => println!("EMAs:      {}", status_line(e)),
    }

    println!(
        "Signals:   EMA {} / EMA {}, confirmation k = {}",
        config.fast_span,
        config.slow_span,
        config.confirmation_window()
    );
    match &report.signals {
        Ok(events) if events.is_empty() => println!("  (no crossovers in window)"),
        Ok(events) => {
            for e in events {
                println!("  {}  {:<4} @ {:.2}", e.date, e.direction, e.price);
            }
        }
        Err(e) => println!("  {}", status_line(e)),
    }

    match &report.forecast {
        Ok(interval) => {
            println!(
                "Forecast:  {} over {} days to {}: {:.2} .. {:.2} (point {:.2}){}",
                forecaster.name(),
                config.horizon_days,
                interval.horizon_date,
                interval.lower_bound,
                interval.upper_bound,
                interval.point_estimate,
                if interval.adjusted { " [clipped]" } else { "" }
            );
        }
        Err(e) => println!("Forecast:  {}", status_line(e)),
    }
    if let Some(levels) = &report.levels {
        println!("{}", levels.message());
    }
    let hash = &report.config_fingerprint;
    println!("Config:    {}", hash.get(..12).unwrap_or(hash));
    println!();
}

fn report_json(config: &AnalysisConfig, forecaster: &dyn Forecaster, report: &AnalysisReport) -> Value {
    json!({
        "symbol": report.symbol,
        "status": "ok",
        "current_price": report.current_price,
        "series": report.series.points(),
        "smoothed": branch_json(&report.smoothed),
        "signals": branch_json(&report.signals),
        "forecast": branch_json(&report.forecast),
        "levels": report.levels,
        "forecaster": forecaster.name(),
        "confirmation_window": config.confirmation_window(),
        "config_fingerprint": report.config_fingerprint,
    })
}

fn branch_json<T: serde::Serialize>(branch: &trendcast_core::Result<T>) -> Value {
    match branch {
        Ok(value) => json!({ "ok": value }),
        Err(e) => json!({ "error": error_json(e) }),
    }
}

fn error_json(err: &AnalysisError) -> Value {
    json!({ "kind": err.kind(), "message": err.to_string() })
}
