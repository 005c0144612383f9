//! Yahoo Finance series loader.
//!
//! Fetches daily closes from Yahoo's v8 chart API. Every request is bounded by
//! the caller-supplied timeout; connect failures, timeouts and 429s are retried
//! with exponential backoff a fixed number of times.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. The CSV loader is the fallback when Yahoo is unavailable.

use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use super::provider::{normalize_rows, DataError, SeriesLoader};
use crate::domain::PriceSeries;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Exchange metadata; `gmtoffset` is seconds east of UTC.
#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

/// Yahoo Finance loader.
pub struct YahooLoader {
    client: reqwest::blocking::Client,
    timeout: Duration,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooLoader {
    /// Build a loader whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Build the chart API URL for a symbol and date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<String, DataError> {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DataError::InvalidRequest(format!("bad start date {start}")))?
            .and_utc()
            .timestamp();
        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| DataError::InvalidRequest(format!("bad end date {end}")))?
            .and_utc()
            .timestamp();
        Ok(format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d"
        ))
    }

    /// Parse the chart API response into a normalized close series.
    fn parse_response(
        symbol: &str,
        resp: ChartResponse,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A valid symbol with no trading days in the window has no timestamps.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        // Bars are dated in exchange-local time; UTC when the offset is absent.
        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = ts
                .checked_add(offset)
                .and_then(|local| chrono::DateTime::from_timestamp(local, 0))
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;
            rows.push((date, quote.close.get(i).copied().flatten()));
        }

        normalize_rows(symbol, rows, start, end)
    }

    /// Execute the HTTP request with retry.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let url = Self::chart_url(symbol, start, end)?;
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, ?delay, "retrying yahoo request");
                std::thread::sleep(delay);
            }

            match self.client.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        tracing::warn!(symbol, retry_after, "rate limited by yahoo");
                        last_error = Some(DataError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::SymbolNotFound {
                            symbol: symbol.to_string(),
                        });
                    }

                    if !status.is_success() {
                        last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                        continue;
                    }

                    let chart: ChartResponse = resp.json().map_err(|e| {
                        if e.is_timeout() {
                            self.timeout_error(symbol)
                        } else {
                            DataError::ResponseFormatChanged(format!(
                                "failed to parse response for {symbol}: {e}"
                            ))
                        }
                    })?;

                    return Self::parse_response(symbol, chart, start, end);
                }
                Err(e) => {
                    if e.is_timeout() {
                        tracing::warn!(symbol, attempt, "yahoo request timed out");
                        last_error = Some(self.timeout_error(symbol));
                        continue;
                    }
                    if e.is_connect() {
                        last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(DataError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }

    fn timeout_error(&self, symbol: &str) -> DataError {
        DataError::Timeout {
            symbol: symbol.to_string(),
            timeout_secs: self.timeout.as_secs(),
        }
    }
}

impl SeriesLoader for YahooLoader {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn load_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        if symbol.trim().is_empty() {
            return Err(DataError::InvalidRequest("empty symbol".into()));
        }
        if start > end {
            return Err(DataError::InvalidRequest(format!(
                "start {start} is after end {end}"
            )));
        }
        self.fetch_with_retry(symbol, start, end)
    }
}
