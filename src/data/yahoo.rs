//! Yahoo Finance daily chart integration.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::{PriceSource, date_from_unix};
use crate::domain::PriceSample;
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const DEFAULT_SYMBOL: &str = "BTC-USD";
const RANGE: &str = "max";
const INTERVAL: &str = "1d";

pub struct YahooChartSource {
    client: Client,
    base_url: String,
    symbol: String,
    name: String,
}

impl YahooChartSource {
    /// Build a source, honoring `YAHOO_CHART_URL` and `YAHOO_SYMBOL` from the environment (or `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("YAHOO_CHART_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let symbol = std::env::var("YAHOO_SYMBOL").unwrap_or_else(|_| DEFAULT_SYMBOL.to_string());
        Self::new(base_url, symbol)
    }

    pub fn new(base_url: impl Into<String>, symbol: impl Into<String>) -> Result<Self, AppError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(AppError::new(2, "YAHOO_SYMBOL must not be empty."));
        }
        // Yahoo rejects requests without a browser-like user agent.
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) btc-power-law")
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            name: format!("Yahoo Finance {symbol}"),
            symbol,
        })
    }
}

impl PriceSource for YahooChartSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<PriceSample>, AppError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), self.symbol);
        debug!(%url, range = RANGE, interval = INTERVAL, "requesting daily chart");

        let resp = self
            .client
            .get(&url)
            .query(&[("range", RANGE), ("interval", INTERVAL)])
            .send()
            .map_err(|e| AppError::new(4, format!("Yahoo request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Yahoo request failed with status {}.", resp.status()),
            ));
        }

        let body: ChartEnvelope = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse Yahoo response: {e}")))?;

        samples_from_chart(body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn samples_from_chart(body: ChartEnvelope) -> Result<Vec<PriceSample>, AppError> {
    if let Some(err) = body.chart.error {
        return Err(AppError::new(
            4,
            format!("Yahoo returned an error: {} ({})", err.description, err.code),
        ));
    }

    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AppError::new(4, "Yahoo response contained no chart result."))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        return Err(AppError::new(
            4,
            format!(
                "Yahoo response is misaligned: {} timestamps vs {} closes.",
                result.timestamp.len(),
                closes.len()
            ),
        ));
    }

    let mut out = Vec::with_capacity(closes.len());
    for (&ts, close) in result.timestamp.iter().zip(closes) {
        // Null closes show up for days the exchange feed missed.
        let Some(price) = close else { continue };
        let date = date_from_unix(ts)
            .ok_or_else(|| AppError::new(4, format!("Invalid Yahoo timestamp {ts}.")))?;
        out.push(PriceSample { date, price });
    }

    if out.is_empty() {
        return Err(AppError::new(4, "No observations returned by Yahoo."));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_daily_chart_and_skips_null_closes() {
        let body: ChartEnvelope = serde_json::from_str(
            r#"{"chart": {"result": [{
                "meta": {"symbol": "BTC-USD", "currency": "USD"},
                "timestamp": [1410912000, 1410998400, 1411084800],
                "indicators": {"quote": [{
                    "open": [465.86, 456.86, 424.10],
                    "close": [457.33, null, 394.80]
                }]}
            }], "error": null}}"#,
        )
        .unwrap();

        let samples = samples_from_chart(body).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].date, NaiveDate::from_ymd_opt(2014, 9, 17).unwrap());
        assert_eq!(samples[0].price, 457.33);
        assert_eq!(samples[1].date, NaiveDate::from_ymd_opt(2014, 9, 19).unwrap());
    }

    #[test]
    fn surfaces_api_errors() {
        let body: ChartEnvelope = serde_json::from_str(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();
        let err = samples_from_chart(body).unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn misaligned_arrays_are_rejected() {
        let body: ChartEnvelope = serde_json::from_str(
            r#"{"chart": {"result": [{"timestamp": [1410912000], "indicators": {"quote": [{"close": []}]}}], "error": null}}"#,
        )
        .unwrap();
        assert!(samples_from_chart(body).is_err());
    }
}
