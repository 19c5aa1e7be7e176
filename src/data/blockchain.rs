//! blockchain.info market-price chart integration.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::{PriceSource, date_from_unix};
use crate::domain::PriceSample;
use crate::error::AppError;

const DEFAULT_URL: &str = "https://api.blockchain.info/charts/market-price?timespan=all&format=json";

pub struct BlockchainInfoSource {
    client: Client,
    url: String,
}

impl BlockchainInfoSource {
    /// Build a source, honoring `BLOCKCHAIN_INFO_URL` from the environment (or `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let url = std::env::var("BLOCKCHAIN_INFO_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::with_url(url)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("btc-power-law/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl PriceSource for BlockchainInfoSource {
    fn name(&self) -> &str {
        "blockchain.info"
    }

    fn fetch(&self) -> Result<Vec<PriceSample>, AppError> {
        debug!(url = %self.url, "requesting market-price chart");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("blockchain.info request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("blockchain.info request failed with status {}.", resp.status()),
            ));
        }

        let body: ChartResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse blockchain.info response: {e}")))?;

        samples_from_chart(body)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    values: Vec<ChartValue>,
}

#[derive(Debug, Deserialize)]
struct ChartValue {
    /// Unix timestamp (seconds).
    x: i64,
    /// Price in USD.
    y: f64,
}

fn samples_from_chart(body: ChartResponse) -> Result<Vec<PriceSample>, AppError> {
    let mut out = Vec::with_capacity(body.values.len());
    for v in body.values {
        // The earliest entries are zero-priced; they are dropped during series cleaning.
        let date = date_from_unix(v.x)
            .ok_or_else(|| AppError::new(4, format!("Invalid blockchain.info timestamp {}.", v.x)))?;
        out.push(PriceSample { date, price: v.y });
    }

    if out.is_empty() {
        return Err(AppError::new(4, "No observations returned by blockchain.info."));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_market_price_chart() {
        let body: ChartResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "name": "Market Price (USD)",
                "unit": "USD",
                "period": "day",
                "values": [
                    {"x": 1231027200, "y": 0.0},
                    {"x": 1279411200, "y": 0.08584},
                    {"x": 1636502400, "y": 67549.14}
                ]
            }"#,
        )
        .unwrap();

        let samples = samples_from_chart(body).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].date, NaiveDate::from_ymd_opt(2009, 1, 4).unwrap());
        assert_eq!(samples[0].price, 0.0);
        assert_eq!(samples[1].date, NaiveDate::from_ymd_opt(2010, 7, 18).unwrap());
        assert_eq!(samples[2].date, NaiveDate::from_ymd_opt(2021, 11, 10).unwrap());
    }

    #[test]
    fn empty_chart_is_an_error() {
        let body: ChartResponse = serde_json::from_str(r#"{"values": []}"#).unwrap();
        assert!(samples_from_chart(body).is_err());
    }
}
