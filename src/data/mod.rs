//! Price data providers.
//!
//! Every provider implements [`PriceSource`], so the pipeline does not care
//! where prices come from:
//!
//! - `blockchain`: blockchain.info market-price chart
//! - `yahoo`: Yahoo Finance daily chart
//! - `csv_file`: a local CSV export
//!
//! Providers return raw dated samples; `series` turns them into cleaned
//! `PricePoint`s on a day axis.

pub mod blockchain;
pub mod csv_file;
pub mod series;
pub mod yahoo;

pub use blockchain::BlockchainInfoSource;
pub use csv_file::CsvFileSource;
pub use series::{PriceSeries, SeriesStats};
pub use yahoo::YahooChartSource;

use tracing::info;

use crate::domain::{DayOrigin, FitConfig, PriceSample, SourceKind};
use crate::error::AppError;

/// A provider of historical prices.
///
/// `fetch` blocks until the full history is available. It is not retried; a
/// failure is fatal to the run.
pub trait PriceSource {
    /// Short label for reports and curve files.
    fn name(&self) -> &str;

    /// Fetch raw dated samples (any order, possibly with zero prices).
    fn fetch(&self) -> Result<Vec<PriceSample>, AppError>;

    /// Fetch and convert to a cleaned, strictly increasing point series.
    fn fetch_points(&self, origin: DayOrigin, offset_days: i64) -> Result<PriceSeries, AppError> {
        let samples = self.fetch()?;
        info!(source = self.name(), samples = samples.len(), "fetched price history");
        PriceSeries::from_samples(samples, origin, offset_days)
    }
}

/// Build the provider selected by the run configuration.
pub fn source_from_config(config: &FitConfig) -> Result<Box<dyn PriceSource>, AppError> {
    match config.source {
        SourceKind::Blockchain => Ok(Box::new(BlockchainInfoSource::from_env()?)),
        SourceKind::Yahoo => Ok(Box::new(YahooChartSource::from_env()?)),
        SourceKind::Csv => {
            let path = config
                .csv_path
                .clone()
                .ok_or_else(|| AppError::new(2, "The csv source requires --file <path>."))?;
            Ok(Box::new(CsvFileSource::new(path)))
        }
    }
}

/// Convert a unix timestamp (seconds) to a UTC calendar date.
pub(crate) fn date_from_unix(secs: i64) -> Option<chrono::NaiveDate> {
    chrono::DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}
