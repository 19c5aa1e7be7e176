//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for projection or plotting

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Calendar date of the Bitcoin genesis block.
pub const GENESIS_DATE: (i32, u32, u32) = (2009, 1, 3);

/// Default channel offsets (natural-log space) above and below the fit.
pub const DEFAULT_UPPER_OFFSET: f64 = 2.0;
pub const DEFAULT_LOWER_OFFSET: f64 = -1.0;

pub fn genesis_date() -> NaiveDate {
    let (y, m, d) = GENESIS_DATE;
    NaiveDate::from_ymd_opt(y, m, d).expect("genesis date is a valid calendar date")
}

/// Which upstream provider to fetch prices from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// blockchain.info market-price chart (full history).
    Blockchain,
    /// Yahoo Finance daily chart for `BTC-USD`.
    Yahoo,
    /// A local CSV file with date and price columns.
    Csv,
}

/// How the projection grid is spaced between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GridSpacing {
    /// Evenly spaced day indices.
    Linear,
    /// Evenly spaced in `ln(day)`; smoother on a log-log chart.
    Log,
}

/// Where day 1 sits on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOrigin {
    /// The Bitcoin genesis block (2009-01-03).
    Genesis,
    /// The first sample the provider returned.
    FirstSample,
    /// An explicit calendar date.
    Date(NaiveDate),
}

impl std::str::FromStr for DayOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "genesis" => Ok(DayOrigin::Genesis),
            "first-sample" | "first_sample" | "first" => Ok(DayOrigin::FirstSample),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(DayOrigin::Date)
                .map_err(|_| {
                    format!("invalid origin '{s}': expected genesis, first-sample, or YYYY-MM-DD")
                }),
        }
    }
}

impl std::fmt::Display for DayOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayOrigin::Genesis => write!(f, "genesis"),
            DayOrigin::FirstSample => write!(f, "first-sample"),
            DayOrigin::Date(d) => write!(f, "{d}"),
        }
    }
}

/// A resolved day axis: maps calendar dates to day indices and back.
///
/// `day_index(date) = (date - origin).days + 1 + offset_days`, so the origin
/// itself is day 1 when `offset_days = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAxis {
    pub origin: NaiveDate,
    pub offset_days: i64,
}

impl DayAxis {
    pub fn new(origin: NaiveDate, offset_days: i64) -> Self {
        Self { origin, offset_days }
    }

    /// Day index for a calendar date (may be < 1 for dates before the origin).
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        (date - self.origin).num_days() + 1 + self.offset_days
    }

    /// Calendar date for a (possibly fractional) day index, rounded to the nearest day.
    ///
    /// `None` when the day falls outside the representable calendar.
    pub fn date_of(&self, day: f64) -> Option<NaiveDate> {
        let delta = (day - 1.0 - self.offset_days as f64).round();
        if !delta.is_finite() || delta.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        chrono::Duration::try_days(delta as i64).and_then(|d| self.origin.checked_add_signed(d))
    }
}

/// A raw provider sample before day-index conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub date: NaiveDate,
    pub price: f64,
}

/// A cleaned observation used for fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Days since origin plus one (>= 1).
    pub day_index: u32,
    /// Price in USD (> 0).
    pub price: f64,
}

/// Output of the log-log regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Power-law exponent.
    pub slope: f64,
    /// Natural-log intercept (`price ≈ exp(intercept) * day^slope`).
    pub intercept: f64,
    pub r_squared: f64,
    /// Number of points used.
    pub n: usize,
}

/// Fixed log-space offsets of the channel boundaries from the central fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub upper_offset: f64,
    pub lower_offset: f64,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            upper_offset: DEFAULT_UPPER_OFFSET,
            lower_offset: DEFAULT_LOWER_OFFSET,
        }
    }
}

/// Central fit and channel boundaries evaluated over a day grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCurves {
    pub day_index: Vec<f64>,
    pub central: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Per-observation position relative to the fitted trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedResidual {
    pub point: PricePoint,
    pub date: NaiveDate,
    pub fitted: f64,
    /// `ln(price) - ln(fitted)`.
    pub log_residual: f64,
    /// 0 at the lower channel, 1 at the upper channel.
    pub channel_position: f64,
}

/// Projected values on Jan 1 of a year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Milestone {
    pub date: NaiveDate,
    pub day_index: i64,
    pub central: f64,
    pub upper: f64,
    pub lower: f64,
}

/// A full run’s configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub source: SourceKind,
    pub csv_path: Option<PathBuf>,

    pub origin: DayOrigin,
    pub offset_days: i64,

    pub channel: Channel,

    /// First date shown in plots and milestone tables.
    pub start_date: NaiveDate,
    /// Projection horizon.
    pub end_date: NaiveDate,
    pub grid_steps: usize,
    pub grid_spacing: GridSpacing,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    pub chart_path: Option<PathBuf>,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub source: String,
    pub axis: DayAxis,
    pub fit: FitResult,
    pub channel: Channel,
    pub first_observed: NaiveDate,
    pub last_observed: NaiveDate,
    pub grid: ChannelCurves,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_axis_origin_is_day_one() {
        let axis = DayAxis::new(genesis_date(), 0);
        assert_eq!(axis.day_index(genesis_date()), 1);
        let d = NaiveDate::from_ymd_opt(2009, 1, 13).unwrap();
        assert_eq!(axis.day_index(d), 11);
        assert_eq!(axis.date_of(11.0), Some(d));
    }

    #[test]
    fn day_axis_offset_shifts_indices() {
        let axis = DayAxis::new(genesis_date(), 300);
        assert_eq!(axis.day_index(genesis_date()), 301);
        assert_eq!(axis.date_of(301.0), Some(genesis_date()));
        assert_eq!(axis.day_index(NaiveDate::from_ymd_opt(2009, 1, 1).unwrap()), 299);
    }

    #[test]
    fn date_of_out_of_calendar_is_none() {
        let axis = DayAxis::new(genesis_date(), 0);
        assert_eq!(axis.date_of(1e8), None);
        assert_eq!(axis.date_of(1e300), None);
        assert_eq!(axis.date_of(f64::NAN), None);
        assert_eq!(axis.date_of(f64::INFINITY), None);
    }

    #[test]
    fn origin_parses_keywords_and_dates() {
        assert_eq!("genesis".parse::<DayOrigin>().unwrap(), DayOrigin::Genesis);
        assert_eq!("First-Sample".parse::<DayOrigin>().unwrap(), DayOrigin::FirstSample);
        assert_eq!(
            "2010-07-18".parse::<DayOrigin>().unwrap(),
            DayOrigin::Date(NaiveDate::from_ymd_opt(2010, 7, 18).unwrap())
        );
        assert!("yesterday".parse::<DayOrigin>().is_err());
    }
}
