//! Sample cleaning and day-index conversion.
//!
//! Providers hand back whatever the upstream API returned: unsorted, with zero
//! prices for the earliest days, sometimes several samples on one calendar
//! day. This module turns that into the series the fitter expects:
//!
//! - sorted by date, one point per day (the last sample of a day wins)
//! - day indices `>= 1` on the resolved axis
//! - strictly positive, finite prices
//!
//! Dropped samples are counted, not silently lost.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{DayAxis, DayOrigin, PricePoint, PriceSample, genesis_date};
use crate::error::AppError;

/// Counts of what happened to the raw samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesStats {
    pub samples_read: usize,
    pub dropped_non_positive: usize,
    pub dropped_before_origin: usize,
    pub merged_duplicates: usize,
}

/// A cleaned price series on a resolved day axis.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub axis: DayAxis,
    pub points: Vec<PricePoint>,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub stats: SeriesStats,
}

impl PriceSeries {
    /// Clean raw samples and convert dates to day indices.
    ///
    /// `DayOrigin::FirstSample` resolves to the earliest sample with a
    /// positive price.
    pub fn from_samples(
        mut samples: Vec<PriceSample>,
        origin: DayOrigin,
        offset_days: i64,
    ) -> Result<Self, AppError> {
        let mut stats = SeriesStats {
            samples_read: samples.len(),
            ..SeriesStats::default()
        };

        samples.sort_by_key(|s| s.date);

        let positive: Vec<PriceSample> = samples
            .into_iter()
            .filter(|s| {
                let keep = s.price.is_finite() && s.price > 0.0;
                if !keep {
                    stats.dropped_non_positive += 1;
                }
                keep
            })
            .collect();

        let origin_date = match origin {
            DayOrigin::Genesis => genesis_date(),
            DayOrigin::Date(d) => d,
            DayOrigin::FirstSample => positive
                .first()
                .map(|s| s.date)
                .ok_or_else(|| AppError::new(4, "No samples with a positive price."))?,
        };
        let axis = DayAxis::new(origin_date, offset_days);

        let mut points: Vec<PricePoint> = Vec::with_capacity(positive.len());
        let mut dates: Vec<NaiveDate> = Vec::with_capacity(positive.len());
        for s in positive {
            let day = axis.day_index(s.date);
            if day < 1 {
                stats.dropped_before_origin += 1;
                continue;
            }
            let Ok(day_index) = u32::try_from(day) else {
                return Err(AppError::new(
                    4,
                    format!("Sample date {} is too far from origin {origin_date}.", s.date),
                ));
            };

            match points.last_mut() {
                Some(last) if last.day_index == day_index => {
                    last.price = s.price;
                    stats.merged_duplicates += 1;
                }
                _ => {
                    points.push(PricePoint { day_index, price: s.price });
                    dates.push(s.date);
                }
            }
        }

        let (Some(&first_date), Some(&last_date)) = (dates.first(), dates.last()) else {
            return Err(AppError::new(
                4,
                format!(
                    "No usable samples: {} read, {} non-positive, {} before origin {origin_date}.",
                    stats.samples_read, stats.dropped_non_positive, stats.dropped_before_origin
                ),
            ));
        };

        if stats.dropped_non_positive > 0 || stats.dropped_before_origin > 0 {
            warn!(
                non_positive = stats.dropped_non_positive,
                before_origin = stats.dropped_before_origin,
                "dropped unusable samples"
            );
        }
        debug!(
            points = points.len(),
            merged = stats.merged_duplicates,
            %first_date,
            %last_date,
            "built price series"
        );

        Ok(Self {
            axis,
            points,
            first_date,
            last_date,
            stats,
        })
    }

    /// Calendar date of a point in this series.
    pub fn date_of(&self, point: &PricePoint) -> Option<NaiveDate> {
        self.axis.date_of(f64::from(point.day_index))
    }
}
