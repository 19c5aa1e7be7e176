//! Power-law fit and projection.
//!
//! The model is `price ≈ exp(intercept) * day^slope`. Taking natural logs of
//! both axes turns it into a straight line, so fitting is an ordinary linear
//! regression of `ln(price)` on `ln(day)` and projecting is evaluating that
//! line and exponentiating back:
//!
//! ```text
//! project(d, offset) = exp(intercept + offset + slope * ln(d))
//! ```
//!
//! Channel boundaries are the same formula with a non-zero `offset`. They are
//! fixed caller-chosen constants, not a statistical band.

use crate::domain::{Channel, ChannelCurves, FitResult, PricePoint};
use crate::error::FitError;
use crate::math::fit_line;

/// Minimum number of usable points needed to determine a line.
const MIN_POINTS: usize = 2;

/// Fit a power law to a price series.
///
/// Points with a non-positive (or non-finite) price are discarded first. The
/// remaining day indices must be `>= 1` and strictly increasing.
pub fn fit(points: &[PricePoint]) -> Result<FitResult, FitError> {
    let usable: Vec<&PricePoint> = points
        .iter()
        .filter(|p| p.price.is_finite() && p.price > 0.0)
        .collect();

    if usable.len() < MIN_POINTS {
        return Err(FitError::InsufficientData {
            usable: usable.len(),
            required: MIN_POINTS,
        });
    }

    let mut prev: Option<u32> = None;
    for (position, p) in usable.iter().enumerate() {
        if p.day_index == 0 {
            return Err(FitError::Domain { day_index: 0.0 });
        }
        if prev.is_some_and(|d| p.day_index <= d) {
            return Err(FitError::UnorderedDays {
                position,
                day_index: p.day_index,
            });
        }
        prev = Some(p.day_index);
    }

    let log_day: Vec<f64> = usable.iter().map(|p| f64::from(p.day_index).ln()).collect();
    let log_price: Vec<f64> = usable.iter().map(|p| p.price.ln()).collect();

    let line = fit_line(&log_day, &log_price)
        .ok_or(FitError::Degenerate("least-squares solve returned no finite line"))?;

    Ok(FitResult {
        slope: line.slope,
        intercept: line.intercept,
        r_squared: line.r_squared,
        n: line.n,
    })
}

/// Evaluate the fitted power law at each day index, shifted by `offset` in log space.
///
/// `offset = 0` gives the central fit. Every day index must be `>= 1`.
pub fn project(fit: &FitResult, day_indices: &[f64], offset: f64) -> Result<Vec<f64>, FitError> {
    day_indices
        .iter()
        .map(|&d| project_one(fit, d, offset))
        .collect()
}

/// Single-point form of [`project`].
pub fn project_one(fit: &FitResult, day_index: f64, offset: f64) -> Result<f64, FitError> {
    // `!(d >= 1)` also rejects NaN.
    if !(day_index >= 1.0) {
        return Err(FitError::Domain { day_index });
    }
    Ok((fit.intercept + offset + fit.slope * day_index.ln()).exp())
}

/// Evaluate the central fit and both channel boundaries over the same grid.
pub fn channel_curves(
    fit: &FitResult,
    channel: &Channel,
    day_indices: &[f64],
) -> Result<ChannelCurves, FitError> {
    Ok(ChannelCurves {
        day_index: day_indices.to_vec(),
        central: project(fit, day_indices, 0.0)?,
        upper: project(fit, day_indices, channel.upper_offset)?,
        lower: project(fit, day_indices, channel.lower_offset)?,
    })
}
