//! Reporting utilities: residuals, extremes, milestones, and formatted output.

pub mod format;

pub use format::*;

use chrono::{Datelike, NaiveDate};

use crate::data::PriceSeries;
use crate::domain::{Channel, DayAxis, FitResult, Milestone, ObservedResidual};
use crate::error::AppError;
use crate::fit::project_one;

/// Observations furthest above and below the trend (top-N each side).
#[derive(Debug, Clone)]
pub struct Extremes {
    pub above: Vec<ObservedResidual>,
    pub below: Vec<ObservedResidual>,
}

/// Compute fitted values and log residuals for each observation.
pub fn compute_residuals(
    series: &PriceSeries,
    fit: &FitResult,
    channel: &Channel,
) -> Result<Vec<ObservedResidual>, AppError> {
    let width = channel.upper_offset - channel.lower_offset;
    let mut out = Vec::with_capacity(series.points.len());
    for p in &series.points {
        let fitted = project_one(fit, f64::from(p.day_index), 0.0)?;
        if !(fitted.is_finite() && fitted > 0.0) {
            return Err(AppError::new(4, "Non-finite fitted price during residual computation."));
        }
        let log_residual = p.price.ln() - fitted.ln();
        let channel_position = if width > 0.0 {
            (log_residual - channel.lower_offset) / width
        } else {
            f64::NAN
        };
        let date = series
            .date_of(p)
            .ok_or_else(|| AppError::new(4, format!("Day {} has no calendar date.", p.day_index)))?;
        out.push(ObservedResidual {
            point: *p,
            date,
            fitted,
            log_residual,
            channel_position,
        });
    }
    Ok(out)
}

/// Rank the observations furthest above and below the fitted trend.
pub fn rank_extremes(residuals: &[ObservedResidual], top_n: usize) -> Extremes {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.log_residual.partial_cmp(&a.log_residual).unwrap_or(std::cmp::Ordering::Equal));
    let above = sorted.iter().take(top_n).copied().collect();

    sorted.reverse();
    let below = sorted.iter().take(top_n).copied().collect();

    Extremes { above, below }
}

/// Projected values on Jan 1 of every year whose Jan 1 falls in `[start, end]`.
pub fn yearly_milestones(
    fit: &FitResult,
    channel: &Channel,
    axis: &DayAxis,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Milestone>, AppError> {
    let mut out = Vec::new();
    for year in start.year()..=end.year() {
        let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        let day_index = axis.day_index(date);
        if day_index < 1 {
            continue;
        }
        let day = day_index as f64;
        out.push(Milestone {
            date,
            day_index,
            central: project_one(fit, day, 0.0)?,
            upper: project_one(fit, day, channel.upper_offset)?,
            lower: project_one(fit, day, channel.lower_offset)?,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DayOrigin, PriceSample};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn unit_fit() -> FitResult {
        FitResult { slope: 1.0, intercept: 0.0, r_squared: 1.0, n: 3 }
    }

    fn series() -> PriceSeries {
        // Origin 2020-01-01: day 1, 10, 100 with prices on, above, and below `price = day`.
        PriceSeries::from_samples(
            vec![
                PriceSample { date: d(2020, 1, 1), price: 1.0 },
                PriceSample { date: d(2020, 1, 10), price: 10.0 * 2.0_f64.exp() },
                PriceSample { date: d(2020, 4, 9), price: 100.0 * (-1.0_f64).exp() },
            ],
            DayOrigin::Date(d(2020, 1, 1)),
            0,
        )
        .unwrap()
    }

    #[test]
    fn compute_residuals_basic() {
        let channel = Channel { upper_offset: 2.0, lower_offset: -1.0 };
        let residuals = compute_residuals(&series(), &unit_fit(), &channel).unwrap();

        assert_eq!(residuals.len(), 3);
        assert!(residuals[0].log_residual.abs() < 1e-9);
        assert!((residuals[1].log_residual - 2.0).abs() < 1e-9);
        assert!((residuals[1].channel_position - 1.0).abs() < 1e-9);
        assert!((residuals[2].channel_position - 0.0).abs() < 1e-9);
        assert_eq!(residuals[2].date, d(2020, 4, 9));
        assert!((residuals[2].fitted - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rank_extremes_basic() {
        let residuals = compute_residuals(&series(), &unit_fit(), &Channel::default()).unwrap();
        let extremes = rank_extremes(&residuals, 1);
        assert_eq!(extremes.above.len(), 1);
        assert_eq!(extremes.above[0].point.day_index, 10);
        assert_eq!(extremes.below.len(), 1);
        assert_eq!(extremes.below[0].point.day_index, 100);
    }

    #[test]
    fn milestones_cover_each_new_year_in_window() {
        let axis = DayAxis::new(d(2009, 1, 3), 0);
        let rows = yearly_milestones(&unit_fit(), &Channel::default(), &axis, d(2010, 7, 1), d(2014, 6, 30)).unwrap();

        let years: Vec<i32> = rows.iter().map(|m| m.date.year()).collect();
        assert_eq!(years, vec![2011, 2012, 2013, 2014]);
        assert_eq!(rows[0].day_index, axis.day_index(d(2011, 1, 1)));
        assert!(rows.iter().all(|m| m.upper > m.central && m.central > m.lower));
    }
}
