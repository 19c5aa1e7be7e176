//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted power law:
//! - slope, intercept, r² and the channel offsets
//! - the day axis (origin + offset) so dates can be projected later
//! - a precomputed fit/channel grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::data::PriceSeries;
use crate::domain::{Channel, ChannelCurves, CurveFile, FitResult};
use crate::error::AppError;

/// Assemble the curve document for a completed run.
pub fn build_curve_file(
    source: &str,
    series: &PriceSeries,
    fit: &FitResult,
    channel: &Channel,
    grid: &ChannelCurves,
) -> CurveFile {
    CurveFile {
        tool: "pl".to_string(),
        source: source.to_string(),
        axis: series.axis,
        fit: *fit,
        channel: *channel,
        first_observed: series.first_date,
        last_observed: series.last_date,
        grid: grid.clone(),
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;

    let g = &curve.grid;
    if g.central.len() != g.day_index.len() || g.upper.len() != g.day_index.len() || g.lower.len() != g.day_index.len() {
        return Err(AppError::new(2, "Invalid curve JSON: grid series lengths differ."));
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{DayOrigin, PriceSample};

    #[test]
    fn curve_file_survives_disk() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let series = PriceSeries::from_samples(
            vec![
                PriceSample { date: d(2012, 1, 1), price: 5.0 },
                PriceSample { date: d(2016, 1, 1), price: 430.0 },
            ],
            DayOrigin::Genesis,
            0,
        )
        .unwrap();
        let fit = FitResult { slope: 5.8, intercept: -40.1, r_squared: 0.95, n: 2 };
        let channel = Channel::default();
        let grid = crate::fit::channel_curves(&fit, &channel, &[1.0, 5000.0]).unwrap();
        let curve = build_curve_file("test", &series, &fit, &channel, &grid);

        let path = std::env::temp_dir().join(format!("pl_curve_{}.json", std::process::id()));
        write_curve_json(&path, &curve).unwrap();
        let back = read_curve_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.fit, fit);
        assert_eq!(back.axis.origin, d(2009, 1, 3));
        assert_eq!(back.first_observed, d(2012, 1, 1));
        assert_eq!(back.grid.day_index, vec![1.0, 5000.0]);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = read_curve_json(Path::new("/nonexistent/pl-curve.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
