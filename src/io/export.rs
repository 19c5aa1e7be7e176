//! Export per-observation results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ObservedResidual;
use crate::error::AppError;

/// Write per-observation residuals to a CSV file.
pub fn write_residuals_csv(path: &Path, residuals: &[ObservedResidual]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_residuals(&mut file, residuals)
}

fn write_residuals<W: Write>(out: &mut W, residuals: &[ObservedResidual]) -> Result<(), AppError> {
    writeln!(out, "date,day_index,price,fit,log_residual,channel_position")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        let position = if r.channel_position.is_finite() {
            format!("{:.6}", r.channel_position)
        } else {
            String::new()
        };
        writeln!(
            out,
            "{},{},{:.6},{:.6},{:.6},{}",
            r.date, r.point.day_index, r.point.price, r.fitted, r.log_residual, position,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::PricePoint;

    #[test]
    fn writes_header_and_rows() {
        let rows = vec![ObservedResidual {
            point: PricePoint { day_index: 562, price: 0.0858 },
            date: NaiveDate::from_ymd_opt(2010, 7, 18).unwrap(),
            fitted: 0.1,
            log_residual: -0.153,
            channel_position: f64::NAN,
        }];
        let mut buf = Vec::new();
        write_residuals(&mut buf, &rows).unwrap();
        let txt = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "date,day_index,price,fit,log_residual,channel_position");
        assert_eq!(lines[1], "2010-07-18,562,0.085800,0.100000,-0.153000,");
    }
}
