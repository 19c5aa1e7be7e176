//! Day-index grid generation.
//!
//! Projection curves are sampled on a deterministic grid between the first
//! plotted day and the horizon. Linear spacing matches a plain `linspace`;
//! log spacing puts the same number of samples per decade, which is what a
//! log-log chart actually shows.

use crate::domain::GridSpacing;
use crate::error::AppError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn linear_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    // Pin the endpoint so it is exact.
    out[steps - 1] = max;
    Ok(out)
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// Day-index grid for projection curves. `first_day` is clamped to 1.
pub fn projection_grid(
    first_day: f64,
    last_day: f64,
    steps: usize,
    spacing: GridSpacing,
) -> Result<Vec<f64>, AppError> {
    let first_day = first_day.max(1.0);
    match spacing {
        GridSpacing::Linear => linear_space(first_day, last_day, steps),
        GridSpacing::Log => log_space(first_day, last_day, steps),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_space_includes_endpoints() {
        let g = linear_space(1.0, 13_877.0, 1000).unwrap();
        assert_eq!(g.len(), 1000);
        assert_eq!(g[0], 1.0);
        assert_eq!(g[999], 13_877.0);
        assert!(g.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn log_space_is_geometric() {
        let g = log_space(1.0, 1000.0, 4).unwrap();
        for (got, want) in g.iter().zip([1.0, 10.0, 100.0, 1000.0]) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(linear_space(5.0, 5.0, 10).is_err());
        assert!(linear_space(1.0, 5.0, 1).is_err());
        assert!(log_space(0.0, 5.0, 10).is_err());
        assert!(log_space(1.0, f64::INFINITY, 10).is_err());
    }

    #[test]
    fn projection_grid_never_starts_below_day_one() {
        let g = projection_grid(-50.0, 100.0, 10, GridSpacing::Log).unwrap();
        assert_eq!(g[0], 1.0);
        assert_eq!(g[9], 100.0);
    }
}
