//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> clean -> fit -> project channel -> residuals -> extremes/milestones
//!
//! The CLI front-end can then focus on presentation (printing, plots, exports).

use tracing::info;

use crate::data::{PriceSeries, PriceSource, source_from_config};
use crate::domain::{ChannelCurves, FitConfig, FitResult, Milestone, ObservedResidual};
use crate::error::AppError;
use crate::report::Extremes;

/// All computed outputs of a single `pl fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: String,
    pub series: PriceSeries,
    pub fit: FitResult,
    pub curves: ChannelCurves,
    pub residuals: Vec<ObservedResidual>,
    pub extremes: Extremes,
    pub milestones: Vec<Milestone>,
}

impl RunOutput {
    /// Observed `(day_index, price)` pairs inside the plot window.
    pub fn observed_in_window(&self) -> Vec<(f64, f64)> {
        let first_day = self.curves.day_index.first().copied().unwrap_or(1.0);
        self.series
            .points
            .iter()
            .map(|p| (f64::from(p.day_index), p.price))
            .filter(|&(d, _)| d >= first_day)
            .collect()
    }
}

/// Check the configuration before any network traffic happens.
pub fn validate_config(config: &FitConfig) -> Result<(), AppError> {
    let ch = &config.channel;
    if !(ch.upper_offset.is_finite() && ch.lower_offset.is_finite()) {
        return Err(AppError::new(2, "Channel offsets must be finite."));
    }
    if ch.upper_offset < ch.lower_offset {
        return Err(AppError::new(
            2,
            format!(
                "Upper offset ({}) must be >= lower offset ({}).",
                ch.upper_offset, ch.lower_offset
            ),
        ));
    }
    if config.start_date >= config.end_date {
        return Err(AppError::new(
            2,
            format!("Start date {} must be before end date {}.", config.start_date, config.end_date),
        ));
    }
    if config.grid_steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }
    Ok(())
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    validate_config(config)?;

    // 1) Fetch and clean.
    let source = source_from_config(config)?;
    run_fit_with_source(config, source.as_ref())
}

/// Execute the fitting pipeline against an already-built source.
pub fn run_fit_with_source(config: &FitConfig, source: &dyn PriceSource) -> Result<RunOutput, AppError> {
    validate_config(config)?;
    let series = source.fetch_points(config.origin, config.offset_days)?;

    // 2) Fit.
    let fit = crate::fit::fit(&series.points)?;
    info!(
        slope = fit.slope,
        intercept = fit.intercept,
        r_squared = fit.r_squared,
        n = fit.n,
        "fitted power law"
    );

    // 3) Project the central fit and channel from the plot start to the horizon.
    let first_day = series.axis.day_index(config.start_date) as f64;
    let last_day = series.axis.day_index(config.end_date) as f64;
    if last_day <= first_day.max(1.0) {
        return Err(AppError::new(
            2,
            format!("Projection horizon {} is not after day 1 on this axis.", config.end_date),
        ));
    }
    let grid = crate::fit::projection_grid(first_day, last_day, config.grid_steps, config.grid_spacing)?;
    let curves = crate::fit::channel_curves(&fit, &config.channel, &grid)?;

    // 4) Residuals, extremes, milestones.
    let residuals = crate::report::compute_residuals(&series, &fit, &config.channel)?;
    let extremes = crate::report::rank_extremes(&residuals, config.top_n);
    let milestones = crate::report::yearly_milestones(
        &fit,
        &config.channel,
        &series.axis,
        config.start_date,
        config.end_date,
    )?;

    Ok(RunOutput {
        source: source.name().to_string(),
        series,
        fit,
        curves,
        residuals,
        extremes,
        milestones,
    })
}
