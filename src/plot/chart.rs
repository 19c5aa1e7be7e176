//! Plotters-powered SVG chart of the power-law fit.
//!
//! Both axes are logarithmic. The x axis is the day index but labelled with
//! calendar dates so the chart reads as a timeline.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::domain::{Channel, ChannelCurves, DayAxis, FitResult};
use crate::error::AppError;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct PowerLawChart<'a> {
    /// Observed `(day_index, price)` pairs.
    pub observed: &'a [(f64, f64)],
    pub curves: &'a ChannelCurves,
    pub fit: &'a FitResult,
    pub channel: &'a Channel,
    pub axis: &'a DayAxis,
    pub size: (u32, u32),
}

impl PowerLawChart<'_> {
    /// Render the chart to an SVG file.
    pub fn write_svg(&self, path: &Path) -> Result<(), AppError> {
        self.draw(path)
            .map_err(|e| AppError::new(2, format!("Failed to render chart '{}': {e}", path.display())))?;
        info!(path = %path.display(), "wrote chart");
        Ok(())
    }

    fn draw(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let (x0, x1) = self.x_bounds().ok_or("no positive day range to plot")?;
        let (y0, y1) = self.y_bounds().ok_or("no positive price range to plot")?;

        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Bitcoin Price vs. Time (Power Law Log-Log Plot with Channel)",
                ("sans-serif", 22),
            )
            .margin(16)
            .set_label_area_size(LabelAreaPosition::Left, 80)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .build_cartesian_2d((x0..x1).log_scale(), (y0..y1).log_scale())?;

        let axis = *self.axis;
        chart
            .configure_mesh()
            .x_desc("Days Since Origin (log scale)")
            .y_desc("BTC Price in USD (log scale)")
            .x_label_formatter(&|v| {
                axis.date_of(*v)
                    .map(|d| d.format("%Y-%m").to_string())
                    .unwrap_or_else(|| "-".to_string())
            })
            .y_label_formatter(&|v| crate::report::fmt_usd(*v))
            .draw()?;

        let days = &self.curves.day_index;
        let fit_color = RED;
        let upper_color = RGBColor(0, 160, 0);
        let lower_color = MAGENTA;

        chart
            .draw_series(
                self.observed
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 2, BLUE.mix(0.5).filled())),
            )?
            .label("BTC Price (actual)")
            .legend(|(x, y)| Circle::new((x + 10, y), 3, BLUE.filled()));

        chart
            .draw_series(LineSeries::new(
                days.iter().copied().zip(self.curves.central.iter().copied()),
                fit_color.stroke_width(2),
            ))?
            .label(format!("Power Law Fit (n={:.2})", self.fit.slope))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], fit_color.stroke_width(2)));

        chart
            .draw_series(LineSeries::new(
                days.iter().copied().zip(self.curves.upper.iter().copied()),
                upper_color.stroke_width(2),
            ))?
            .label(format!("Upper Channel (offset={})", self.channel.upper_offset))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], upper_color.stroke_width(2)));

        chart
            .draw_series(LineSeries::new(
                days.iter().copied().zip(self.curves.lower.iter().copied()),
                lower_color.stroke_width(2),
            ))?
            .label(format!("Lower Channel (offset={})", self.channel.lower_offset))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], lower_color.stroke_width(2)));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn x_bounds(&self) -> Option<(f64, f64)> {
        let xs = self.observed.iter().map(|&(x, _)| x).chain(self.curves.day_index.iter().copied());
        positive_bounds(xs).map(|(lo, hi)| (lo, hi * 1.1))
    }

    fn y_bounds(&self) -> Option<(f64, f64)> {
        let ys = self
            .observed
            .iter()
            .map(|&(_, y)| y)
            .chain(self.curves.upper.iter().copied())
            .chain(self.curves.lower.iter().copied());
        positive_bounds(ys).map(|(lo, hi)| (lo * 0.8, hi * 1.25))
    }
}

fn positive_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (lo.is_finite() && hi > lo).then_some((lo, hi))
}
