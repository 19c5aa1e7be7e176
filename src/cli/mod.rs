//! Command-line parsing for the power-law fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{
    DEFAULT_LOWER_OFFSET, DEFAULT_UPPER_OFFSET, DayOrigin, GridSpacing, SourceKind,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pl", version, about = "Bitcoin power-law fit with log-space channel")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch prices, fit the power law, print the report, and optionally plot/export.
    Fit(FitArgs),
    /// Evaluate a saved curve at arbitrary dates or day indices.
    Project(ProjectArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Options for fetching and fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Price provider.
    #[arg(short = 's', long, value_enum, default_value_t = SourceKind::Blockchain)]
    pub source: SourceKind,

    /// CSV file for `--source csv`.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Day 1 of the axis: `genesis`, `first-sample`, or a date (YYYY-MM-DD).
    #[arg(long, default_value = "genesis")]
    pub origin: DayOrigin,

    /// Extra days added to every day index (shifts the origin earlier when positive).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset_days: i64,

    /// Upper channel offset in natural-log space.
    #[arg(long, default_value_t = DEFAULT_UPPER_OFFSET, allow_negative_numbers = true)]
    pub upper: f64,

    /// Lower channel offset in natural-log space.
    #[arg(long, default_value_t = DEFAULT_LOWER_OFFSET, allow_negative_numbers = true)]
    pub lower: f64,

    /// First date shown in plots and the projection table.
    #[arg(long, default_value = "2010-07-01", value_parser = parse_date)]
    pub start: NaiveDate,

    /// Projection horizon.
    #[arg(long, default_value = "2046-12-31", value_parser = parse_date)]
    pub end: NaiveDate,

    /// Number of samples in the projection grid.
    #[arg(long, default_value_t = 1000)]
    pub steps: usize,

    /// Spacing of the projection grid.
    #[arg(long, value_enum, default_value_t = GridSpacing::Log)]
    pub spacing: GridSpacing,

    /// Show top-N observations above and below trend.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, overrides_with = "no_plot")]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long, overrides_with = "plot")]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-observation residuals to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export curve (fit + channel + projected grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// Render an SVG chart to this path.
    #[arg(long, value_name = "SVG")]
    pub chart: Option<PathBuf>,
}

/// Options for projecting a saved curve.
#[derive(Debug, Parser)]
pub struct ProjectArgs {
    /// Curve JSON file produced by `pl fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Calendar date to project (repeatable).
    #[arg(long = "date", value_parser = parse_date)]
    pub dates: Vec<NaiveDate>,

    /// Day index to project (repeatable).
    #[arg(long = "day")]
    pub days: Vec<f64>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `pl fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

impl FitArgs {
    /// `--plot` and `--no-plot` override each other; the last one given wins.
    pub fn plot_enabled(&self) -> bool {
        self.plot || !self.no_plot
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_defaults_match_reference_constants() {
        let cli = Cli::try_parse_from(["pl", "fit"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.source, SourceKind::Blockchain);
        assert_eq!(args.origin, DayOrigin::Genesis);
        assert_eq!(args.upper, 2.0);
        assert_eq!(args.lower, -1.0);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2010, 7, 1).unwrap());
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2046, 12, 31).unwrap());
        assert_eq!(args.steps, 1000);
    }

    #[test]
    fn negative_offsets_parse() {
        let cli = Cli::try_parse_from(["pl", "fit", "--lower", "-1.5", "--offset-days", "-300"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.lower, -1.5);
        assert_eq!(args.offset_days, -300);
    }

    #[test]
    fn project_accepts_repeated_dates() {
        let cli = Cli::try_parse_from([
            "pl", "project", "--curve", "c.json", "--date", "2030-01-01", "--date", "2040-01-01", "--day", "5000",
        ])
        .unwrap();
        let Command::Project(args) = cli.command else {
            panic!("expected project");
        };
        assert_eq!(args.dates.len(), 2);
        assert_eq!(args.days, vec![5000.0]);
    }

    #[test]
    fn last_of_plot_and_no_plot_wins() {
        let parse = |args: &[&str]| {
            let Command::Fit(fit) = Cli::try_parse_from(args).unwrap().command else {
                panic!("expected fit");
            };
            fit.plot_enabled()
        };
        assert!(parse(&["pl", "fit"]));
        assert!(!parse(&["pl", "fit", "--no-plot"]));
        assert!(parse(&["pl", "fit", "--no-plot", "--plot"]));
        assert!(!parse(&["pl", "fit", "--plot", "--no-plot"]));
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(Cli::try_parse_from(["pl", "fit", "--end", "2046/12/31"]).is_err());
        assert!(Cli::try_parse_from(["pl", "fit", "--origin", "someday"]).is_err());
    }
}
