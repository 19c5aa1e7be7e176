//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - fetches price history
//! - runs the power-law fit and channel projection
//! - prints reports/plots
//! - writes optional exports

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, PlotArgs, ProjectArgs};
use crate::domain::{Channel, DayAxis, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pl` binary.
pub fn run() -> Result<(), AppError> {
    // `pl` alone, or `pl --upper 1.8`, means `pl fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Project(args) => handle_project(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log to stderr so report output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.source, &run.series, &run.fit, &config)
    );
    println!("{}", crate::report::format_milestones(&run.milestones));
    if config.top_n > 0 {
        println!("{}", crate::report::format_extremes(&run.extremes));
    }

    let observed = run.observed_in_window();
    if config.plot {
        let plot = crate::plot::render_ascii_plot(&observed, &run.curves, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::write_residuals_csv(path, &run.residuals)?;
    }
    if let Some(path) = &config.export_curve {
        let curve = crate::io::build_curve_file(&run.source, &run.series, &run.fit, &config.channel, &run.curves);
        crate::io::write_curve_json(path, &curve)?;
    }
    if let Some(path) = &config.chart_path {
        crate::plot::PowerLawChart {
            observed: &observed,
            curves: &run.curves,
            fit: &run.fit,
            channel: &config.channel,
            axis: &run.series.axis,
            size: (1200, 800),
        }
        .write_svg(path)?;
    }

    Ok(())
}

fn handle_project(args: ProjectArgs) -> Result<(), AppError> {
    let curve = crate::io::read_curve_json(&args.curve)?;
    if args.dates.is_empty() && args.days.is_empty() {
        return Err(AppError::new(2, "Nothing to project: pass --date and/or --day."));
    }

    let days = projection_days(&curve.axis, &args.dates, &args.days)?;
    let curves = crate::fit::channel_curves(&curve.fit, &curve.channel, &days)?;

    println!(
        "Curve: {} | slope={:.4} intercept={:.4} R²={:.4} | origin {}",
        curve.source, curve.fit.slope, curve.fit.intercept, curve.fit.r_squared, curve.axis.origin
    );
    println!("{:<10} {:>9} {:>16} {:>16} {:>16}", "date", "day", "lower", "fit", "upper");
    for (i, &day) in curves.day_index.iter().enumerate() {
        println!(
            "{:<10} {:>9.1} {:>16} {:>16} {:>16}",
            curve.axis.date_of(day).map_or_else(|| "-".to_string(), |d| d.to_string()),
            day,
            crate::report::fmt_usd(curves.lower[i]),
            crate::report::fmt_usd(curves.central[i]),
            crate::report::fmt_usd(curves.upper[i]),
        );
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::read_curve_json(&args.curve)?;

    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);

    println!("{plot}");
    Ok(())
}

/// Day indices for the requested dates and raw days.
///
/// Anything before day 1 on the curve's axis is a usage error (exit 2).
fn projection_days(axis: &DayAxis, dates: &[NaiveDate], days: &[f64]) -> Result<Vec<f64>, AppError> {
    let mut out = Vec::with_capacity(dates.len() + days.len());
    for date in dates {
        let day = axis.day_index(*date);
        if day < 1 {
            return Err(AppError::new(
                2,
                format!("Date {date} is before day 1 of this curve (origin {}).", axis.origin),
            ));
        }
        out.push(day as f64);
    }
    for &day in days {
        if !(day.is_finite() && day >= 1.0) {
            return Err(AppError::new(2, format!("Day {day} is out of range: days must be finite and >= 1.")));
        }
        out.push(day);
    }
    Ok(out)
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        source: args.source,
        csv_path: args.file.clone(),
        origin: args.origin,
        offset_days: args.offset_days,
        channel: Channel {
            upper_offset: args.upper,
            lower_offset: args.lower,
        },
        start_date: args.start,
        end_date: args.end,
        grid_steps: args.steps,
        grid_spacing: args.spacing,
        top_n: args.top,
        plot: args.plot_enabled(),
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
        chart_path: args.chart.clone(),
    }
}

/// Rewrite argv so `pl` defaults to `pl fit`.
///
/// Rules:
/// - `pl`                      -> `pl fit`
/// - `pl --source yahoo ...`   -> `pl fit --source yahoo ...`
/// - `pl --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `pl -v plot ...`          -> unchanged (global flags before a subcommand)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Global flags may precede the subcommand; look at the first token after them.
    let first = argv.iter().skip(1).find(|a| !is_global_flag(a)).cloned();
    let Some(arg1) = first else {
        argv.insert(1.min(argv.len()), "fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "project" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

fn is_global_flag(arg: &str) -> bool {
    arg == "--verbose" || arg.strip_prefix('-').is_some_and(|v| !v.is_empty() && v.chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_fit() {
        assert_eq!(rewrite_args(argv(&["pl"])), argv(&["pl", "fit"]));
        assert_eq!(
            rewrite_args(argv(&["pl", "--source", "yahoo"])),
            argv(&["pl", "fit", "--source", "yahoo"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["pl", "--help"])), argv(&["pl", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["pl", "plot", "--curve", "c.json"])),
            argv(&["pl", "plot", "--curve", "c.json"])
        );
        assert_eq!(
            rewrite_args(argv(&["pl", "-v", "plot", "--curve", "c.json"])),
            argv(&["pl", "-v", "plot", "--curve", "c.json"])
        );
        assert_eq!(
            rewrite_args(argv(&["pl", "-vv", "--verbose", "project", "--curve", "c.json"])),
            argv(&["pl", "-vv", "--verbose", "project", "--curve", "c.json"])
        );
    }

    #[test]
    fn verbose_before_subcommand_parses() {
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(argv(&["pl", "-v", "plot", "--curve", "c.json"])))
            .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Plot(_)));
    }

    #[test]
    fn verbose_alone_defaults_to_fit() {
        assert_eq!(rewrite_args(argv(&["pl", "-v"])), argv(&["pl", "fit", "-v"]));
        assert_eq!(
            rewrite_args(argv(&["pl", "-vv", "--upper", "1.8"])),
            argv(&["pl", "fit", "-vv", "--upper", "1.8"])
        );
    }

    #[test]
    fn projection_days_reject_dates_before_origin() {
        let axis = DayAxis::new(crate::domain::genesis_date(), 0);
        let before = NaiveDate::from_ymd_opt(2008, 12, 1).unwrap();
        let err = projection_days(&axis, &[before], &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = projection_days(&axis, &[], &[0.5]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(projection_days(&axis, &[], &[f64::NAN]).unwrap_err().exit_code(), 2);

        let days = projection_days(&axis, &[crate::domain::genesis_date()], &[5000.0]).unwrap();
        assert_eq!(days, vec![1.0, 5000.0]);
    }

    #[test]
    fn no_plot_overrides_plot() {
        let cli = crate::cli::Cli::try_parse_from(["pl", "fit", "--no-plot", "--upper", "1.5"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = fit_config_from_args(&args);
        assert!(!config.plot);
        assert_eq!(config.channel.upper_offset, 1.5);
    }
}
