//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::data::PriceSeries;
use crate::domain::{Channel, FitConfig, FitResult, Milestone, ObservedResidual};
use crate::report::Extremes;

/// Format the full run summary (dataset stats + fit diagnostics + channel).
pub fn format_run_summary(
    source: &str,
    series: &PriceSeries,
    fit: &FitResult,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== pl - Bitcoin Power Law Fit ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Origin: {} ({}) | offset_days={}\n",
        series.axis.origin, config.origin, series.axis.offset_days
    ));
    out.push_str(&format!(
        "Points: n={} | dates=[{}, {}] | days=[{}, {}]\n",
        series.points.len(),
        series.first_date,
        series.last_date,
        series.points.first().map(|p| p.day_index).unwrap_or(0),
        series.points.last().map(|p| p.day_index).unwrap_or(0),
    ));
    let stats = &series.stats;
    if stats.dropped_non_positive + stats.dropped_before_origin + stats.merged_duplicates > 0 {
        out.push_str(&format!(
            "Dropped: {} non-positive, {} before origin, {} same-day merged (of {} read)\n",
            stats.dropped_non_positive, stats.dropped_before_origin, stats.merged_duplicates, stats.samples_read
        ));
    }

    out.push_str("\nPower law fit:\n");
    out.push_str(&format!("- exponent (slope): {:.4}\n", fit.slope));
    out.push_str(&format!(
        "- intercept (ln USD): {:.4} (scale {:.4e})\n",
        fit.intercept,
        fit.intercept.exp()
    ));
    out.push_str(&format!("- R-squared: {:.4}\n", fit.r_squared));
    out.push_str(&format!("- channel: {}\n", fmt_channel(&config.channel)));
    out.push('\n');

    out
}

/// Format the yearly projection table.
pub fn format_milestones(rows: &[Milestone]) -> String {
    let mut out = String::new();
    out.push_str("Projection (Jan 1 each year):\n");
    out.push_str(
        format!(
            "{:<10} {:>7} {:>16} {:>16} {:>16}",
            "date", "day", "lower", "fit", "upper"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<7} {:-<16} {:-<16} {:-<16}", "", "", "", "", "").trim_end());
    out.push('\n');

    for m in rows {
        out.push_str(
            format!(
                "{:<10} {:>7} {:>16} {:>16} {:>16}",
                m.date.format("%Y-%m").to_string(),
                m.day_index,
                fmt_usd(m.lower),
                fmt_usd(m.central),
                fmt_usd(m.upper),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the above/below-trend tables.
pub fn format_extremes(extremes: &Extremes) -> String {
    let mut out = String::new();

    out.push_str("Furthest above trend:\n");
    out.push_str(&format_table(&extremes.above));
    out.push('\n');

    out.push_str("Furthest below trend:\n");
    out.push_str(&format_table(&extremes.below));

    out
}

fn format_table(rows: &[ObservedResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>7} {:>14} {:>14} {:>9} {:>8}",
            "date", "day", "price", "fit", "ln_resid", "channel"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(format!("{:-<10} {:-<7} {:-<14} {:-<14} {:-<9} {:-<8}", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<10} {:>7} {:>14} {:>14} {:>9.3} {:>8}",
                r.date.to_string(),
                r.point.day_index,
                fmt_usd(r.point.price),
                fmt_usd(r.fitted),
                r.log_residual,
                fmt_pct(r.channel_position),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_channel(channel: &Channel) -> String {
    format!(
        "upper={:+.2} (x{:.2}), lower={:+.2} (x{:.3})",
        channel.upper_offset,
        channel.upper_offset.exp(),
        channel.lower_offset,
        channel.lower_offset.exp()
    )
}

fn fmt_pct(v: f64) -> String {
    if v.is_finite() {
        format!("{:.0}%", v * 100.0)
    } else {
        "-".to_string()
    }
}

/// Format a USD amount with thousands separators, keeping cents below $100.
pub fn fmt_usd(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    if v.abs() < 100.0 {
        return format!("{v:.2}");
    }
    let whole = format!("{:.0}", v.abs());
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if v < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn usd_formatting_groups_thousands() {
        assert_eq!(fmt_usd(0.0858), "0.09");
        assert_eq!(fmt_usd(457.33), "457");
        assert_eq!(fmt_usd(68_789.63), "68,790");
        assert_eq!(fmt_usd(1_234_567.0), "1,234,567");
        assert_eq!(fmt_usd(f64::INFINITY), "-");
    }

    #[test]
    fn milestone_table_has_one_row_per_year() {
        let rows = vec![
            Milestone {
                date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                day_index: 7669,
                central: 350_000.0,
                upper: 2_586_000.0,
                lower: 128_760.0,
            },
            Milestone {
                date: NaiveDate::from_ymd_opt(2031, 1, 1).unwrap(),
                day_index: 8034,
                central: 450_000.0,
                upper: 3_325_000.0,
                lower: 165_540.0,
            },
        ];
        let txt = format_milestones(&rows);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("2030-01"));
        assert!(lines[3].contains("350,000"));
        assert!(lines[4].contains("3,325,000"));
    }
}
