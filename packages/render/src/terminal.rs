//! Plain-text dashboard for the terminal.

use std::io::Write;

use accident_map_accident_models::RiskTier;
use accident_map_analytics_models::DashboardSummary;
use accident_map_geography_models::{JoinReport, SubdivisionRow};
use console::{StyledObject, style};

fn tier_style<D>(tier: RiskTier, value: D) -> StyledObject<D> {
    match tier {
        RiskTier::HighRisk => style(value).red(),
        RiskTier::Caution => style(value).yellow(),
        RiskTier::Safe => style(value).green(),
    }
}

/// Writes the two headline metrics and the three tier blocks.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` fails.
pub fn write_summary<W: Write>(out: &mut W, summary: &DashboardSummary) -> std::io::Result<()> {
    writeln!(out, "Total accidents:   {}", style(summary.total_accidents).bold())?;
    writeln!(out, "Subdivisions:      {}", style(summary.subdivision_count).bold())?;
    writeln!(out)?;

    for t in &summary.tiers {
        writeln!(
            out,
            "{} {:<24} {:>7} accidents  {:>3} subdivision(s)",
            tier_style(t.tier, "\u{25a0}"),
            tier_style(t.tier, t.tier.zone_label()),
            t.total_accidents,
            t.subdivisions
        )?;
    }

    Ok(())
}

/// Writes the detail table, sorted by subdivision name.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` fails.
pub fn write_table<W: Write>(out: &mut W, rows: &[&SubdivisionRow]) -> std::io::Result<()> {
    let mut sorted: Vec<&SubdivisionRow> = rows.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    writeln!(
        out,
        "{:<24} {:>7} {:>7} {:<10} {:>11} {:>10}",
        "SUBDIVISION", "COUNT", "CLUSTER", "TIER", "LONGITUDE", "LATITUDE"
    )?;
    writeln!(out, "{}", "-".repeat(74))?;

    for row in sorted {
        writeln!(
            out,
            "{:<24} {:>7} {:>7} {:<10} {:>11.5} {:>10.5}",
            row.name,
            row.count,
            row.cluster,
            tier_style(row.tier, format!("{:<10}", row.tier.label())),
            row.longitude,
            row.latitude
        )?;
    }

    writeln!(out, "\n{} subdivision(s)", rows.len())?;
    Ok(())
}

/// Lists names that fell out of the join.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` fails.
pub fn write_join_report<W: Write>(out: &mut W, report: &JoinReport) -> std::io::Result<()> {
    if report.is_clean() {
        writeln!(out, "Every subdivision matched a boundary.")?;
        return Ok(());
    }

    if !report.unmatched_locations.is_empty() {
        writeln!(
            out,
            "Accident locations without a boundary ({}):",
            report.unmatched_locations.len()
        )?;
        for name in &report.unmatched_locations {
            writeln!(out, "  {name}")?;
        }
    }

    if !report.boundaries_without_data.is_empty() {
        writeln!(
            out,
            "Boundaries without accidents ({}):",
            report.boundaries_without_data.len()
        )?;
        for name in &report.boundaries_without_data {
            writeln!(out, "  {name}")?;
        }
    }

    Ok(())
}
