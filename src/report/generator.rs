//! Report rendering.
//!
//! The JSON rendering is the primary artifact; the Markdown rendering is a
//! human-readable summary of the same `Report`.

use crate::models::{AggregateSection, MonthlyStats, Report};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Generate the JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a Markdown summary of the report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# CPS Labor Market Report\n\n");

    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_headline_section(&report.monthly));

    if let Some(latest) = report.monthly.last() {
        output.push_str(&generate_latest_month_section(latest));
    }

    if let Some(ref industries) = report.industries {
        output.push_str(&generate_aggregate_section("Industries", industries));
    }
    if let Some(ref occupations) = report.occupations {
        output.push_str(&generate_aggregate_section("Occupations", occupations));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Generated:** {}\n", report.generated_at));
    if let (Some(first), Some(last)) = (report.monthly.first(), report.monthly.last()) {
        section.push_str(&format!(
            "- **Period:** {} to {}\n",
            first.period(),
            last.period()
        ));
    }
    section.push_str(&format!(
        "- **Months with data:** {} of {}\n",
        report.lookback_months, report.requested_months
    ));
    section.push('\n');

    section
}

/// One row per month with the headline indicators.
fn generate_headline_section(monthly: &[MonthlyStats]) -> String {
    let mut section = String::new();

    section.push_str("## Monthly Indicators\n\n");
    section.push_str(
        "| Month | Unemployment % | LFPR % | Median Wage $ | At/Below Min Wage % | Part-time % | Youth LFPR % | Prime-age LFPR % | Overtime Hrs |\n",
    );
    section.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|---:|\n");

    for m in monthly {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            m.period(),
            cell(m.unemployment_rate),
            cell(m.labor_force_participation_rate),
            cell(m.median_hourly_wage),
            cell(m.min_wage_pct),
            cell(m.parttime_employment_rate),
            cell(m.youth_participation_rate),
            cell(m.prime_age_participation_rate),
            cell(m.median_overtime_hours),
        ));
    }
    section.push('\n');

    section
}

/// Breakdowns for the most recent month.
fn generate_latest_month_section(latest: &MonthlyStats) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Latest Month: {}\n\n", latest.period()));

    if let Some(rate) = latest.discouraged_rate_per_100k {
        section.push_str(&format!(
            "Discouraged workers: **{:.2}** per 100,000 persons\n\n",
            rate
        ));
    }

    if !latest.top_industries.is_empty() {
        section.push_str("### Largest Industries\n\n");
        section.push_str("| Industry | Employment |\n");
        section.push_str("|:---|---:|\n");
        for group in &latest.top_industries {
            section.push_str(&format!("| {} | {} |\n", group.name, group.employment));
        }
        section.push('\n');
    }

    if !latest.top_occupations.is_empty() {
        section.push_str("### Largest Occupations\n\n");
        section.push_str("| Occupation | Employment |\n");
        section.push_str("|:---|---:|\n");
        for group in &latest.top_occupations {
            section.push_str(&format!("| {} | {} |\n", group.name, group.employment));
        }
        section.push('\n');
    }

    if !latest.unemployment_by_industry.is_empty() {
        section.push_str("### Unemployment by Industry\n\n");
        section.push_str("| Industry | Rate % | Labor Force | Sample |\n");
        section.push_str("|:---|---:|---:|---:|\n");
        let mut groups: Vec<_> = latest.unemployment_by_industry.iter().collect();
        groups.sort_by(|a, b| {
            b.unemployment_rate
                .partial_cmp(&a.unemployment_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for group in groups {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                group.name,
                cell(group.unemployment_rate),
                group.labor_force,
                group.sample_size
            ));
        }
        section.push('\n');
    }

    section
}

/// Long-window section for one dimension.
fn generate_aggregate_section(title: &str, aggregate: &AggregateSection) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## {} ({} months combined)\n\n",
        title, aggregate.months
    ));

    if !aggregate.highest_paying.is_empty() {
        section.push_str("### Highest Paying\n\n");
        section.push_str("| Name | Median Wage $ | Sample |\n");
        section.push_str("|:---|---:|---:|\n");
        for rank in &aggregate.highest_paying {
            section.push_str(&format!(
                "| {} | {:.2} | {} |\n",
                rank.name, rank.median_hourly_wage, rank.sample_size
            ));
        }
        section.push('\n');
    }

    if !aggregate.lowest_paying.is_empty() {
        section.push_str("### Lowest Paying\n\n");
        section.push_str("| Name | Median Wage $ | Sample |\n");
        section.push_str("|:---|---:|---:|\n");
        for rank in &aggregate.lowest_paying {
            section.push_str(&format!(
                "| {} | {:.2} | {} |\n",
                rank.name, rank.median_hourly_wage, rank.sample_size
            ));
        }
        section.push('\n');
    }

    section
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Source: Current Population Survey basic monthly microdata, U.S. Census Bureau*\n"
        .to_string()
}

/// Write rendered report content to a file, creating parent directories.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
