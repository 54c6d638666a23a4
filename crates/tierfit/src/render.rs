use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tierfit_analysis::{DistributionEntry, PopulationReport, UserListing, UserReport};
use tierfit_core::UserAssessment;

use crate::cli::OutputFormat;

/// Widest bar drawn for a distribution's largest bucket.
pub const MAX_BAR_WIDTH: usize = 40;
const MISSING_FIELD: &str = "N/A";

pub fn write_users(users: &[UserListing], format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(users, out),
        OutputFormat::Table => {
            writeln!(out, "key\tuser_name\tuser_id\tactivity_rows")?;
            for user in users {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    normalize_table_field(&user.key),
                    normalize_table_field(&user.user_name),
                    normalize_table_field(user.user_id.as_deref().unwrap_or(MISSING_FIELD)),
                    user.activity_rows
                )?;
            }
            Ok(())
        }
    }
}

pub fn write_user_report(
    report: &UserReport,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    if format == OutputFormat::Json {
        return write_json(report, out);
    }

    let assessment = &report.assessment;
    writeln!(out, "field\tvalue")?;
    writeln!(out, "user_name\t{}", normalize_table_field(&assessment.user_name))?;
    writeln!(
        out,
        "user_id\t{}",
        normalize_table_field(assessment.user_id.as_deref().unwrap_or(MISSING_FIELD))
    )?;
    writeln!(
        out,
        "current_license\t{}",
        normalize_table_field(assessment.current_license.label())
    )?;
    writeln!(
        out,
        "recommended_license\t{}",
        assessment.recommended_license.label()
    )?;
    writeln!(out, "status\t{}", assessment.status.as_str())?;

    write_distribution("License Type Distribution", &report.tier_distribution, out)?;

    writeln!(out)?;
    writeln!(out, "## Details")?;
    writeln!(out, "tcode\tlicense_type\tdescription")?;
    for row in &report.details {
        writeln!(
            out,
            "{}\t{}\t{}",
            normalize_table_field(&row.activity_code),
            normalize_table_field(&row.license_type),
            normalize_table_field(&row.description)
        )?;
    }

    write_notes(&report.notes, out)
}

pub fn write_population_report(
    report: &PopulationReport,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    if format == OutputFormat::Json {
        return write_json(report, out);
    }

    write_assessments(&report.assessments, out)?;
    write_distribution(
        "Recommended License Distribution",
        &report.recommended_distribution,
        out,
    )?;
    write_distribution(
        "License Optimization Status",
        &report.status_distribution,
        out,
    )?;

    write_notes(&report.notes, out)
}

fn write_notes(notes: &[String], out: &mut dyn Write) -> Result<()> {
    if notes.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "## Notes")?;
    for note in notes {
        writeln!(out, "- {}", normalize_table_field(note))?;
    }
    Ok(())
}

pub fn write_assessments(assessments: &[UserAssessment], out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "user_name\tuser_id\tcurrent_license\trecommended_license\tstatus"
    )?;
    for assessment in assessments {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            normalize_table_field(&assessment.user_name),
            normalize_table_field(assessment.user_id.as_deref().unwrap_or(MISSING_FIELD)),
            normalize_table_field(assessment.current_license.label()),
            assessment.recommended_license.label(),
            assessment.status.as_str()
        )?;
    }
    Ok(())
}

/// Renders a distribution as text bars. Empty distributions render nothing.
pub fn write_distribution(
    title: &str,
    entries: &[DistributionEntry],
    out: &mut dyn Write,
) -> Result<()> {
    let Some(max) = entries.iter().map(|entry| entry.count).max().filter(|max| *max > 0) else {
        tracing::debug!(title, "skipping empty distribution");
        return Ok(());
    };

    writeln!(out)?;
    writeln!(out, "## {title}")?;
    writeln!(out, "label\tcount\tbar")?;
    for entry in entries {
        writeln!(
            out,
            "{}\t{}\t{}",
            normalize_table_field(&entry.label),
            entry.count,
            "#".repeat(bar_width(entry.count, max))
        )?;
    }
    Ok(())
}

fn bar_width(count: u32, max: u32) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    let scaled = (count as usize * MAX_BAR_WIDTH).div_ceil(max as usize);
    scaled.clamp(1, MAX_BAR_WIDTH)
}

pub fn write_json<T: Serialize + ?Sized>(value: &T, out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize JSON output")?;
    writeln!(out).context("failed to write trailing newline")?;
    Ok(())
}

fn normalize_table_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
