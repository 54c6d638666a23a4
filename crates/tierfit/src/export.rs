use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tierfit_config::ReportConfig;
use tierfit_core::UserAssessment;

use crate::cli::ExportFormat;
use crate::render::write_json;

pub const MISSING_USER_ID: &str = "N/A";
pub const REPORT_COLUMNS: [&str; 5] = [
    "User Name",
    "User ID",
    "Current License",
    "Recommended License",
    "Status",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "User Name")]
    user_name: &'a str,
    #[serde(rename = "User ID")]
    user_id: &'a str,
    #[serde(rename = "Current License")]
    current_license: &'a str,
    #[serde(rename = "Recommended License")]
    recommended_license: &'a str,
    #[serde(rename = "Status")]
    status: &'a str,
}

impl<'a> From<&'a UserAssessment> for ExportRow<'a> {
    fn from(assessment: &'a UserAssessment) -> Self {
        Self {
            user_name: &assessment.user_name,
            user_id: assessment.user_id.as_deref().unwrap_or(MISSING_USER_ID),
            current_license: assessment.current_license.label(),
            recommended_license: assessment.recommended_license.label(),
            status: assessment.status.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ExportSheet<'a> {
    sheet: &'a str,
    rows: Vec<ExportRow<'a>>,
}

/// Target file for an export. Directories get `<export_stem>.<ext>` appended.
pub fn resolve_export_path(target: &Path, format: ExportFormat, config: &ReportConfig) -> PathBuf {
    if target.is_dir() {
        target.join(format!("{}.{}", config.export_stem, format.extension()))
    } else {
        target.to_path_buf()
    }
}

pub fn write_export(
    assessments: &[UserAssessment],
    format: ExportFormat,
    sheet_name: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let rows = assessments.iter().map(ExportRow::from);
    match format {
        ExportFormat::Csv => {
            // Header row is present even with no assessments.
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(out);
            writer
                .write_record(REPORT_COLUMNS)
                .context("failed to write CSV header")?;
            for row in rows {
                writer.serialize(row).context("failed to write CSV row")?;
            }
            writer.flush().context("failed to flush CSV export")?;
            Ok(())
        }
        ExportFormat::Json => write_json(
            &ExportSheet {
                sheet: sheet_name,
                rows: rows.collect(),
            },
            out,
        ),
    }
}

/// Writes the recommendation table to `target` and returns the file written.
pub fn export_assessments(
    assessments: &[UserAssessment],
    format: ExportFormat,
    config: &ReportConfig,
    target: &Path,
) -> Result<PathBuf> {
    let path = resolve_export_path(target, format, config);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export directory {}", parent.display()))?;
    }

    let file = File::create(&path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_export(assessments, format, &config.sheet_name, &mut out)?;
    out.flush()
        .with_context(|| format!("failed to flush export file {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        format = format.as_str(),
        rows = assessments.len(),
        "report exported"
    );
    Ok(path)
}
