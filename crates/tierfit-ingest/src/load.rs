use tierfit_core::{ActivityRecord, CatalogEntry};

use crate::table::Table;
use crate::{Dataset, IngestError};

pub const TCODE_COLUMN: &str = "Tcode";
pub const USER_NAME_COLUMN: &str = "User Name";
pub const USER_ID_COLUMN: &str = "User ID";
pub const LICENSE_COLUMN: &str = "License";
pub const LICENSE_TYPE_COLUMN: &str = "License Type";
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Typed records from one dataset plus the rows that could not become records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    /// Zero-based row positions that were skipped for a blank key field.
    pub skipped_rows: Vec<usize>,
}

pub fn load_activity(table: &Table) -> Result<Loaded<ActivityRecord>, IngestError> {
    let tcode = require_column(table, Dataset::Activity, TCODE_COLUMN)?;
    let user_name = require_column(table, Dataset::Activity, USER_NAME_COLUMN)?;
    let user_id = table.column(USER_ID_COLUMN);
    let license = table.column(LICENSE_COLUMN);

    let mut loaded = Loaded {
        records: Vec::with_capacity(table.len()),
        skipped_rows: Vec::new(),
    };
    for row in table.rows() {
        match ActivityRecord::from_raw(
            row.cell(user_id),
            row.cell(Some(user_name)),
            row.cell(Some(tcode)),
            row.cell(license),
        ) {
            Some(record) => loaded.records.push(record),
            None => {
                tracing::debug!(row = row.index(), "activity row has a blank user name or tcode");
                loaded.skipped_rows.push(row.index());
            }
        }
    }

    report_skipped(Dataset::Activity, &loaded);
    Ok(loaded)
}

pub fn load_catalog(table: &Table) -> Result<Loaded<CatalogEntry>, IngestError> {
    let tcode = require_column(table, Dataset::Catalog, TCODE_COLUMN)?;
    let license_type = require_column(table, Dataset::Catalog, LICENSE_TYPE_COLUMN)?;
    let description = table.column(DESCRIPTION_COLUMN);

    let mut loaded = Loaded {
        records: Vec::with_capacity(table.len()),
        skipped_rows: Vec::new(),
    };
    for row in table.rows() {
        match CatalogEntry::from_raw(
            row.cell(Some(tcode)),
            row.cell(Some(license_type)),
            row.cell(description),
        ) {
            Some(entry) => {
                if entry.license_type.is_some() && entry.tier().is_none() {
                    tracing::debug!(
                        row = row.index(),
                        tcode = %entry.activity_code,
                        license_type = entry.license_type.as_deref().unwrap_or_default(),
                        "catalog license type is not a ranked tier"
                    );
                }
                loaded.records.push(entry);
            }
            None => {
                tracing::debug!(row = row.index(), "catalog row has a blank tcode");
                loaded.skipped_rows.push(row.index());
            }
        }
    }

    report_skipped(Dataset::Catalog, &loaded);
    Ok(loaded)
}

fn require_column(
    table: &Table,
    dataset: Dataset,
    column: &'static str,
) -> Result<usize, IngestError> {
    table
        .column(column)
        .ok_or(IngestError::MissingColumn { dataset, column })
}

fn report_skipped<T>(dataset: Dataset, loaded: &Loaded<T>) {
    if loaded.skipped_rows.is_empty() {
        tracing::debug!(dataset = dataset.as_str(), records = loaded.records.len(), "dataset loaded");
        return;
    }

    tracing::warn!(
        dataset = dataset.as_str(),
        records = loaded.records.len(),
        skipped = loaded.skipped_rows.len(),
        "skipped rows with blank key fields"
    );
}
