mod csv_source;
mod load;
mod table;
mod workbook_source;

use std::path::Path;

use thiserror::Error;
use tierfit_core::{ActivityRecord, CatalogEntry};

pub use csv_source::{parse_csv_table, read_csv_table};
pub use load::{
    DESCRIPTION_COLUMN, LICENSE_COLUMN, LICENSE_TYPE_COLUMN, Loaded, TCODE_COLUMN,
    USER_ID_COLUMN, USER_NAME_COLUMN, load_activity, load_catalog,
};
pub use table::{Table, TableRow};
pub use workbook_source::{WORKBOOK_EXTENSIONS, is_workbook_path, read_workbook_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Activity,
    Catalog,
}

impl Dataset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Catalog => "catalog",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read workbook {path}: {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },
    #[error("workbook {path} has no worksheets")]
    EmptyWorkbook { path: String },
    #[error("'{column}' column missing in {dataset} dataset")]
    MissingColumn {
        dataset: Dataset,
        column: &'static str,
    },
}

/// Reads a workbook (by extension, see [`WORKBOOK_EXTENSIONS`]) or otherwise a CSV file.
pub fn read_table(path: &Path) -> Result<Table, IngestError> {
    if is_workbook_path(path) {
        read_workbook_table(path)
    } else {
        read_csv_table(path)
    }
}

pub fn read_activity_file(path: &Path) -> Result<Loaded<ActivityRecord>, IngestError> {
    let table = read_table(path)?;
    load_activity(&table)
}

pub fn read_catalog_file(path: &Path) -> Result<Loaded<CatalogEntry>, IngestError> {
    let table = read_table(path)?;
    load_catalog(&table)
}
