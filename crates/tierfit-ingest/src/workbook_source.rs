use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::IngestError;
use crate::table::Table;

pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

/// Reads the first worksheet of a workbook. Its first used row is the header row.
pub fn read_workbook_table(path: &Path) -> Result<Table, IngestError> {
    let workbook_error = |source: calamine::Error| IngestError::Workbook {
        path: path.display().to_string(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::EmptyWorkbook {
            path: path.display().to_string(),
        });
    };
    let range = workbook.worksheet_range(&sheet).map_err(workbook_error)?;

    let table = range_to_table(&range);
    tracing::debug!(
        sheet = %sheet,
        columns = table.headers().len(),
        rows = table.len(),
        "parsed workbook sheet"
    );
    Ok(table)
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Table::new(headers, rows)
}

/// Text form of a cell. Whole floats drop their fraction so numeric ids read like typed ids.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{value:.0}")
            } else {
                value.to_string()
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => {
            if *value {
                "TRUE".to_owned()
            } else {
                "FALSE".to_owned()
            }
        }
        Data::DateTime(value) => value.to_string(),
    }
}
