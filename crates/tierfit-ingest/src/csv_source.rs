use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::IngestError;
use crate::table::Table;

pub fn read_csv_table(path: &Path) -> Result<Table, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })?;
    parse_csv_table(file)
}

pub fn parse_csv_table(reader: impl Read) -> Result<Table, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "parsed CSV table");
    Ok(Table::new(headers.iter(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_table_reads_headers_and_ragged_rows() {
        let raw = " Tcode ,User Name,License\nva01,Alice,Professional\nme21n,Bob\n";

        let table = parse_csv_table(raw.as_bytes()).expect("parse csv");

        assert_eq!(table.headers(), ["Tcode", "User Name", "License"]);
        assert_eq!(table.len(), 2);
        let license = table.column("License");
        let licenses = table
            .rows()
            .map(|row| row.cell(license))
            .collect::<Vec<_>>();
        assert_eq!(licenses, vec![Some("Professional"), None]);
    }

    #[test]
    fn read_csv_table_reports_missing_file() {
        let err = read_csv_table(Path::new("/nonexistent/tierfit/activity.csv"))
            .expect_err("expected open error");

        assert!(matches!(err, IngestError::Open { .. }));
        assert!(err.to_string().contains("activity.csv"));
    }
}
