use tierfit_core::normalize_header;

/// A rectangular dataset as delivered by a file reader: trimmed headers plus raw cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I, rows: Vec<Vec<String>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers = headers
            .into_iter()
            .map(|header| normalize_header(header.as_ref().trim_start_matches('\u{feff}')))
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column whose trimmed header equals `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| TableRow { index, cells })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    index: usize,
    cells: &'a [String],
}

impl<'a> TableRow<'a> {
    /// Zero-based position of the row below the header line.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cell(&self, column: Option<usize>) -> Option<&'a str> {
        column
            .and_then(|index| self.cells.get(index))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| (*cell).to_owned()).collect()
    }

    #[test]
    fn headers_are_trimmed_and_byte_order_mark_removed() {
        let table = Table::new(["\u{feff}Tcode", " User Name "], Vec::new());

        assert_eq!(table.headers(), ["Tcode", "User Name"]);
        assert_eq!(table.column("User Name"), Some(1));
        assert_eq!(table.column("License"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn short_rows_yield_absent_cells() {
        let table = Table::new(
            ["Tcode", "User Name", "License"],
            vec![row(&["VA01", "Alice"]), row(&["ME21N", "Bob", "Functional"])],
        );
        let license = table.column("License");

        let cells = table
            .rows()
            .map(|row| (row.index(), row.cell(license)))
            .collect::<Vec<_>>();

        assert_eq!(cells, vec![(0, None), (1, Some("Functional"))]);
        assert_eq!(table.len(), 2);
    }
}
