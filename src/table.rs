//! In-memory tables and CSV read/write.

use std::fs::File;
use std::path::Path;

use crate::error::TableError;

/// One input or output table: named columns and string cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// Identifies the table in logs and errors (usually the file name)
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Builder-style helper, mostly for tests.
    pub fn with_row(mut self, row: &[&str]) -> Self {
        self.rows.push(row.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrowing view over each row.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |values| Record {
            headers: &self.headers,
            values,
        })
    }
}

/// A row with access by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> Record<'a> {
    /// Cell for a column; `None` when the column does not exist.
    /// Short rows read missing trailing cells as empty.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        Some(self.values.get(idx).map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

/// Read a CSV file with a header row.
pub fn read_csv(path: &Path) -> Result<Table, TableError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| csv_error(path, source))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| csv_error(path, source))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Table {
        name,
        headers,
        rows,
    })
}

/// Write a table as CSV with a header row.
pub fn write_csv(table: &Table, path: &Path) -> Result<(), TableError> {
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(&table.headers)
        .map_err(|source| csv_error(path, source))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|source| csv_error(path, source))?;
    }
    writer.flush().map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> TableError {
    TableError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> TableError {
    TableError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_get() {
        let table = Table::new("t", vec!["a".to_string(), "b".to_string()])
            .with_row(&["1", "2"])
            .with_row(&["3"]);
        let records: Vec<Record> = table.records().collect();
        assert_eq!(records[0].get("b"), Some("2"));
        assert_eq!(records[1].get("b"), Some(""));
        assert_eq!(records[0].get("missing"), None);
    }

    #[test]
    fn test_csv_round_trip_keeps_quoting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("azure_activity.csv");
        std::fs::write(
            &path,
            "Operation Name,Description\n\"Delete, then recreate\",\"say \"\"hi\"\"\"\n",
        )
        .unwrap();

        let table = read_csv(&path).unwrap();
        assert_eq!(table.name, "azure_activity.csv");
        assert_eq!(table.rows[0][0], "Delete, then recreate");
        assert_eq!(table.rows[0][1], "say \"hi\"");

        let out = dir.path().join("out.csv");
        write_csv(&table, &out).unwrap();
        let back = read_csv(&out).unwrap();
        assert_eq!(back.headers, table.headers);
        assert_eq!(back.rows, table.rows);
    }

    #[test]
    fn test_ragged_csv_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "a,b\n1,2,3\n").unwrap();
        assert!(matches!(read_csv(&path), Err(TableError::Csv { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }
}
