//! Delimited table store.
//!
//! Rows are kept as raw strings exactly as read; numeric interpretation
//! happens on lookup through [`parse_numeric`], so a table written back out
//! is identical cell-for-cell to what was loaded.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::warn;

use crate::error::{AtlasError, AtlasResult};

/// Parse a cell as a number. Empty, unparseable and non-finite cells are absent.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Cell `idx` of `row`, or the empty string when the row is too short.
pub fn cell_at(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows dropped at load time because their field count did not match the header.
    pub skipped_rows: usize,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let index = build_index(&headers);
        Self {
            headers,
            rows,
            skipped_rows: 0,
            index,
        }
    }

    /// Load a comma-delimited table from disk.
    pub fn from_path(path: &Path) -> AtlasResult<Self> {
        if !path.is_file() {
            return Err(AtlasError::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> AtlasResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        let mut skipped_rows = 0;
        for (row_no, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() != headers.len() {
                warn!(
                    "skipping row {}: expected {} fields, found {}",
                    row_no + 1,
                    headers.len(),
                    record.len()
                );
                skipped_rows += 1;
                continue;
            }
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let mut table = Self::new(headers, rows);
        table.skipped_rows = skipped_rows;
        Ok(table)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> AtlasResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Index of a column that must exist, with `context` naming the table in the error.
    pub fn require_column(&self, column: &str, context: &str) -> AtlasResult<usize> {
        self.column_index(column).ok_or_else(|| AtlasError::MissingColumn {
            column: column.to_string(),
            context: context.to_string(),
        })
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(|s| s.as_str())
    }

    pub fn get_f64(&self, row: usize, column: &str) -> Option<f64> {
        self.get(row, column).and_then(parse_numeric)
    }

    /// Whole column as optional numbers; an unknown column is all-missing.
    pub fn column_f64(&self, column: &str) -> Vec<Option<f64>> {
        match self.column_index(column) {
            Some(idx) => self.rows.iter().map(|r| parse_numeric(cell_at(r, idx))).collect(),
            None => vec![None; self.rows.len()],
        }
    }
}

fn build_index(headers: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(headers.len());
    for (i, h) in headers.iter().enumerate() {
        // First occurrence wins for duplicated header names.
        index.entry(h.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("1.5"), Some(1.5));
        assert_eq!(parse_numeric(" 42 "), Some(42.0));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric(":"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
    }

    #[test]
    fn test_typed_lookups() {
        let csv = "geo,year,GRTL_NR\nDE,2020,5.0\nFR,2020,\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "geo"), Some("DE"));
        assert_eq!(table.get_f64(0, "GRTL_NR"), Some(5.0));
        assert_eq!(table.get_f64(1, "GRTL_NR"), None);
        assert_eq!(table.get(0, "missing"), None);
        assert_eq!(table.column_f64("GRTL_NR"), vec![Some(5.0), None]);
        assert_eq!(table.column_f64("nope"), vec![None, None]);
    }

    #[test]
    fn test_malformed_rows_are_skipped_and_counted() {
        let csv = "a,b,c\n1,2,3\n1,2\n4,5,6\n7,8,9,10\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped_rows, 2);
        assert_eq!(table.get(1, "a"), Some("4"));
    }

    #[test]
    fn test_missing_file() {
        let err = Table::from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, AtlasError::InputNotFound(_)));
        assert!(err.to_string().contains("input not found"));
    }

    #[test]
    fn test_write_then_read() {
        let table = Table::new(
            vec!["geo".into(), "year".into(), "x".into()],
            vec![
                vec!["DE".into(), "2020".into(), "1.250".into()],
                vec!["FR".into(), "2021".into(), "".into()],
            ],
        );
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        let back = Table::from_reader(buf.as_slice()).unwrap();
        assert_eq!(back.headers, table.headers);
        assert_eq!(back.rows, table.rows);
    }

    #[test]
    fn test_short_rows_read_as_missing() {
        let table = Table::new(
            vec!["geo".into(), "year".into(), "x".into()],
            vec![
                vec!["DE".into(), "2020".into(), "1.5".into()],
                vec!["FR".into()],
            ],
        );
        assert_eq!(table.column_f64("x"), vec![Some(1.5), None]);
        assert_eq!(table.get(1, "year"), None);
        assert_eq!(cell_at(&table.rows[1], 2), "");
        assert_eq!(cell_at(&table.rows[0], 1), "2020");
    }

    #[test]
    fn test_require_column() {
        let table = Table::new(vec!["geo".into()], vec![]);
        assert_eq!(table.require_column("geo", "master").unwrap(), 0);
        let err = table.require_column("year", "master").unwrap_err();
        assert!(err.to_string().contains("'year'"));
    }
}
