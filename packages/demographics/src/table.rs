//! Wide-format string table read from and written to CSV.
//!
//! Both the raw ACS export and the normalized cache use this shape: a
//! header row followed by one row per ZIP code. Cells are kept as text and
//! coerced by the normalizer.

use std::io::Read;
use std::path::Path;

use crate::DataError;

/// A header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column headers exactly as read.
    pub headers: Vec<String>,
    /// Data rows. Rows may be shorter than the header row.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Builds a table from headers and rows.
    #[must_use]
    pub const fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parses a table from CSV text.
    ///
    /// # Errors
    ///
    /// Returns [`csv::Error`] if the input is not valid CSV.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Reads a table from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the file cannot be opened or parsed.
    pub fn read_csv(path: &Path) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        log::debug!(
            "Read {} rows x {} columns from {}",
            table.rows.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Writes the table to a CSV file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if the file cannot be written.
    pub fn write_csv(&self, path: &Path) -> Result<(), DataError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Returns the cell at `row`/`column`, if present.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}
