//! Columnar node/edge tables read from tab-separated files

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or writing tables
#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error in {path}: {message}")]
    Format { path: String, message: String },
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// A required column is missing from a node or edge table
#[derive(Debug, Error)]
#[error("{table} table is missing required column '{column}'")]
pub struct SchemaError {
    pub table: &'static str,
    pub column: &'static str,
}

/// An in-memory table with named columns and string cells.
///
/// Column order and row order are preserved exactly as read. Rows are kept
/// verbatim: duplicate node ids or duplicate edges stay as distinct rows,
/// deduplication is a caller concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Create a table from a header and pre-built rows
    pub fn with_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Column names, in file order
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// All rows, in file order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows (the header does not count)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row. The row must have one cell per header column.
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.push(row);
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Position of a column that must exist, naming the table role in the error
    pub fn require_column(
        &self,
        column: &'static str,
        table: &'static str,
    ) -> Result<usize, SchemaError> {
        self.column_index(column)
            .ok_or(SchemaError { table, column })
    }

    /// Cell value by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Read a tab-separated table with a header row.
    ///
    /// Rows whose cell count differs from the header surface as
    /// [`TableError::Format`]; unreadable files as [`TableError::Io`].
    pub fn read_tsv(path: impl AsRef<Path>) -> TableResult<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let header: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(path, e))?
            .iter()
            .map(String::from)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(path, e))?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { header, rows })
    }

    /// Write the table as tab-separated values with a header row
    pub fn write_tsv(&self, path: impl AsRef<Path>) -> TableResult<()> {
        let path = path.as_ref();
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        writer
            .write_record(&self.header)
            .map_err(|e| csv_error(path, e))?;
        for row in &self.rows {
            writer.write_record(row).map_err(|e| csv_error(path, e))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Map csv-crate errors, keeping IO failures distinct from malformed content
fn csv_error(path: &Path, err: csv::Error) -> TableError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => TableError::Io(e),
        _ => TableError::Format {
            path: path.display().to_string(),
            message,
        },
    }
}
