use crate::cell::CellValue;
use crate::error::Result;
use crate::table::Table;

/// Header lines of a freshly loaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    /// First header line: category labels (or the only header line).
    pub labels: Vec<String>,
    /// Second header line: indicator codes, when the file has a two-line header.
    pub codes: Option<Vec<String>>,
}

impl RawHeader {
    /// Creates a single-line header.
    pub fn single(labels: Vec<String>) -> Self {
        Self {
            labels,
            codes: None,
        }
    }

    /// Creates a two-line header (category labels + indicator codes).
    pub fn double(labels: Vec<String>, codes: Vec<String>) -> Self {
        Self {
            labels,
            codes: Some(codes),
        }
    }

    /// Number of header lines (1 or 2).
    pub fn lines(&self) -> usize {
        if self.codes.is_some() { 2 } else { 1 }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the indicator code under a category label, if available.
    pub fn code_for(&self, index: usize) -> Option<&str> {
        self.codes
            .as_ref()
            .and_then(|codes| codes.get(index).map(String::as_str))
    }
}

/// A table as it comes out of a loader: header line(s) plus positional data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub header: RawHeader,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(header: RawHeader, rows: Vec<Vec<CellValue>>) -> Self {
        Self { header, rows }
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Uses the first header line as column names, ignoring any code line.
    pub fn into_table(self) -> Result<Table> {
        Table::from_rows(self.header.labels, self.rows)
    }
}
