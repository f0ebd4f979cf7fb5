//! Delimited-text loading with encoding/delimiter sniffing.
//!
//! Candidates are tried in preference order and each is judged on a short
//! preview; the first one that yields more than one column is used for the
//! full load. When none qualifies the file is parsed once more with a
//! permissive default (lossy UTF-8, comma) that skips malformed rows.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use esg_model::{CellValue, RawTable};

use crate::dialect::{
    DEFAULT_DELIMITERS, DEFAULT_ENCODINGS, Delimiter, Dialect, TextEncoding, dialect_candidates,
    first_success,
};
use crate::error::{IngestError, Result};
use crate::header::build_header;

/// Data rows read (after the header lines) when judging a candidate dialect.
pub const PREVIEW_ROWS: usize = 5;

/// Options shared by the delimited-text and spreadsheet loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Encodings in preference order.
    pub encodings: Vec<TextEncoding>,
    /// Delimiters in preference order (tried for each encoding).
    pub delimiters: Vec<Delimiter>,
    /// Data rows parsed during the preview of a candidate.
    pub preview_rows: usize,
    /// Header lines at the top of the file (1 or 2).
    pub header_rows: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            encodings: DEFAULT_ENCODINGS.to_vec(),
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            preview_rows: PREVIEW_ROWS,
            header_rows: 1,
        }
    }
}

impl LoadOptions {
    /// Options for files with a category line above the indicator-code line.
    #[must_use]
    pub fn two_line_header() -> Self {
        Self {
            header_rows: 2,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header_rows(mut self, header_rows: usize) -> Self {
        self.header_rows = header_rows.clamp(1, 2);
        self
    }

    #[must_use]
    pub fn with_delimiters(mut self, delimiters: &[Delimiter]) -> Self {
        self.delimiters = delimiters.to_vec();
        self
    }
}

/// A loaded file and how it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table: RawTable,
    /// Dialect that produced the table; `None` for spreadsheets and for the permissive fallback.
    pub dialect: Option<Dialect>,
    /// Malformed rows dropped during the load.
    pub skipped_rows: usize,
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| IngestError::from_io(path, e))
}

fn reader(text: &str, delimiter: Delimiter) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.byte())
        .from_reader(text.as_bytes())
}

fn record_strings(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

/// Parses the header lines plus a few data rows and reports the column count.
///
/// A data row wider than the header rejects the candidate, as does a header
/// with fewer than two columns.
fn preview_width(
    text: &str,
    delimiter: Delimiter,
    options: &LoadOptions,
) -> std::result::Result<usize, String> {
    let mut width = None;
    let limit = options.header_rows + options.preview_rows;
    for (idx, record) in reader(text, delimiter).records().take(limit).enumerate() {
        let record = record.map_err(|e| e.to_string())?;
        match width {
            None => width = Some(record.len()),
            Some(expected) if idx >= options.header_rows && record.len() > expected => {
                return Err(format!(
                    "expected {expected} fields in line {}, saw {}",
                    idx + 1,
                    record.len()
                ));
            }
            Some(_) => {}
        }
    }
    match width {
        Some(columns) if columns > 1 => Ok(columns),
        Some(columns) => Err(format!("{columns} column(s)")),
        None => Err("no rows".to_string()),
    }
}

/// Full permissive parse: wide rows are skipped, short rows padded with `Missing`.
///
/// Returns `None` when the text has no header line at all.
fn parse_delimited(
    text: &str,
    delimiter: Delimiter,
    header_rows: usize,
) -> Option<(RawTable, usize)> {
    let mut skipped = 0usize;
    let mut records = Vec::new();
    for record in reader(text, delimiter).records() {
        match record {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                debug!(error = %err, "skipping unreadable row");
            }
        }
    }
    if records.is_empty() {
        return None;
    }
    let split = header_rows.min(records.len());
    let header_lines: Vec<Vec<String>> = records[..split].iter().map(record_strings).collect();
    let header = build_header(&header_lines, header_rows);
    let width = header.len();
    let mut rows = Vec::with_capacity(records.len() - split);
    for (idx, record) in records[split..].iter().enumerate() {
        if record.len() > width {
            skipped += 1;
            debug!(
                line = idx + split + 1,
                expected = width,
                actual = record.len(),
                "skipping malformed row"
            );
            continue;
        }
        let row = (0..width)
            .map(|col| record.get(col).map_or(CellValue::Missing, CellValue::from_text))
            .collect();
        rows.push(row);
    }
    Some((RawTable::new(header, rows), skipped))
}

fn try_dialect(
    bytes: &[u8],
    dialect: Dialect,
    options: &LoadOptions,
) -> std::result::Result<(RawTable, usize), String> {
    let text = dialect
        .encoding
        .decode(bytes)
        .ok_or_else(|| format!("invalid {} byte sequence", dialect.encoding))?;
    preview_width(&text, dialect.delimiter, options)?;
    parse_delimited(&text, dialect.delimiter, options.header_rows)
        .ok_or_else(|| "no rows".to_string())
}

/// Discovers the first (encoding, delimiter) pair whose preview has more than one column.
pub fn sniff_dialect(path: &Path, options: &LoadOptions) -> Result<Dialect> {
    let bytes = read_bytes(path)?;
    sniff_bytes(&bytes, path, options)
}

fn sniff_bytes(bytes: &[u8], path: &Path, options: &LoadOptions) -> Result<Dialect> {
    let candidates = dialect_candidates(&options.encodings, &options.delimiters);
    let tried = candidates.len();
    first_success(
        candidates,
        |dialect| {
            let text = dialect
                .encoding
                .decode(bytes)
                .ok_or_else(|| format!("invalid {} byte sequence", dialect.encoding))?;
            preview_width(&text, dialect.delimiter, options)
        },
        |dialect, reason| debug!(%dialect, %reason, "dialect rejected"),
    )
    .map(|(dialect, _)| dialect)
    .ok_or_else(|| IngestError::FormatDetection {
        path: path.to_path_buf(),
        tried,
    })
}

/// Loads a file with an already-known dialect (no sniffing, no fallback).
pub fn read_with_dialect(
    path: &Path,
    dialect: Dialect,
    header_rows: usize,
) -> Result<LoadedTable> {
    let bytes = read_bytes(path)?;
    let text = dialect
        .encoding
        .decode(&bytes)
        .ok_or_else(|| IngestError::FileUnreadable {
            path: path.to_path_buf(),
            reason: format!("invalid {} byte sequence", dialect.encoding),
        })?;
    let (table, skipped_rows) = parse_delimited(&text, dialect.delimiter, header_rows)
        .ok_or_else(|| IngestError::FileUnreadable {
            path: path.to_path_buf(),
            reason: "no rows".to_string(),
        })?;
    Ok(LoadedTable {
        table,
        dialect: Some(dialect),
        skipped_rows,
    })
}

/// Loads a delimited-text file, sniffing its dialect first.
///
/// # Errors
///
/// `FileUnreadable` when neither a candidate dialect nor the permissive
/// fallback produced a table; I/O errors for missing or unreadable files.
pub fn load_delimited(path: &Path, options: &LoadOptions) -> Result<LoadedTable> {
    let bytes = read_bytes(path)?;
    let candidates = dialect_candidates(&options.encodings, &options.delimiters);
    let tried = candidates.len();

    let found = first_success(
        candidates,
        |dialect| try_dialect(&bytes, *dialect, options),
        |dialect, reason| debug!(%dialect, %reason, "dialect rejected"),
    );
    if let Some((dialect, (table, skipped_rows))) = found {
        info!(
            path = %path.display(),
            encoding = %dialect.encoding,
            separator = %dialect.delimiter,
            rows = table.height(),
            columns = table.width(),
            "match found"
        );
        return Ok(LoadedTable {
            table,
            dialect: Some(dialect),
            skipped_rows,
        });
    }

    let detection = IngestError::FormatDetection {
        path: path.to_path_buf(),
        tried,
    };
    warn!(error = %detection, "trying permissive fallback parse");
    let text = TextEncoding::decode_lossy(&bytes);
    let (table, skipped_rows) = parse_delimited(&text, Delimiter::COMMA, options.header_rows)
        .ok_or_else(|| IngestError::FileUnreadable {
            path: path.to_path_buf(),
            reason: detection.to_string(),
        })?;
    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        skipped_rows,
        "loaded with permissive fallback"
    );
    Ok(LoadedTable {
        table,
        dialect: None,
        skipped_rows,
    })
}
