//! ESG export ingestion utilities.
//!
//! This crate turns vendor exports into [`RawTable`] values.
//!
//! # Features
//!
//! - **Sniffing**: discover a working (encoding, delimiter) pair from a short preview
//! - **Delimited text**: permissive full load that skips malformed rows, with a
//!   default-dialect fallback when no candidate works
//! - **Spreadsheets**: first worksheet of `.xlsx`/`.xls`/`.ods` workbooks
//! - **Headers**: one- or two-line headers, with repeated labels suffixed `.1`, `.2`, …
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use esg_ingest::{LoadOptions, load_table};
//!
//! // Category line + indicator-code line
//! let loaded = load_table(Path::new("raw-2024.xlsx"), &LoadOptions::two_line_header())?;
//! println!("{} rows", loaded.table.height());
//! ```

use std::path::Path;

use esg_model::RawTable;

mod delimited;
mod dialect;
mod error;
mod header;
mod spreadsheet;

// === Error Types ===
pub use error::{IngestError, Result};

// === Dialects ===
pub use dialect::{
    COMMA_FIRST_DELIMITERS, DEFAULT_DELIMITERS, DEFAULT_ENCODINGS, Delimiter, Dialect,
    TextEncoding, dialect_candidates, first_success,
};

// === Loading ===
pub use delimited::{
    LoadOptions, LoadedTable, PREVIEW_ROWS, load_delimited, read_with_dialect, sniff_dialect,
};
pub use header::{build_header, dedupe_labels, double_header, normalize_header, single_header};
pub use spreadsheet::{SPREADSHEET_EXTENSIONS, read_spreadsheet};

/// Input container formats, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Delimited,
    Spreadsheet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "csv" | "txt" | "tsv" => Ok(Self::Delimited),
            ext if SPREADSHEET_EXTENSIONS.contains(&ext) => Ok(Self::Spreadsheet),
            _ => Err(IngestError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Loads any supported input file.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<LoadedTable> {
    match InputFormat::from_path(path)? {
        InputFormat::Delimited => load_delimited(path, options),
        InputFormat::Spreadsheet => {
            let table: RawTable = read_spreadsheet(path, options.header_rows)?;
            Ok(LoadedTable {
                table,
                dialect: None,
                skipped_rows: 0,
            })
        }
    }
}
