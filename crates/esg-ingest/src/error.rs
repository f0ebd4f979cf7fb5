//! Error types for ESG data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an input file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File has no content at all.
    #[error("input file is empty: {path}")]
    EmptyInput { path: PathBuf },

    // === Delimited Text Errors ===
    /// No (encoding, delimiter) candidate produced a multi-column table.
    ///
    /// Recoverable: the loader falls back to a permissive parse.
    #[error("could not detect encoding and delimiter of {path} ({tried} combinations tried)")]
    FormatDetection { path: PathBuf, tried: usize },

    /// Neither the candidate dialects nor the permissive fallback could parse the file.
    #[error("file is unreadable: {path}: {reason}")]
    FileUnreadable { path: PathBuf, reason: String },

    // === Spreadsheet Errors ===
    /// calamine failed to open or read the workbook.
    #[error("failed to read spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// Workbook has no worksheet.
    #[error("spreadsheet has no worksheet: {path}")]
    NoWorksheet { path: PathBuf },

    /// Extension is neither a delimited-text nor a spreadsheet format.
    #[error("unsupported input extension '{extension}' for {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

impl IngestError {
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}
