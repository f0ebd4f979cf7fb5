//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing an output file. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum OutputError {
    // === File System Errors ===
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished temp file could not be moved over the target; it is removed.
    #[error("failed to replace {target_path} with {temp_path}; the temporary file was removed")]
    Write {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    #[error("failed to build spreadsheet {path}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("failed to build CSV {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{columns} columns do not fit in a worksheet (maximum {max}): {path}")]
    TooManyColumns {
        path: PathBuf,
        columns: usize,
        max: usize,
    },

    #[error("unsupported output extension '{extension}' for {path}")]
    UnsupportedExtension { path: PathBuf, extension: String },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
