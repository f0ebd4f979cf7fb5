//! Table serialization and atomic file replacement.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::{debug, info, info_span};

use esg_model::{CellValue, Table};

use crate::error::{OutputError, Result};
use crate::sanitize::{SPREADSHEET_ROW_LIMIT, clip_cell_text, enforce_row_limit, sanitize_table};

/// Column ceiling of a worksheet.
pub const SPREADSHEET_COLUMN_LIMIT: usize = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(OutputError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// Data rows written at most. A worksheet counts the header row against its ceiling.
    pub fn max_data_rows(self) -> usize {
        match self {
            Self::Xlsx => SPREADSHEET_ROW_LIMIT - 1,
            Self::Csv => SPREADSHEET_ROW_LIMIT,
        }
    }
}

/// What a write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// Rows were cut to fit the row limit.
    pub truncated: bool,
    /// Text cells that had control characters removed.
    pub sanitized_cells: usize,
    pub bytes: usize,
}

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `bytes` to a sibling temp file, then renames it over `path`.
///
/// The target is either left untouched or fully replaced.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let temp_path = temp_path_for(path);
    let io_error = |operation: &'static str| {
        let temp_path = temp_path.clone();
        move |source: std::io::Error| OutputError::Io {
            operation,
            path: temp_path,
            source,
        }
    };

    let written = File::create(&temp_path)
        .map_err(io_error("create"))
        .and_then(|mut file| {
            file.write_all(bytes).map_err(io_error("write"))?;
            file.sync_all().map_err(io_error("sync"))
        });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(OutputError::Write {
            temp_path,
            target_path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn build_xlsx(table: &Table) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string(0, col as u16, clip_cell_text(name))?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let sheet_row = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Number(value) => {
                    sheet.write_number(sheet_row, col, *value)?;
                }
                CellValue::Text(text) => {
                    sheet.write_string(sheet_row, col, clip_cell_text(text))?;
                }
                CellValue::Nc => {
                    sheet.write_string(sheet_row, col, esg_model::NC_TOKEN)?;
                }
                CellValue::Missing => {}
            }
        }
    }
    workbook.save_to_buffer()
}

/// Serializes a table as a single-sheet workbook.
pub fn xlsx_bytes(table: &Table, path: &Path) -> Result<Vec<u8>> {
    if table.width() > SPREADSHEET_COLUMN_LIMIT {
        return Err(OutputError::TooManyColumns {
            path: path.to_path_buf(),
            columns: table.width(),
            max: SPREADSHEET_COLUMN_LIMIT,
        });
    }
    build_xlsx(table).map_err(|source| OutputError::Xlsx {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes a table as comma-separated UTF-8 text.
pub fn csv_bytes(table: &Table, path: &Path) -> Result<Vec<u8>> {
    let csv_error = |source| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns()).map_err(csv_error)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(CellValue::display_text))
            .map_err(csv_error)?;
    }
    writer.into_inner().map_err(|e| OutputError::Io {
        operation: "buffer",
        path: path.to_path_buf(),
        source: e.into_error(),
    })
}

/// Sanitizes, row-limits and writes a table; the format follows the extension.
///
/// # Errors
///
/// Any [`OutputError`]; the target file is not left half-written.
pub fn write_table(table: Table, path: &Path) -> Result<WriteReport> {
    let _span = info_span!("write", path = %path.display()).entered();
    let format = OutputFormat::from_path(path)?;
    let (table, sanitized_cells) = sanitize_table(table);
    if sanitized_cells > 0 {
        debug!(sanitized_cells, "removed control characters");
    }
    let (table, truncated) = enforce_row_limit(table, format.max_data_rows());

    let bytes = match format {
        OutputFormat::Xlsx => xlsx_bytes(&table, path)?,
        OutputFormat::Csv => csv_bytes(&table, path)?,
    };
    write_atomic(path, &bytes)?;

    info!(
        rows = table.height(),
        columns = table.width(),
        bytes = bytes.len(),
        "output written"
    );
    Ok(WriteReport {
        path: path.to_path_buf(),
        rows: table.height(),
        columns: table.width(),
        truncated,
        sanitized_cells,
        bytes: bytes.len(),
    })
}
