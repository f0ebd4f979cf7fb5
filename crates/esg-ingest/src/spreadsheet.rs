//! Spreadsheet loading (first worksheet) through calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::info;

use esg_model::{CellValue, RawTable, format_numeric};

use crate::error::{IngestError, Result};
use crate::header::build_header;

/// File extensions read as workbooks.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::String(s) => CellValue::from_text(s),
        Data::Bool(b) => CellValue::text(if *b { "True" } else { "False" }),
        other => CellValue::from_text(&other.to_string()),
    }
}

fn header_text(data: &Data) -> String {
    match data {
        Data::Empty | Data::Error(_) => String::new(),
        Data::Float(v) => format_numeric(*v),
        other => other.to_string(),
    }
}

/// Reads the first worksheet; the top `header_rows` rows (1 or 2) form the header.
pub fn read_spreadsheet(path: &Path, header_rows: usize) -> Result<RawTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let spreadsheet_error = |message: String| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    // The range starts at the first used cell; keep leading blank columns positional.
    let col_offset = range.start().map_or(0, |(_, col)| col as usize);
    let width = col_offset + range.width();

    let mut rows = range.rows();
    let mut header_lines = Vec::with_capacity(header_rows);
    for _ in 0..header_rows {
        let Some(row) = rows.next() else { break };
        let mut line = vec![String::new(); col_offset];
        line.extend(row.iter().map(header_text));
        header_lines.push(line);
    }
    if header_lines.is_empty() {
        return Err(IngestError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    let header = build_header(&header_lines, header_rows);
    let width = width.max(header.len());

    let data: Vec<Vec<CellValue>> = rows
        .map(|row| {
            let mut cells = vec![CellValue::Missing; col_offset];
            cells.extend(row.iter().map(cell_value));
            cells.resize(width, CellValue::Missing);
            cells
        })
        .collect();

    info!(
        path = %path.display(),
        rows = data.len(),
        columns = header.len(),
        "loaded spreadsheet"
    );
    Ok(RawTable::new(header, data))
}
