//! Output writing for ESG tables.
//!
//! Every write strips control characters spreadsheets cannot store, cuts the
//! table to the worksheet row ceiling (with a warning, never an error) and
//! replaces the target file atomically.

pub mod error;
pub mod sanitize;
pub mod writer;

pub use error::{OutputError, Result};
pub use sanitize::{
    CELL_TEXT_LIMIT, SPREADSHEET_ROW_LIMIT, clip_cell_text, enforce_row_limit,
    is_forbidden_control, sanitize_table, strip_control_chars,
};
pub use writer::{
    OutputFormat, SPREADSHEET_COLUMN_LIMIT, WriteReport, csv_bytes, ensure_parent_dir,
    write_atomic, write_table, xlsx_bytes,
};
