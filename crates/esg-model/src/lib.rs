//! Data model for ESG survey exports.
//!
//! - **cell**: the `CellValue` tagged union (number, text, missing, NC)
//! - **table**: single-header rectangular `Table` and `ColumnRef`
//! - **raw**: `RawTable` / `RawHeader` as produced by the loaders
//! - **numeric**: number parsing and display shared across crates

pub mod cell;
pub mod error;
pub mod numeric;
pub mod raw;
pub mod table;

pub use cell::{CellValue, NC_TOKEN, NO_INFORMATION_TOKEN};
pub use error::{ModelError, Result};
pub use numeric::{format_numeric, parse_number};
pub use raw::{RawHeader, RawTable};
pub use table::{ColumnRef, Table};
