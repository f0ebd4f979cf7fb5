//! Text cleanup and size guards applied before serialization.

use std::borrow::Cow;

use tracing::warn;

use esg_model::{CellValue, Table};

/// Row ceiling of a worksheet (header row included).
pub const SPREADSHEET_ROW_LIMIT: usize = 1_048_576;

/// Longest string a worksheet cell holds, in characters.
pub const CELL_TEXT_LIMIT: usize = 32_767;

/// Control characters spreadsheets cannot store: everything below 0x20 except
/// tab, line feed and carriage return.
pub fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}')
}

/// Removes forbidden control characters; borrows when there is nothing to strip.
pub fn strip_control_chars(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_forbidden_control) {
        Cow::Owned(text.chars().filter(|&c| !is_forbidden_control(c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

/// Strips control characters from every text cell and column name.
///
/// Returns the cleaned table and the number of cells that changed.
pub fn sanitize_table(table: Table) -> (Table, usize) {
    let mut changed = 0usize;
    let table = table
        .rename_columns(|_, name| strip_control_chars(name).into_owned())
        .map_cells(|_, cell| match cell {
            CellValue::Text(text) => match strip_control_chars(&text) {
                Cow::Borrowed(_) => CellValue::Text(text),
                Cow::Owned(clean) => {
                    changed += 1;
                    CellValue::Text(clean)
                }
            },
            other => other,
        });
    (table, changed)
}

/// Keeps at most `max_rows` data rows, warning when rows are cut.
///
/// Returns the table and whether it was truncated.
pub fn enforce_row_limit(table: Table, max_rows: usize) -> (Table, bool) {
    let rows = table.height();
    if rows <= max_rows {
        return (table, false);
    }
    warn!(
        rows,
        limit = max_rows,
        dropped = rows - max_rows,
        "table exceeds the spreadsheet row limit, truncating"
    );
    (table.truncate(max_rows), true)
}

/// Cuts text to the cell limit on a character boundary.
pub fn clip_cell_text(text: &str) -> &str {
    match text.char_indices().nth(CELL_TEXT_LIMIT) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}
