//! Two-line header flattening.
//!
//! The raw-data exports carry a category label over each indicator code, repeat
//! some questions across report sections (`Label.1`, `Label.2`) and start with
//! a units row. Flattening removes those artifacts and leaves one header line.

use tracing::{debug, warn};

use esg_model::{RawTable, Table};

use crate::error::{Result, TransformError};

/// Label suffixes marking a repeated column.
pub const DUPLICATE_SUFFIXES: [&str; 2] = [".1", ".2"];

/// Label fragment of the reporting-cycle column.
pub const CAMPAIGN_MARKER: &str = "Campagne";

/// Fragment of the placeholder given to blank header cells.
pub const UNNAMED_MARKER: &str = "Unnamed";

/// What the reporting-cycle filter did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignFilter {
    Applied { column: String, dropped_rows: usize },
    MarkerMissing,
}

/// A flattened table plus a record of what was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub table: Table,
    /// Top-line labels of the duplicate columns that were dropped.
    pub dropped_columns: Vec<String>,
    pub campaign: CampaignFilter,
}

pub fn is_duplicate_label(label: &str) -> bool {
    DUPLICATE_SUFFIXES
        .iter()
        .any(|suffix| label.ends_with(suffix))
}

/// Single-line name for a (label, code) header pair.
pub fn flatten_name(label: &str, code: &str) -> String {
    if code.contains(UNNAMED_MARKER) {
        label.to_string()
    } else {
        format!("{label}_{code}")
    }
}

/// Flattens a table loaded with a two-line header.
///
/// # Errors
///
/// `Layout` when the table was loaded with a single header line.
pub fn flatten(raw: RawTable) -> Result<Flattened> {
    let RawTable { header, rows } = raw;
    let Some(codes) = header.codes else {
        return Err(TransformError::Layout(
            "flattening needs a two-line header (category label over indicator code)".to_string(),
        ));
    };

    let mut keep = Vec::with_capacity(header.labels.len());
    let mut dropped_columns = Vec::new();
    for (idx, label) in header.labels.iter().enumerate() {
        if is_duplicate_label(label) {
            dropped_columns.push(label.clone());
        } else {
            keep.push(idx);
        }
    }
    debug!(dropped = dropped_columns.len(), "dropped duplicate columns");

    let labels: Vec<&str> = keep.iter().map(|&idx| header.labels[idx].as_str()).collect();
    let names: Vec<String> = keep
        .iter()
        .zip(&labels)
        .map(|(&idx, label)| flatten_name(label, codes.get(idx).map_or("", String::as_str)))
        .collect();
    let campaign_column = labels
        .iter()
        .position(|label| label.contains(CAMPAIGN_MARKER));

    let table = Table::from_rows(header.labels, rows)?
        .select(&keep)
        .drop_row(0)
        .rename_columns(|idx, _| names_at(&names, idx));

    let (table, campaign) = match campaign_column {
        Some(column) => {
            let before = table.height();
            let table = table.retain_rows(|row| !row[column].is_blank());
            let dropped_rows = before - table.height();
            let name = table.columns()[column].clone();
            debug!(column = %name, dropped_rows, "filtered rows without a reporting cycle");
            (
                table,
                CampaignFilter::Applied {
                    column: name,
                    dropped_rows,
                },
            )
        }
        None => {
            warn!(
                marker = CAMPAIGN_MARKER,
                "no reporting-cycle column found, rows are kept unfiltered"
            );
            (table, CampaignFilter::MarkerMissing)
        }
    };

    Ok(Flattened {
        table,
        dropped_columns,
        campaign,
    })
}

fn names_at(names: &[String], idx: usize) -> String {
    names.get(idx).cloned().unwrap_or_default()
}
