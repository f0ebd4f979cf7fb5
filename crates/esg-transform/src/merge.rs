//! Cross-year merge keyed by company identifier.
//!
//! Tables are passed most recent first. Every non-key column is suffixed with
//! its year, rows are joined on the trimmed identifier text, and a company
//! absent from a year gets NC in all of that year's columns.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use esg_model::{CellValue, Table};

use crate::error::{Result, TransformError};

/// One year's table.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyTable {
    pub year: String,
    pub table: Table,
}

impl YearlyTable {
    pub fn new(year: impl Into<String>, table: Table) -> Self {
        Self {
            year: year.into(),
            table,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    /// Every identifier of every table.
    #[default]
    Outer,
    /// Only identifiers of the first (most recent) table.
    Anchored,
}

/// A resolved column: the newest non-NC value of `base` across the years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalColumn {
    pub output: String,
    /// Column name before year suffixing.
    pub base: String,
    /// Optional companion column recording the year the value came from.
    pub source_year_column: Option<String>,
}

impl FinalColumn {
    pub fn new(output: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            base: base.into(),
            source_year_column: None,
        }
    }

    #[must_use]
    pub fn with_source_year(mut self, column: impl Into<String>) -> Self {
        self.source_year_column = Some(column.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub key: String,
    pub mode: JoinMode,
    pub finals: Vec<FinalColumn>,
}

impl MergePlan {
    pub fn outer(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            mode: JoinMode::Outer,
            finals: Vec::new(),
        }
    }

    pub fn anchored(key: impl Into<String>) -> Self {
        Self {
            mode: JoinMode::Anchored,
            ..Self::outer(key)
        }
    }

    #[must_use]
    pub fn with_final(mut self, column: FinalColumn) -> Self {
        self.finals.push(column);
        self
    }
}

/// The merged table and what the merge had to discard.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub table: Table,
    /// Rows dropped because their identifier repeated an earlier row of the same table.
    pub duplicate_rows: usize,
    /// Rows dropped because their identifier was blank or NC.
    pub unidentified_rows: usize,
    /// Final columns not computed because a year lacked the base column.
    pub skipped_finals: Vec<String>,
}

/// Name of `column` once tagged with `year`.
pub fn year_column(column: &str, year: &str) -> String {
    format!("{column}_{year}")
}

/// Join text of an identifier cell, or `None` when it cannot identify a company.
pub fn identifier(cell: &CellValue) -> Option<String> {
    if cell.is_nc_token() {
        return None;
    }
    let text = cell.display_text();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Identifier index of one table: first row per identifier, in table order.
struct KeyIndex {
    key_column: usize,
    order: Vec<String>,
    rows: HashMap<String, usize>,
}

fn index_table(yearly: &YearlyTable, key: &str) -> Result<(KeyIndex, usize, usize)> {
    let key_column = yearly
        .table
        .column_index(key)
        .ok_or_else(|| TransformError::MissingKey {
            key: key.to_string(),
            year: yearly.year.clone(),
        })?;
    let mut index = KeyIndex {
        key_column,
        order: Vec::new(),
        rows: HashMap::new(),
    };
    let mut duplicates = 0usize;
    let mut unidentified = 0usize;
    for (row_idx, row) in yearly.table.rows().iter().enumerate() {
        let Some(id) = identifier(&row[key_column]) else {
            unidentified += 1;
            continue;
        };
        if index.rows.contains_key(&id) {
            duplicates += 1;
            warn!(
                year = %yearly.year,
                identifier = %id,
                "duplicate identifier, keeping the first row"
            );
            continue;
        }
        index.rows.insert(id.clone(), row_idx);
        index.order.push(id);
    }
    Ok((index, duplicates, unidentified))
}

/// Merges yearly tables on `plan.key`.
///
/// # Errors
///
/// `MissingKey` when a table has no column named `plan.key`.
pub fn merge(tables: &[YearlyTable], plan: &MergePlan) -> Result<MergeOutcome> {
    let mut indexes = Vec::with_capacity(tables.len());
    let mut duplicate_rows = 0usize;
    let mut unidentified_rows = 0usize;
    for yearly in tables {
        let (index, duplicates, unidentified) = index_table(yearly, &plan.key)?;
        duplicate_rows += duplicates;
        unidentified_rows += unidentified;
        indexes.push(index);
    }

    let mut identifiers: Vec<&String> = Vec::new();
    let mut seen: HashSet<&String> = HashSet::new();
    let contributing = match plan.mode {
        JoinMode::Outer => indexes.len(),
        JoinMode::Anchored => indexes.len().min(1),
    };
    for index in &indexes[..contributing] {
        for id in &index.order {
            if seen.insert(id) {
                identifiers.push(id);
            }
        }
    }

    let mut columns = vec![plan.key.clone()];
    for (yearly, index) in tables.iter().zip(&indexes) {
        columns.extend(
            yearly
                .table
                .columns()
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != index.key_column)
                .map(|(_, name)| year_column(name, &yearly.year)),
        );
    }

    let mut rows = Vec::with_capacity(identifiers.len());
    for id in &identifiers {
        let mut row = Vec::with_capacity(columns.len());
        let key_cell = tables
            .iter()
            .zip(&indexes)
            .find_map(|(yearly, index)| {
                index
                    .rows
                    .get(*id)
                    .and_then(|&r| yearly.table.cell(r, index.key_column))
            })
            .cloned()
            .unwrap_or_else(|| CellValue::text(id.as_str()));
        row.push(key_cell);
        for (yearly, index) in tables.iter().zip(&indexes) {
            let width = yearly.table.width();
            match index.rows.get(*id) {
                Some(&r) => row.extend(
                    yearly.table.rows()[r]
                        .iter()
                        .enumerate()
                        .filter(|(idx, _)| *idx != index.key_column)
                        .map(|(_, cell)| {
                            if cell.is_missing() {
                                CellValue::Nc
                            } else {
                                cell.clone()
                            }
                        }),
                ),
                None => row.extend(std::iter::repeat_n(CellValue::Nc, width - 1)),
            }
        }
        rows.push(row);
    }

    let mut table = Table::from_rows(columns, rows)?;
    // Source-year columns go after all final values.
    let mut skipped_finals = Vec::new();
    let mut year_columns = Vec::new();
    for column in &plan.finals {
        match final_values(&table, tables, column) {
            Ok((values, years)) => {
                table = table.with_column(&column.output, values)?;
                if let Some(name) = &column.source_year_column {
                    year_columns.push((name, years));
                }
                debug!(output = %column.output, "resolved final column");
            }
            Err(err) => {
                warn!(output = %column.output, error = %err, "final column skipped");
                skipped_finals.push(column.output.clone());
            }
        }
    }
    for (name, years) in year_columns {
        table = table.with_column(name, years)?;
    }

    info!(
        tables = tables.len(),
        rows = table.height(),
        columns = table.width(),
        duplicate_rows,
        unidentified_rows,
        "merged yearly tables"
    );
    Ok(MergeOutcome {
        table,
        duplicate_rows,
        unidentified_rows,
        skipped_finals,
    })
}

/// Year precedence: the first non-NC value in table order, and its year.
///
/// Text spelling the NC token counts as NC.
pub fn resolve_precedence<'a>(values: &[(&'a str, &CellValue)]) -> (CellValue, Option<&'a str>) {
    values
        .iter()
        .find(|(_, value)| !value.is_nc_token())
        .map_or((CellValue::Nc, None), |(year, value)| {
            ((*value).clone(), Some(*year))
        })
}

/// Resolved values and source years of one final column.
fn final_values(
    table: &Table,
    tables: &[YearlyTable],
    column: &FinalColumn,
) -> Result<(Vec<CellValue>, Vec<CellValue>)> {
    let mut sources = Vec::with_capacity(tables.len());
    for yearly in tables {
        let name = year_column(&column.base, &yearly.year);
        let idx = table
            .column_index(&name)
            .ok_or_else(|| TransformError::schema_mismatch(name, column.output.as_str()))?;
        sources.push((yearly.year.as_str(), idx));
    }

    let mut values = Vec::with_capacity(table.height());
    let mut years = Vec::with_capacity(table.height());
    for row in table.rows() {
        let candidates: Vec<(&str, &CellValue)> =
            sources.iter().map(|&(year, idx)| (year, &row[idx])).collect();
        let (value, year) = resolve_precedence(&candidates);
        values.push(value);
        years.push(year.map_or(CellValue::Nc, CellValue::text));
    }
    Ok((values, years))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yearly(year: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> YearlyTable {
        YearlyTable::new(
            year,
            Table::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap(),
        )
    }

    fn t(value: &str) -> CellValue {
        CellValue::text(value)
    }

    #[test]
    fn test_identifier_rules() {
        assert_eq!(identifier(&t(" FR01 ")), Some("FR01".to_string()));
        assert_eq!(identifier(&CellValue::Number(12.0)), Some("12".to_string()));
        assert_eq!(identifier(&CellValue::Nc), None);
        assert_eq!(identifier(&t("NC")), None);
        assert_eq!(identifier(&CellValue::Missing), None);
    }

    #[test]
    fn test_outer_merge_orders_primary_first() {
        let recent = yearly("2025", &["ISIN", "Note"], vec![vec![t("B"), t("b5")], vec![t("A"), t("a5")]]);
        let older = yearly("2024", &["ISIN", "Note"], vec![vec![t("C"), t("c4")], vec![t("A"), t("a4")]]);
        let outcome = merge(&[recent, older], &MergePlan::outer("ISIN")).unwrap();
        let table = outcome.table;
        assert_eq!(table.columns(), ["ISIN", "Note_2025", "Note_2024"]);
        let ids: Vec<String> = table.column_values(0).map(CellValue::display_text).collect();
        assert_eq!(ids, ["B", "A", "C"]);
        assert_eq!(table.rows()[0], vec![t("B"), t("b5"), CellValue::Nc]);
        assert_eq!(table.rows()[2], vec![t("C"), CellValue::Nc, t("c4")]);
    }

    #[test]
    fn test_anchored_merge_keeps_primary_identifiers() {
        let recent = yearly("2024", &["ISIN", "Q410"], vec![vec![t("A"), CellValue::Number(10.0)]]);
        let older = yearly("2023", &["ISIN", "Q410"], vec![vec![t("Z"), CellValue::Number(5.0)]]);
        let outcome = merge(&[recent, older], &MergePlan::anchored("ISIN")).unwrap();
        assert_eq!(outcome.table.height(), 1);
        assert_eq!(
            outcome.table.rows()[0],
            vec![t("A"), CellValue::Number(10.0), CellValue::Nc]
        );
    }

    #[test]
    fn test_duplicates_and_unidentified_rows_are_dropped() {
        let recent = yearly(
            "2025",
            &["ISIN", "Note"],
            vec![
                vec![t("A"), t("first")],
                vec![t("A"), t("second")],
                vec![CellValue::Missing, t("orphan")],
                vec![t("NC"), t("orphan")],
            ],
        );
        let outcome = merge(&[recent], &MergePlan::outer("ISIN")).unwrap();
        assert_eq!(outcome.duplicate_rows, 1);
        assert_eq!(outcome.unidentified_rows, 2);
        assert_eq!(outcome.table.rows(), [vec![t("A"), t("first")]]);
    }

    #[test]
    fn test_missing_cells_become_nc() {
        let recent = yearly("2025", &["ISIN", "Note"], vec![vec![t("A"), CellValue::Missing]]);
        let outcome = merge(&[recent], &MergePlan::outer("ISIN")).unwrap();
        assert_eq!(outcome.table.cell(0, 1), Some(&CellValue::Nc));
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let recent = yearly("2025", &["Code", "Note"], vec![]);
        let err = merge(&[recent], &MergePlan::outer("ISIN")).unwrap_err();
        assert!(matches!(err, TransformError::MissingKey { ref year, .. } if year == "2025"));
    }

    #[test]
    fn test_final_column_follows_year_precedence() {
        let recent = yearly(
            "2025",
            &["ISIN", "Note"],
            vec![vec![t("A"), t("B+")], vec![t("B"), t("NC")]],
        );
        let older = yearly(
            "2024",
            &["ISIN", "Note"],
            vec![vec![t("A"), t("C")], vec![t("B"), t("C-")], vec![t("C"), CellValue::Nc]],
        );
        let plan = MergePlan::outer("ISIN")
            .with_final(FinalColumn::new("Note_final", "Note").with_source_year("Campagne_final"));
        let table = merge(&[recent, older], &plan).unwrap().table;

        let finals: Vec<String> = table.column_values(3).map(CellValue::display_text).collect();
        let years: Vec<String> = table.column_values(4).map(CellValue::display_text).collect();
        assert_eq!(finals, ["B+", "C-", "NC"]);
        assert_eq!(years, ["2025", "2024", "NC"]);
    }

    #[test]
    fn test_final_column_skipped_when_base_missing() {
        let recent = yearly("2025", &["ISIN", "Note"], vec![vec![t("A"), t("B")]]);
        let older = yearly("2024", &["ISIN", "Autre"], vec![vec![t("A"), t("C")]]);
        let plan = MergePlan::outer("ISIN").with_final(FinalColumn::new("Note_final", "Note"));
        let outcome = merge(&[recent, older], &plan).unwrap();
        assert_eq!(outcome.skipped_finals, vec!["Note_final"]);
        assert_eq!(outcome.table.width(), 3);
    }
}
