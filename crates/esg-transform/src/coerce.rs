//! Positional column typing.
//!
//! Columns before [`INDICATOR_BOUNDARY`] are descriptive (identity, sector,
//! country, ...); columns from the boundary on are indicator answers. Each
//! block has its own policy.

use tracing::debug;

use esg_model::{
    CellValue, NC_TOKEN, NO_INFORMATION_TOKEN, Table, format_numeric, parse_number,
};

use crate::error::{Result, TransformError};

/// Index of the first indicator column in the raw-data exports.
pub const INDICATOR_BOUNDARY: usize = 13;

/// Treatment of the descriptive block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DescriptivePolicy {
    /// Numeric coercion, then `.` to `,` in the cells that stay text.
    #[default]
    Coerce,
    /// Leave descriptive cells as loaded.
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoerceOptions {
    pub boundary: usize,
    pub descriptive: DescriptivePolicy,
}

impl Default for CoerceOptions {
    fn default() -> Self {
        Self {
            boundary: INDICATOR_BOUNDARY,
            descriptive: DescriptivePolicy::Coerce,
        }
    }
}

impl CoerceOptions {
    #[must_use]
    pub fn preserve_descriptive() -> Self {
        Self {
            descriptive: DescriptivePolicy::Preserve,
            ..Self::default()
        }
    }
}

/// Checks that the table has an indicator block at all.
///
/// # Errors
///
/// `Layout` when the table has no column at or beyond `boundary`.
pub fn validate_layout(table: &Table, boundary: usize) -> Result<()> {
    if table.width() <= boundary {
        return Err(TransformError::Layout(format!(
            "{} column(s) found, indicator columns are expected from position {} on; \
             the export format may have changed",
            table.width(),
            boundary + 1
        )));
    }
    Ok(())
}

/// Indicator-block rule: NC tokens, blanks and "no information" become NC,
/// numeric text becomes a number, other text is kept.
pub fn coerce_indicator(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Missing => CellValue::Nc,
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case(NC_TOKEN)
                || trimmed.is_empty()
                || trimmed == NO_INFORMATION_TOKEN
            {
                CellValue::Nc
            } else if let Some(value) = parse_number(trimmed) {
                CellValue::Number(value)
            } else {
                CellValue::Text(text)
            }
        }
        other => other,
    }
}

/// Whether every cell of a column reads as a number; blanks do not count against it.
pub fn is_numeric_column(table: &Table, column: usize) -> bool {
    table.column_values(column).all(|cell| match cell {
        CellValue::Text(text) => parse_number(text).is_some(),
        CellValue::Number(_) | CellValue::Missing => true,
        CellValue::Nc => false,
    })
}

/// Descriptive-block rule, decided per column: a fully numeric column becomes
/// numbers, any other column stays text with French decimal commas.
pub fn coerce_descriptive(cell: CellValue, numeric_column: bool) -> CellValue {
    match cell {
        CellValue::Text(text) if numeric_column => {
            parse_number(&text).map_or(CellValue::Text(text), CellValue::Number)
        }
        CellValue::Text(text) => CellValue::Text(text.replace('.', ",")),
        CellValue::Number(value) if !numeric_column => {
            CellValue::Text(format_numeric(value).replace('.', ","))
        }
        other => other,
    }
}

/// Turns every fully numeric column into numbers and leaves the rest as loaded.
pub fn infer_numeric_columns(table: Table) -> Table {
    let numeric: Vec<bool> = (0..table.width())
        .map(|idx| is_numeric_column(&table, idx))
        .collect();
    table.map_cells(|idx, cell| match cell {
        CellValue::Text(text) if numeric[idx] => {
            parse_number(&text).map_or(CellValue::Text(text), CellValue::Number)
        }
        other => other,
    })
}

/// Applies both block policies.
///
/// After this pass no indicator cell is `Missing`.
///
/// # Errors
///
/// `Layout` from [`validate_layout`].
pub fn coerce(table: Table, options: &CoerceOptions) -> Result<Table> {
    validate_layout(&table, options.boundary)?;
    let boundary = options.boundary;
    let descriptive = options.descriptive;
    let numeric: Vec<bool> = (0..boundary)
        .map(|idx| is_numeric_column(&table, idx))
        .collect();
    let mut nc_cells = 0usize;
    let table = table.map_cells(|idx, cell| {
        if idx >= boundary {
            let coerced = coerce_indicator(cell);
            if coerced.is_nc() {
                nc_cells += 1;
            }
            coerced
        } else {
            match descriptive {
                DescriptivePolicy::Coerce => coerce_descriptive(cell, numeric[idx]),
                DescriptivePolicy::Preserve => cell,
            }
        }
    });
    debug!(
        columns = table.width(),
        rows = table.height(),
        nc_cells,
        "coerced columns"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_table(cells: Vec<CellValue>) -> Table {
        let columns = (0..cells.len()).map(|idx| format!("C{idx}")).collect();
        Table::from_rows(columns, vec![cells]).unwrap()
    }

    #[test]
    fn test_indicator_rules() {
        assert_eq!(coerce_indicator(CellValue::Missing), CellValue::Nc);
        assert_eq!(coerce_indicator(CellValue::text(" nc ")), CellValue::Nc);
        assert_eq!(coerce_indicator(CellValue::text("Nc")), CellValue::Nc);
        assert_eq!(
            coerce_indicator(CellValue::text("Pas d'information")),
            CellValue::Nc
        );
        assert_eq!(coerce_indicator(CellValue::text("42.5")), CellValue::Number(42.5));
        assert_eq!(coerce_indicator(CellValue::text("Oui")), CellValue::text("Oui"));
        assert_eq!(coerce_indicator(CellValue::Number(3.0)), CellValue::Number(3.0));
    }

    #[test]
    fn test_descriptive_rules() {
        assert_eq!(
            coerce_descriptive(CellValue::text("2024"), true),
            CellValue::Number(2024.0)
        );
        assert_eq!(
            coerce_descriptive(CellValue::text("S.A. Acme"), false),
            CellValue::text("S,A, Acme")
        );
        assert_eq!(
            coerce_descriptive(CellValue::Number(1.5), true),
            CellValue::Number(1.5)
        );
        assert_eq!(
            coerce_descriptive(CellValue::Number(1.5), false),
            CellValue::text("1,5")
        );
        assert_eq!(coerce_descriptive(CellValue::Missing, false), CellValue::Missing);
    }

    #[test]
    fn test_mixed_descriptive_column_stays_text() {
        let table = Table::from_rows(
            vec!["Code NACE".to_string(), "Effectif".to_string(), "Q1".to_string()],
            vec![
                vec![CellValue::text("64.19"), CellValue::text("12.5"), CellValue::Missing],
                vec![CellValue::text("K"), CellValue::Missing, CellValue::Missing],
            ],
        )
        .unwrap();
        let options = CoerceOptions {
            boundary: 2,
            descriptive: DescriptivePolicy::Coerce,
        };
        let table = coerce(table, &options).unwrap();
        let column = |idx| table.column_values(idx).cloned().collect::<Vec<_>>();
        assert_eq!(column(0), vec![CellValue::text("64,19"), CellValue::text("K")]);
        assert_eq!(column(1), vec![CellValue::Number(12.5), CellValue::Missing]);
    }

    #[test]
    fn test_infer_numeric_columns() {
        let table = Table::from_rows(
            vec!["Campagne".to_string(), "ISIN".to_string()],
            vec![
                vec![CellValue::text("2024"), CellValue::text("FR01")],
                vec![CellValue::Missing, CellValue::text("2")],
            ],
        )
        .unwrap();
        let table = infer_numeric_columns(table);
        assert_eq!(
            table.rows()[0],
            vec![CellValue::Number(2024.0), CellValue::text("FR01")]
        );
        assert_eq!(table.rows()[1], vec![CellValue::Missing, CellValue::text("2")]);
    }

    #[test]
    fn test_coerce_splits_at_boundary() {
        let table = wide_table(vec![
            CellValue::text("Acme Inc."),
            CellValue::Missing,
            CellValue::text("NC"),
        ]);
        let options = CoerceOptions {
            boundary: 1,
            descriptive: DescriptivePolicy::Coerce,
        };
        let table = coerce(table, &options).unwrap();
        assert_eq!(
            table.rows()[0],
            vec![CellValue::text("Acme Inc,"), CellValue::Nc, CellValue::Nc]
        );
    }

    #[test]
    fn test_preserve_leaves_descriptive_text() {
        let table = wide_table(vec![CellValue::text("1.5"), CellValue::Missing]);
        let options = CoerceOptions {
            boundary: 1,
            descriptive: DescriptivePolicy::Preserve,
        };
        let table = coerce(table, &options).unwrap();
        assert_eq!(table.rows()[0], vec![CellValue::text("1.5"), CellValue::Nc]);
    }

    #[test]
    fn test_narrow_table_fails_fast() {
        let table = wide_table(vec![CellValue::Missing; INDICATOR_BOUNDARY]);
        let err = coerce(table, &CoerceOptions::default()).unwrap_err();
        assert!(matches!(err, TransformError::Layout(_)));
        assert!(err.to_string().contains("13 column(s)"));
    }
}
