//! Numeric column summaries.

use polars::prelude::{NamedFrom, Series};

use esg_model::Table;

use crate::error::{Result, TransformError};

/// count/mean/min/max over the numeric cells of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Summarizes the `Number` cells of `column`; NC, text and missing cells are ignored.
///
/// # Errors
///
/// `UnknownColumn` when the table has no such column.
pub fn numeric_summary(table: &Table, column: &str) -> Result<NumericSummary> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| TransformError::UnknownColumn(column.to_string()))?;
    let values: Vec<f64> = table
        .column_values(idx)
        .filter_map(|cell| match cell {
            esg_model::CellValue::Number(v) => Some(*v),
            _ => None,
        })
        .collect();
    let series = Series::new(column.into(), values);
    Ok(NumericSummary {
        count: series.len(),
        mean: series.mean(),
        min: series.min::<f64>()?,
        max: series.max::<f64>()?,
    })
}
