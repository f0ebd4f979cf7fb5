use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::error::{ModelError, Result};

/// A column identified by its flattened name and its position in column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub index: usize,
    pub name: String,
}

/// A rectangular table with a single header row.
///
/// Every row holds exactly one cell per column; the constructors enforce it.
/// Transform stages take a table by value and hand back a new one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let expected = columns.len();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(ModelError::RowWidth {
                    row: idx,
                    expected,
                    actual: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column with exactly this name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column_ref(&self, index: usize) -> Option<ColumnRef> {
        self.columns.get(index).map(|name| ColumnRef {
            index,
            name: name.clone(),
        })
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(column))
    }

    /// Keeps the listed columns, in the order given.
    pub fn select(self, indices: &[usize]) -> Self {
        let columns = indices
            .iter()
            .filter_map(|&idx| self.columns.get(idx).cloned())
            .collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                indices
                    .iter()
                    .filter_map(|&idx| row.get(idx).cloned())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn retain_rows(mut self, mut keep: impl FnMut(&[CellValue]) -> bool) -> Self {
        self.rows.retain(|row| keep(row));
        self
    }

    /// Removes the data row at `index`; out-of-range indices leave the table unchanged.
    pub fn drop_row(mut self, index: usize) -> Self {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
        self
    }

    pub fn truncate(mut self, max_rows: usize) -> Self {
        self.rows.truncate(max_rows);
        self
    }

    pub fn map_column(
        mut self,
        column: usize,
        mut f: impl FnMut(CellValue) -> CellValue,
    ) -> Self {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(column) {
                let value = std::mem::replace(cell, CellValue::Missing);
                *cell = f(value);
            }
        }
        self
    }

    /// Applies `f` to every cell, passing the column position along.
    pub fn map_cells(mut self, mut f: impl FnMut(usize, CellValue) -> CellValue) -> Self {
        for row in &mut self.rows {
            for (idx, cell) in row.iter_mut().enumerate() {
                let value = std::mem::replace(cell, CellValue::Missing);
                *cell = f(idx, value);
            }
        }
        self
    }

    pub fn rename_columns(mut self, mut f: impl FnMut(usize, &str) -> String) -> Self {
        self.columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| f(idx, name))
            .collect();
        self
    }

    /// Appends a column, or replaces the values of an existing column with the same name.
    pub fn with_column(mut self, name: &str, values: Vec<CellValue>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(ModelError::ColumnLength {
                name: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(self)
    }
}
