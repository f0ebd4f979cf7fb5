//! Derived indicators.
//!
//! Every operation takes two cells and returns a cell. NC, missing and
//! unparsable inputs give NC, as does a zero divisor or a result that is not
//! a finite number. Nothing here fails on cell content.

use tracing::{debug, info};

use esg_model::{CellValue, Table};

use crate::error::Result;
use crate::locate::require;

/// Numeric reading of both operands, or `None` if either is unusable.
fn operands(a: &CellValue, b: &CellValue) -> Option<(f64, f64)> {
    Some((a.as_number()?, b.as_number()?))
}

fn finite(value: f64) -> CellValue {
    if value.is_finite() {
        CellValue::Number(value)
    } else {
        CellValue::Nc
    }
}

/// `a / b`.
pub fn ratio(a: &CellValue, b: &CellValue) -> CellValue {
    match operands(a, b) {
        Some((_, d)) if d == 0.0 => CellValue::Nc,
        Some((n, d)) => finite(n / d),
        None => CellValue::Nc,
    }
}

/// `a * b`.
pub fn product(a: &CellValue, b: &CellValue) -> CellValue {
    operands(a, b).map_or(CellValue::Nc, |(x, y)| finite(x * y))
}

/// `a * b / scale`, e.g. a headcount times a percentage share over 100.
pub fn scaled_product(a: &CellValue, b: &CellValue, scale: f64) -> CellValue {
    match operands(a, b) {
        _ if scale == 0.0 => CellValue::Nc,
        Some((x, y)) => finite(x * y / scale),
        None => CellValue::Nc,
    }
}

/// `a / b - 1`: relative change from `b` to `a`.
pub fn growth(a: &CellValue, b: &CellValue) -> CellValue {
    match operands(a, b) {
        Some((_, base)) if base == 0.0 => CellValue::Nc,
        Some((current, base)) => finite(current / base - 1.0),
        None => CellValue::Nc,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DerivedKind {
    Ratio,
    Product,
    ScaledProduct(f64),
    Growth,
}

impl DerivedKind {
    pub fn apply(self, a: &CellValue, b: &CellValue) -> CellValue {
        match self {
            Self::Ratio => ratio(a, b),
            Self::Product => product(a, b),
            Self::ScaledProduct(scale) => scaled_product(a, b, scale),
            Self::Growth => growth(a, b),
        }
    }
}

/// A named column computed from two located columns of the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub name: String,
    /// Locator term of the left operand (numerator, multiplicand, current value).
    pub left: String,
    /// Locator term of the right operand (divisor, multiplier, base value).
    pub right: String,
    pub kind: DerivedKind,
}

impl Derivation {
    pub fn new(
        name: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
        kind: DerivedKind,
    ) -> Self {
        Self {
            name: name.into(),
            left: left.into(),
            right: right.into(),
            kind,
        }
    }
}

/// Computes `derivation` row by row into a column named `derivation.name`.
///
/// The column is appended, or overwritten in place if it already exists.
///
/// # Errors
///
/// `SchemaMismatch` when an operand column cannot be located. The table is
/// consumed either way; call [`check_operands`] first to skip the step instead.
pub fn derive(table: Table, derivation: &Derivation) -> Result<Table> {
    let left = require(&table, &derivation.left, &derivation.name)?;
    let right = require(&table, &derivation.right, &derivation.name)?;
    info!(
        name = %derivation.name,
        left = %left.name,
        right = %right.name,
        "deriving indicator"
    );
    let values: Vec<CellValue> = table
        .rows()
        .iter()
        .map(|row| derivation.kind.apply(&row[left.index], &row[right.index]))
        .collect();
    let nc = values.iter().filter(|v| v.is_nc()).count();
    debug!(name = %derivation.name, rows = values.len(), nc, "derived values");
    Ok(table.with_column(&derivation.name, values)?)
}

/// Checks that both operands of a derivation can be located.
pub fn check_operands(table: &Table, derivation: &Derivation) -> Result<()> {
    require(table, &derivation.left, &derivation.name)?;
    require(table, &derivation.right, &derivation.name)?;
    Ok(())
}

/// Yes/no tokens recognised by [`encode_boolean`], compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanVocabulary {
    pub affirmative: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for BooleanVocabulary {
    fn default() -> Self {
        Self {
            affirmative: vec!["oui".to_string()],
            negative: vec!["non".to_string()],
        }
    }
}

impl BooleanVocabulary {
    /// 1 for an affirmative token, 0 for a negative one, `None` otherwise.
    pub fn code(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        let matches = |tokens: &[String]| tokens.iter().any(|t| t.eq_ignore_ascii_case(text));
        if matches(&self.affirmative) {
            Some(1.0)
        } else if matches(&self.negative) {
            Some(0.0)
        } else {
            None
        }
    }
}

/// Replaces yes/no answers in the located column with 1/0; other cells are untouched.
///
/// # Errors
///
/// `SchemaMismatch` when no column matches `code`.
pub fn encode_boolean(table: Table, code: &str, vocabulary: &BooleanVocabulary) -> Result<Table> {
    let column = require(&table, code, "yes/no coding")?;
    info!(column = %column.name, "coding yes/no answers as 1/0");
    Ok(table.map_column(column.index, |cell| {
        let coded = cell.as_text().and_then(|text| vocabulary.code(text));
        coded.map_or(cell, CellValue::Number)
    }))
}
