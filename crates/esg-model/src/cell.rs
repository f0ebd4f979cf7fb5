use std::fmt;

use serde::{Deserialize, Serialize};

use crate::numeric::{format_numeric, parse_number};

/// Token used by the vendor exports (and our outputs) for "non communiqué".
pub const NC_TOKEN: &str = "NC";

/// Free-text answer the vendor uses for an unanswered indicator.
pub const NO_INFORMATION_TOKEN: &str = "Pas d'information";

/// A single table cell.
///
/// `Nc` and `Missing` are distinct: a missing cell is absent from the source,
/// an NC cell is an explicit "not communicated" answer. Neither is ever
/// silently turned into zero or blank by a transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
    Nc,
}

impl CellValue {
    /// Builds a cell from raw source text. Blank text is `Missing`.
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(raw.to_string())
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_nc(&self) -> bool {
        matches!(self, Self::Nc)
    }

    /// True for `Nc` and for text spelling the NC token (as loaded, before coercion).
    pub fn is_nc_token(&self) -> bool {
        match self {
            Self::Nc => true,
            Self::Text(s) => s.trim().eq_ignore_ascii_case(NC_TOKEN),
            Self::Number(_) | Self::Missing => false,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// True for `Missing` and for text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Nc => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric reading of the cell: numbers as-is, text through [`parse_number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => parse_number(s),
            Self::Missing | Self::Nc => None,
        }
    }

    /// Text used when the cell is compared as a join key or written to text output.
    pub fn display_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => f.write_str(&format_numeric(*v)),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
            Self::Nc => f.write_str(NC_TOKEN),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}
