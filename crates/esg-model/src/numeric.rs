//! Numeric parsing and formatting shared by loaders, transforms and writers.

/// Parses a string as a finite f64, returning None for invalid or empty strings.
///
/// Surrounding whitespace is ignored. `inf` and `NaN` spellings are rejected so
/// that a parsed cell is always usable in arithmetic.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats a floating-point number without a trailing fractional zero.
///
/// Integral values print as integers (`10.0` -> `10`), everything else uses the
/// shortest representation that round-trips.
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    format!("{v}")
}
