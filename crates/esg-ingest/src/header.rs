//! Header line reconstruction.
//!
//! Column names follow the vendor tooling conventions so downstream steps can
//! recognise export artifacts: repeated labels get `.1`, `.2`, … suffixes and
//! blank header cells get an `Unnamed: <index>` placeholder.

use std::collections::HashMap;

use esg_model::RawHeader;

/// Normalizes a header value: trims whitespace and any stray byte-order mark.
pub fn normalize_header(value: &str) -> String {
    value.trim().trim_matches('\u{feff}').to_string()
}

/// Suffixes repeated labels (`X`, `X.1`, `X.2`, …) so every name is unique.
///
/// A generated name that collides with a later literal label keeps counting.
pub fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());
    for label in labels {
        let name = match seen.get(&label).copied() {
            Some(last) => {
                let mut suffix = last + 1;
                let mut candidate = format!("{label}.{suffix}");
                while seen.contains_key(&candidate) {
                    suffix += 1;
                    candidate = format!("{label}.{suffix}");
                }
                seen.insert(label, suffix);
                candidate
            }
            None => label,
        };
        seen.entry(name.clone()).or_insert(0);
        out.push(name);
    }
    out
}

fn fill_blank(
    values: &[String],
    width: usize,
    placeholder: impl Fn(usize) -> String,
) -> Vec<String> {
    (0..width)
        .map(|idx| {
            let value = values
                .get(idx)
                .map(String::as_str)
                .map(normalize_header)
                .unwrap_or_default();
            if value.is_empty() {
                placeholder(idx)
            } else {
                value
            }
        })
        .collect()
}

/// Builds a single-line header from the first line of a file.
pub fn single_header(line: &[String]) -> RawHeader {
    let labels = fill_blank(line, line.len(), |idx| format!("Unnamed: {idx}"));
    RawHeader::single(dedupe_labels(labels))
}

/// Builds a two-line header: category labels over indicator codes.
pub fn double_header(labels: &[String], codes: &[String]) -> RawHeader {
    let width = labels.len().max(codes.len());
    let labels = fill_blank(labels, width, |idx| format!("Unnamed: {idx}_level_0"));
    let codes = fill_blank(codes, width, |idx| format!("Unnamed: {idx}_level_1"));
    RawHeader::double(dedupe_labels(labels), codes)
}

/// Builds a header from the leading `header_rows` lines (1 or 2).
pub fn build_header(lines: &[Vec<String>], header_rows: usize) -> RawHeader {
    let empty = Vec::new();
    let first = lines.first().unwrap_or(&empty);
    if header_rows >= 2 {
        let second = lines.get(1).unwrap_or(&empty);
        double_header(first, second)
    } else {
        single_header(first)
    }
}
