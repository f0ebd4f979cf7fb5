//! Integration tests for delimited-text sniffing and loading.

use std::io::Write;

use esg_ingest::{
    COMMA_FIRST_DELIMITERS, Delimiter, IngestError, LoadOptions, TextEncoding, load_delimited,
    load_table, read_with_dialect, sniff_dialect,
};
use esg_model::CellValue;
use tempfile::NamedTempFile;

fn temp_file(bytes: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn sniffs_semicolon_utf8() {
    let file = temp_file("ISIN;Nom Société;Pays\nFR01;Acmé;France\n".as_bytes(), ".csv");
    let dialect = sniff_dialect(file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(dialect.encoding, TextEncoding::Utf8);
    assert_eq!(dialect.delimiter, Delimiter::SEMICOLON);
}

#[test]
fn sniffs_comma_when_semicolon_gives_one_column() {
    let file = temp_file(b"ISIN,Nom,Pays\nFR01,Acme,France\n", ".csv");
    let dialect = sniff_dialect(file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(dialect.delimiter, Delimiter::COMMA);
}

#[test]
fn sniffs_tab() {
    let file = temp_file(b"ISIN\tNom\nFR01\tAcme\n", ".tsv");
    let dialect = sniff_dialect(file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(dialect.delimiter, Delimiter::TAB);
}

#[test]
fn falls_back_to_latin1_for_invalid_utf8() {
    let file = temp_file(b"ISIN;Soci\xE9t\xE9\nFR01;Acm\xE9\n", ".csv");
    let loaded = load_delimited(file.path(), &LoadOptions::default()).unwrap();
    let dialect = loaded.dialect.unwrap();
    assert_eq!(dialect.encoding, TextEncoding::Latin1);
    assert_eq!(loaded.table.header.labels, vec!["ISIN", "Société"]);
    assert_eq!(loaded.table.rows[0][1], CellValue::text("Acmé"));
}

#[test]
fn comma_first_order_prefers_comma() {
    // Both separators give two columns; the preference order decides.
    let file = temp_file(b"A,B;C\n1,2;3\n", ".csv");
    let options = LoadOptions::default().with_delimiters(&COMMA_FIRST_DELIMITERS);
    let dialect = sniff_dialect(file.path(), &options).unwrap();
    assert_eq!(dialect.delimiter, Delimiter::COMMA);

    let dialect = sniff_dialect(file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(dialect.delimiter, Delimiter::SEMICOLON);
}

#[test]
fn resniffing_with_detected_dialect_is_idempotent() {
    let file = temp_file(
        "Identité;Identité;Social\nISIN;Nom;Q35\nUnités;;%\nFR01;Acmé;12.5\nFR02;Beta;NC\n"
            .as_bytes(),
        ".csv",
    );
    let options = LoadOptions::two_line_header();
    let first = load_delimited(file.path(), &options).unwrap();
    let dialect = sniff_dialect(file.path(), &options).unwrap();
    assert_eq!(first.dialect, Some(dialect));

    let second = read_with_dialect(file.path(), dialect, options.header_rows).unwrap();
    assert_eq!(first.table, second.table);
    assert_eq!(second.table.header.labels, vec!["Identité", "Identité.1", "Social"]);
}

#[test]
fn skips_malformed_rows_on_full_load() {
    let mut content = String::from("A;B\n");
    for i in 0..6 {
        content.push_str(&format!("{i};x\n"));
    }
    content.push_str("bad;row;extra\n");
    content.push_str("7;y\n");
    let file = temp_file(content.as_bytes(), ".csv");

    let loaded = load_delimited(file.path(), &LoadOptions::default()).unwrap();
    assert_eq!(loaded.skipped_rows, 1);
    assert_eq!(loaded.table.height(), 7);
}

#[test]
fn single_column_file_uses_permissive_fallback() {
    let file = temp_file(b"ISIN\nFR01\nFR02\n", ".csv");
    let loaded = load_delimited(file.path(), &LoadOptions::default()).unwrap();
    assert!(loaded.dialect.is_none());
    assert_eq!(loaded.table.width(), 1);
    assert_eq!(loaded.table.height(), 2);
}

#[test]
fn empty_file_is_unreadable() {
    let file = temp_file(b"", ".csv");
    let result = load_delimited(file.path(), &LoadOptions::default());
    assert!(matches!(result, Err(IngestError::FileUnreadable { .. })));
}

#[test]
fn missing_file_is_reported() {
    let result = load_table(
        std::path::Path::new("/nonexistent/raw.csv"),
        &LoadOptions::default(),
    );
    assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
}
