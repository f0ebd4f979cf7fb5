//! Integration tests for workbook loading.

use esg_ingest::{LoadOptions, load_table, read_spreadsheet};
use esg_model::CellValue;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("raw.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Identité").unwrap();
    sheet.write_string(0, 1, "Identité.1").unwrap();
    sheet.write_string(0, 2, "Social").unwrap();
    sheet.write_string(1, 1, "Nom").unwrap();
    sheet.write_string(1, 2, "Q35").unwrap();
    sheet.write_string(2, 0, "Valeur").unwrap();
    sheet.write_string(3, 0, "FR01").unwrap();
    sheet.write_string(3, 1, "Acme").unwrap();
    sheet.write_number(3, 2, 12.5).unwrap();
    sheet.write_string(4, 0, "FR02").unwrap();
    sheet.write_string(4, 2, "NC").unwrap();
    workbook.save(&path).unwrap();
    path
}

#[test]
fn reads_two_line_header() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let table = read_spreadsheet(&path, 2).unwrap();

    assert_eq!(table.header.labels, vec!["Identité", "Identité.1", "Social"]);
    assert_eq!(
        table.header.codes.as_ref().unwrap(),
        &vec!["Unnamed: 0_level_1", "Nom", "Q35"]
    );
    assert_eq!(table.height(), 3);
    assert_eq!(table.rows[1][2], CellValue::Number(12.5));
    assert_eq!(table.rows[2][1], CellValue::Missing);
    assert_eq!(table.rows[2][2], CellValue::text("NC"));
}

#[test]
fn load_table_dispatches_on_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let loaded = load_table(&path, &LoadOptions::default()).unwrap();

    assert!(loaded.dialect.is_none());
    assert_eq!(loaded.table.header.lines(), 1);
    assert_eq!(loaded.table.height(), 4);
}
