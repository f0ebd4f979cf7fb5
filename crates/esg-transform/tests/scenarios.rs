//! End-to-end transform scenarios on small hand-built tables.

use esg_model::{CellValue, RawHeader, RawTable, Table};
use esg_transform::{
    BooleanVocabulary, CoerceOptions, Derivation, DerivedKind, FinalColumn, MergePlan,
    YearlyTable, derive, encode_boolean, merge, preprocess,
};

fn t(value: &str) -> CellValue {
    CellValue::text(value)
}

fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
    Table::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows).unwrap()
}

#[test]
fn outer_merge_keeps_companies_from_every_year() {
    let year_one = table(
        &["ISIN", "Note", "Secteur"],
        vec![vec![t("A1"), t("B"), t("Banque")], vec![t("A2"), t("C"), t("Energie")]],
    );
    let year_two = table(
        &["ISIN", "Note", "Pays"],
        vec![vec![t("A2"), t("B+"), t("France")], vec![t("A3"), t("A"), t("Italie")]],
    );
    let outcome = merge(
        &[YearlyTable::new("2025", year_two), YearlyTable::new("2024", year_one)],
        &MergePlan::outer("ISIN"),
    )
    .unwrap();
    let merged = outcome.table;

    assert_eq!(
        merged.columns(),
        ["ISIN", "Note_2025", "Pays_2025", "Note_2024", "Secteur_2024"]
    );
    let ids: Vec<String> = merged.column_values(0).map(CellValue::display_text).collect();
    assert_eq!(ids, ["A2", "A3", "A1"]);

    let row = |id: &str| {
        merged
            .rows()
            .iter()
            .find(|row| row[0] == t(id))
            .cloned()
            .unwrap()
    };
    assert_eq!(row("A1")[1..3], [CellValue::Nc, CellValue::Nc]);
    assert_eq!(row("A3")[3..5], [CellValue::Nc, CellValue::Nc]);
    assert_eq!(row("A2"), vec![t("A2"), t("B+"), t("France"), t("C"), t("Energie")]);
}

#[test]
fn ratings_style_merge_resolves_finals() {
    let ratings_2025 = table(
        &["ISIN", "Note Générale préliminaire", "Note SOCIAL - RESSOURCES HUMAINES"],
        vec![vec![t("FR1"), t("NC"), t("B")], vec![t("FR2"), t("A"), CellValue::Missing]],
    );
    let ratings_2024 = table(
        &["ISIN", "Note Générale préliminaire", "Note SOCIAL - RESSOURCES HUMAINES"],
        vec![vec![t("FR1"), t("C"), t("C")], vec![t("FR3"), t("D"), t("D")]],
    );
    let plan = MergePlan::outer("ISIN")
        .with_final(
            FinalColumn::new("Note Générale préliminaire_final", "Note Générale préliminaire")
                .with_source_year("Campagne_final"),
        )
        .with_final(FinalColumn::new(
            "Note SOCIAL_final",
            "Note SOCIAL - RESSOURCES HUMAINES",
        ));
    let merged = merge(
        &[
            YearlyTable::new("2025", ratings_2025),
            YearlyTable::new("2024", ratings_2024),
        ],
        &plan,
    )
    .unwrap()
    .table;

    let column = |name: &str| -> Vec<String> {
        let idx = merged.column_index(name).unwrap();
        merged.column_values(idx).map(CellValue::display_text).collect()
    };
    assert_eq!(column("ISIN"), ["FR1", "FR2", "FR3"]);
    assert_eq!(column("Note Générale préliminaire_final"), ["C", "A", "D"]);
    assert_eq!(column("Campagne_final"), ["2024", "2025", "2024"]);
    assert_eq!(column("Note SOCIAL_final"), ["B", "NC", "D"]);
}

#[test]
fn yes_no_answers_are_coded() {
    let answers = ["OUI", "Oui", "oui", "NON", "Non", "non", "Partiel"];
    let rows = answers.iter().map(|a| vec![t(a)]).collect();
    let coded = encode_boolean(
        table(&["Gouvernance_Q45"], rows),
        "q45",
        &BooleanVocabulary::default(),
    )
    .unwrap();
    let values: Vec<CellValue> = coded.column_values(0).cloned().collect();
    let one = CellValue::Number(1.0);
    let zero = CellValue::Number(0.0);
    assert_eq!(
        values,
        vec![
            one.clone(),
            one.clone(),
            one,
            zero.clone(),
            zero.clone(),
            zero,
            t("Partiel")
        ]
    );
}

fn raw_export() -> RawTable {
    let mut labels: Vec<String> = ["ISIN", "Nom Société", "Campagne", "Secteur"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut codes: Vec<String> = (0..4).map(|idx| format!("Unnamed: {idx}_level_1")).collect();
    for (label, code) in [
        ("Promotions managers", "Q35"),
        ("Promotions femmes managers", "Q36"),
        ("Promotions femmes managers.1", "Q36"),
        ("Politique diversité", "Q45"),
    ] {
        labels.push(label.to_string());
        codes.push(code.to_string());
    }
    let rows = vec![
        vec![
            t("Unité"),
            CellValue::Missing,
            CellValue::Missing,
            CellValue::Missing,
            t("nb"),
            t("nb"),
            t("nb"),
            CellValue::Missing,
        ],
        vec![
            t("FR01"),
            t("Acme S.A."),
            t("2024"),
            t("Industrie"),
            t("40"),
            t("10"),
            t("10"),
            t("OUI"),
        ],
        vec![
            t("FR02"),
            t("Beta"),
            t("2024"),
            t("Banque"),
            t("0"),
            t("5"),
            t("5"),
            t("Pas d'information"),
        ],
        vec![
            t("FR03"),
            t("Gamma"),
            CellValue::Missing,
            t("Banque"),
            t("1"),
            t("1"),
            t("1"),
            t("NON"),
        ],
    ];
    RawTable::new(RawHeader::double(labels, codes), rows)
}

#[test]
fn preprocess_flattens_and_types_raw_export() {
    let options = CoerceOptions {
        boundary: 4,
        ..CoerceOptions::default()
    };
    let preprocessed = preprocess(raw_export(), &options).unwrap();
    let table = preprocessed.table;

    insta::assert_debug_snapshot!(table.columns(), @r#"
    [
        "ISIN",
        "Nom Société",
        "Campagne",
        "Secteur",
        "Promotions managers_Q35",
        "Promotions femmes managers_Q36",
        "Politique diversité_Q45",
    ]
    "#);
    assert_eq!(preprocessed.dropped_columns, vec!["Promotions femmes managers.1"]);
    assert_eq!(table.height(), 2);
    assert_eq!(
        table.rows()[0],
        vec![
            t("FR01"),
            t("Acme S,A,"),
            CellValue::Number(2024.0),
            t("Industrie"),
            CellValue::Number(40.0),
            CellValue::Number(10.0),
            t("OUI"),
        ]
    );
    assert_eq!(table.cell(1, 6), Some(&CellValue::Nc));

    let table = derive(
        table,
        &Derivation::new(
            "Ratio de mixité dans les promotions de managers",
            "Q36",
            "Q35",
            DerivedKind::Ratio,
        ),
    )
    .unwrap();
    let table = encode_boolean(table, "Q45", &BooleanVocabulary::default()).unwrap();

    assert_eq!(table.cell(0, 7), Some(&CellValue::Number(0.25)));
    assert_eq!(table.cell(1, 7), Some(&CellValue::Nc));
    assert_eq!(table.cell(0, 6), Some(&CellValue::Number(1.0)));
    assert_eq!(table.cell(1, 6), Some(&CellValue::Nc));
}
