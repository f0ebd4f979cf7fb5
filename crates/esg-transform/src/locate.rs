//! Column lookup by case-insensitive substring.
//!
//! Flattened names look like `Effectif total en fin d'exercice_Q410`, so an
//! indicator code is found by containment rather than equality. The first
//! match in column order wins.

use esg_model::{ColumnRef, Table};

use crate::error::{Result, TransformError};

/// First column whose name contains every term, ignoring case.
pub fn locate_all(table: &Table, terms: &[&str]) -> Option<ColumnRef> {
    let terms: Vec<String> = terms.iter().map(|term| term.to_lowercase()).collect();
    table
        .columns()
        .iter()
        .position(|name| {
            let name = name.to_lowercase();
            terms.iter().all(|term| name.contains(term.as_str()))
        })
        .and_then(|index| table.column_ref(index))
}

/// First column whose name contains `code`, ignoring case.
pub fn locate(table: &Table, code: &str) -> Option<ColumnRef> {
    locate_all(table, &[code])
}

/// Tries each term set in turn and returns the first hit.
pub fn locate_first_of(table: &Table, alternatives: &[&[&str]]) -> Option<ColumnRef> {
    alternatives
        .iter()
        .find_map(|terms| locate_all(table, terms))
}

/// Like [`locate`], but absence is a [`TransformError::SchemaMismatch`].
pub fn require(table: &Table, code: &str, context: &str) -> Result<ColumnRef> {
    locate(table, code).ok_or_else(|| TransformError::schema_mismatch(code, context))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str]) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_locate_is_case_insensitive() {
        let table = table(&["ISIN", "Effectif total_Q410", "Part_q608"]);
        assert_eq!(locate(&table, "q410").map(|c| c.index), Some(1));
        assert_eq!(locate(&table, "Q608").map(|c| c.name), Some("Part_q608".to_string()));
        assert!(locate(&table, "Q999").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let table = table(&["Note_Q41", "Note_Q410"]);
        assert_eq!(locate(&table, "Q41").map(|c| c.index), Some(0));
    }

    #[test]
    fn test_locate_all_requires_every_term() {
        let table = table(&["Nom du groupe", "Identité_Nom Société", "Pays"]);
        let found = locate_all(&table, &["nom", "société"]).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn test_alternatives_fall_back_in_order() {
        let table = table(&["ISIN", "Nom", "Pays"]);
        let found = locate_first_of(&table, &[&["nom", "société"], &["nom société"], &["nom"]]);
        assert_eq!(found.map(|c| c.index), Some(1));
    }

    #[test]
    fn test_require_reports_context() {
        let table = table(&["ISIN"]);
        let err = require(&table, "Q36", "managers ratio").unwrap_err();
        assert!(err.is_recoverable());
    }
}
