//! The three batch pipelines.

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use esg_ingest::{COMMA_FIRST_DELIMITERS, LoadOptions};
use esg_model::{CellValue, ColumnRef, Table};
use esg_transform::{
    BooleanVocabulary, CoerceOptions, Derivation, DerivedKind, FinalColumn, MergePlan,
    YearlyTable, derive, infer_numeric_columns, locate, locate_first_of, merge,
    numeric_summary, year_column,
};

use crate::config::{JobFranceConfig, RatingsConfig, UniverseConfig};
use crate::pipeline::{
    derive_optional, encode_optional, load_stage, preprocess_stage, write_stage,
};
use crate::types::RunSummary;

// ============================================================================
// Universe
// ============================================================================

pub const MANAGER_MIX_RATIO: &str = "Ratio de mixité dans les promotions de managers";
pub const NET_HEADCOUNT_CHANGE: &str = "Evolution nette de l'effectif";

/// Indicators answered OUI/NON in the raw-data export.
pub const YES_NO_INDICATORS: [&str; 2] = ["Q45", "Q302"];

pub fn universe_derivations() -> [Derivation; 2] {
    [
        Derivation::new(MANAGER_MIX_RATIO, "Q36", "Q35", DerivedKind::Ratio),
        Derivation::new(NET_HEADCOUNT_CHANGE, "Q124", "Q410", DerivedKind::Ratio),
    ]
}

/// CSV to workbook conversion, then flatten, coerce, derive and write.
pub fn run_universe(config: &UniverseConfig) -> Result<RunSummary> {
    let _span = info_span!("universe").entered();
    let mut summary = RunSummary::new("universe");

    let loaded = load_stage("raw CSV", &config.raw_csv, &LoadOptions::default(), &mut summary)?;
    let table = infer_numeric_columns(loaded.table.into_table()?);
    write_stage(table, &config.raw_xlsx, &mut summary)?;

    let loaded = load_stage(
        "raw workbook",
        &config.raw_xlsx,
        &LoadOptions::two_line_header(),
        &mut summary,
    )?;
    let mut table = preprocess_stage(
        "raw workbook",
        loaded,
        &CoerceOptions::default(),
        &mut summary,
    )?;

    for derivation in &universe_derivations() {
        table = derive_optional(table, derivation, &mut summary)?;
    }
    let vocabulary = BooleanVocabulary::default();
    for code in YES_NO_INDICATORS {
        table = encode_optional(table, code, &vocabulary, &mut summary)?;
    }

    write_stage(table, &config.output, &mut summary)?;
    Ok(summary)
}

// ============================================================================
// Job in France
// ============================================================================

pub const SHARE_IN_HOME_COUNTRY: &str =
    "Part de l'effectif total situé dans le pays du siège social_Q608";
pub const TOTAL_HEADCOUNT: &str = "Effectif total en fin d'exercice_Q410";
pub const COMPANY_NAME: &str = "Nom Société";
pub const COUNTRY: &str = "Pays";
pub const JOBS_IN_FRANCE: &str = "Emplois en France";
pub const JOBS_EVOLUTION: &str = "Evolution d'emploi en France";

const ISIN: &str = "ISIN";
const PREVIOUS_YEAR: &str = "2023";
const CURRENT_YEAR: &str = "2024";

/// Headcount times the share located in France, over 100.
fn jobs_in_france(year: &str) -> Derivation {
    Derivation::new(
        year_column(JOBS_IN_FRANCE, year),
        year_column(TOTAL_HEADCOUNT, year),
        year_column(SHARE_IN_HOME_COUNTRY, year),
        DerivedKind::ScaledProduct(100.0),
    )
}

/// Output columns, in order.
pub fn job_france_columns() -> Vec<String> {
    vec![
        ISIN.to_string(),
        COMPANY_NAME.to_string(),
        COUNTRY.to_string(),
        year_column(SHARE_IN_HOME_COUNTRY, PREVIOUS_YEAR),
        year_column(TOTAL_HEADCOUNT, PREVIOUS_YEAR),
        year_column(SHARE_IN_HOME_COUNTRY, CURRENT_YEAR),
        year_column(TOTAL_HEADCOUNT, CURRENT_YEAR),
        year_column(JOBS_IN_FRANCE, PREVIOUS_YEAR),
        year_column(JOBS_IN_FRANCE, CURRENT_YEAR),
        JOBS_EVOLUTION.to_string(),
    ]
}

/// Builds a table from located columns; an absent column is filled with NC.
fn project(table: &Table, columns: &[(Option<&ColumnRef>, &str)]) -> Result<Table> {
    let names = columns.iter().map(|(_, name)| (*name).to_string()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|(column, _)| column.map_or(CellValue::Nc, |c| row[c.index].clone()))
                .collect()
        })
        .collect();
    Ok(Table::from_rows(names, rows)?)
}

struct YearColumns {
    isin: Option<ColumnRef>,
    share: Option<ColumnRef>,
    headcount: Option<ColumnRef>,
}

impl YearColumns {
    fn find(table: &Table, year: &str) -> Self {
        let columns = Self {
            isin: locate(table, "isin"),
            share: locate(table, "q608"),
            headcount: locate(table, "q410"),
        };
        for (what, found) in [
            (ISIN, &columns.isin),
            ("Q608", &columns.share),
            ("Q410", &columns.headcount),
        ] {
            match found {
                Some(column) => info!(year, what, column = %column.name, "column located"),
                None => warn!(year, what, "column not found"),
            }
        }
        columns
    }

    fn missing(&self, year: &str) -> Vec<String> {
        [
            (ISIN, &self.isin),
            ("Q608", &self.share),
            ("Q410", &self.headcount),
        ]
        .into_iter()
        .filter(|(_, found)| found.is_none())
        .map(|(what, _)| format!("{what} {year}"))
        .collect()
    }
}

/// Employment in France per company for two years and its evolution.
pub fn run_job_france(config: &JobFranceConfig) -> Result<RunSummary> {
    let _span = info_span!("job_france").entered();
    let mut summary = RunSummary::new("job-france");
    let load_options = LoadOptions::two_line_header();
    let coerce_options = CoerceOptions::preserve_descriptive();

    let loaded = load_stage(PREVIOUS_YEAR, &config.previous, &load_options, &mut summary)?;
    let previous = preprocess_stage(PREVIOUS_YEAR, loaded, &coerce_options, &mut summary)?;
    let loaded = load_stage(CURRENT_YEAR, &config.current, &load_options, &mut summary)?;
    let current = preprocess_stage(CURRENT_YEAR, loaded, &coerce_options, &mut summary)?;

    let previous_columns = YearColumns::find(&previous, PREVIOUS_YEAR);
    let current_columns = YearColumns::find(&current, CURRENT_YEAR);
    let company = locate_first_of(&current, &[&["nom", "société"], &["nom société"], &["nom"]]);
    let country = locate(&current, "pays");
    for (what, found) in [(COMPANY_NAME, &company), (COUNTRY, &country)] {
        if found.is_none() {
            warn!(what, "column not found, filled with NC");
            summary
                .warnings
                .push(format!("{what} column not found, filled with NC"));
        }
    }

    let mut missing = previous_columns.missing(PREVIOUS_YEAR);
    missing.extend(current_columns.missing(CURRENT_YEAR));
    if !missing.is_empty() {
        bail!("missing required columns: {}", missing.join(", "));
    }

    let current = project(
        &current,
        &[
            (current_columns.isin.as_ref(), ISIN),
            (company.as_ref(), COMPANY_NAME),
            (country.as_ref(), COUNTRY),
            (current_columns.share.as_ref(), SHARE_IN_HOME_COUNTRY),
            (current_columns.headcount.as_ref(), TOTAL_HEADCOUNT),
        ],
    )?;
    let previous = project(
        &previous,
        &[
            (previous_columns.isin.as_ref(), ISIN),
            (previous_columns.share.as_ref(), SHARE_IN_HOME_COUNTRY),
            (previous_columns.headcount.as_ref(), TOTAL_HEADCOUNT),
        ],
    )?;

    let merged = {
        let _span = info_span!("merge").entered();
        merge(
            &[
                YearlyTable::new(CURRENT_YEAR, current),
                YearlyTable::new(PREVIOUS_YEAR, previous),
            ],
            &MergePlan::anchored(ISIN),
        )
        .context("merge yearly tables")?
    };
    if merged.duplicate_rows > 0 {
        summary.warnings.push(format!(
            "{} duplicate identifier row(s) dropped",
            merged.duplicate_rows
        ));
    }
    info!(companies = merged.table.height(), "result table created");

    let company_column = year_column(COMPANY_NAME, CURRENT_YEAR);
    let country_column = year_column(COUNTRY, CURRENT_YEAR);
    let mut table = merged.table.rename_columns(|_, name| {
        if name == company_column {
            COMPANY_NAME.to_string()
        } else if name == country_column {
            COUNTRY.to_string()
        } else {
            name.to_string()
        }
    });

    {
        let _span = info_span!("derive").entered();
        for year in [PREVIOUS_YEAR, CURRENT_YEAR] {
            table = derive(table, &jobs_in_france(year))?;
        }
        table = derive(
            table,
            &Derivation::new(
                JOBS_EVOLUTION,
                year_column(JOBS_IN_FRANCE, CURRENT_YEAR),
                year_column(JOBS_IN_FRANCE, PREVIOUS_YEAR),
                DerivedKind::Growth,
            ),
        )?;
    }

    let order: Vec<usize> = job_france_columns()
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .with_context(|| format!("output column '{name}' was not built"))
        })
        .collect::<Result<_>>()?;
    let table = table.select(&order);

    let evolution = numeric_summary(&table, JOBS_EVOLUTION)?;
    info!(
        valid = evolution.count,
        mean = evolution.mean,
        min = evolution.min,
        max = evolution.max,
        "evolution statistics"
    );
    summary.evolution = Some(evolution);

    write_stage(table, &config.output, &mut summary)?;
    Ok(summary)
}

// ============================================================================
// Ratings
// ============================================================================

pub const GENERAL_NOTE: &str = "Note Générale préliminaire";
pub const GENERAL_NOTE_FINAL: &str = "Note Générale préliminaire_final";
pub const SOCIAL_NOTE: &str = "Note SOCIAL - RESSOURCES HUMAINES";
pub const SOCIAL_NOTE_FINAL: &str = "Note SOCIAL_final";
pub const CAMPAIGN_FINAL: &str = "Campagne_final";

/// Index of the data row dropped from both ratings exports.
const RATINGS_SKIPPED_ROW: usize = 1;

pub fn ratings_plan() -> MergePlan {
    MergePlan::outer(ISIN)
        .with_final(
            FinalColumn::new(GENERAL_NOTE_FINAL, GENERAL_NOTE).with_source_year(CAMPAIGN_FINAL),
        )
        .with_final(FinalColumn::new(SOCIAL_NOTE_FINAL, SOCIAL_NOTE))
}

/// Outer merge of two ratings snapshots with final notes.
pub fn run_ratings(config: &RatingsConfig) -> Result<RunSummary> {
    let _span = info_span!("ratings").entered();
    let mut summary = RunSummary::new("ratings");

    let loaded = load_stage("2024", &config.previous, &LoadOptions::default(), &mut summary)?;
    let previous = loaded.table.into_table()?.drop_row(RATINGS_SKIPPED_ROW);
    let options = LoadOptions::default().with_delimiters(&COMMA_FIRST_DELIMITERS);
    let loaded = load_stage("2025", &config.current, &options, &mut summary)?;
    let current = loaded.table.into_table()?.drop_row(RATINGS_SKIPPED_ROW);

    let outcome = {
        let _span = info_span!("merge").entered();
        merge(
            &[
                YearlyTable::new("2025", current),
                YearlyTable::new("2024", previous),
            ],
            &ratings_plan(),
        )
        .context("merge ratings")?
    };
    for output in &outcome.skipped_finals {
        summary
            .warnings
            .push(format!("{output} not computed: base column missing in a year"));
    }
    if outcome.unidentified_rows > 0 {
        info!(removed = outcome.unidentified_rows, "rows without ISIN removed");
    }

    write_stage(outcome.table, &config.output, &mut summary)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_france_columns() {
        let columns = job_france_columns();
        assert_eq!(columns.len(), 10);
        assert_eq!(
            columns[3],
            "Part de l'effectif total situé dans le pays du siège social_Q608_2023"
        );
        assert_eq!(columns[6], "Effectif total en fin d'exercice_Q410_2024");
        assert_eq!(columns[7], "Emplois en France_2023");
    }

    #[test]
    fn test_project_fills_absent_columns() {
        let table = Table::from_rows(
            vec!["Identité_ISIN".to_string()],
            vec![vec![CellValue::text("FR01")]],
        )
        .unwrap();
        let isin = locate(&table, "isin");
        let projected = project(&table, &[(isin.as_ref(), ISIN), (None, COUNTRY)]).unwrap();
        assert_eq!(projected.columns(), ["ISIN", "Pays"]);
        assert_eq!(projected.rows()[0], vec![CellValue::text("FR01"), CellValue::Nc]);
    }

    #[test]
    fn test_ratings_plan_resolves_two_finals() {
        let plan = ratings_plan();
        assert_eq!(plan.finals.len(), 2);
        assert_eq!(plan.finals[0].source_year_column.as_deref(), Some(CAMPAIGN_FINAL));
    }
}
