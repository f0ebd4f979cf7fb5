//! Stage helpers shared by the pipelines.
//!
//! Each stage runs inside its own span (`load`, `preprocess`, `derive`,
//! `write`) so progress lines carry the stage name.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use esg_ingest::{LoadOptions, LoadedTable, load_table};
use esg_model::Table;
use esg_output::{WriteReport, write_table};
use esg_transform::{
    BooleanVocabulary, CampaignFilter, CoerceOptions, Derivation, TransformError, check_operands,
    derive, encode_boolean, preprocess,
};

use crate::types::{InputSummary, RunSummary};

// ============================================================================
// Stage: Load
// ============================================================================

/// Loads one input file and records it in the summary.
pub fn load_stage(
    label: &str,
    path: &Path,
    options: &LoadOptions,
    summary: &mut RunSummary,
) -> Result<LoadedTable> {
    let _span = info_span!("load", input = label).entered();
    info!(path = %path.display(), "loading");
    let loaded = load_table(path, options).with_context(|| format!("load {label} data"))?;
    let detail = match loaded.dialect {
        Some(dialect) => dialect.to_string(),
        None if path_is_delimited(path) => "permissive fallback".to_string(),
        None => "workbook".to_string(),
    };
    if loaded.skipped_rows > 0 {
        warn!(skipped = loaded.skipped_rows, "malformed rows skipped");
        summary.warnings.push(format!(
            "{label}: {} malformed row(s) skipped",
            loaded.skipped_rows
        ));
    }
    summary.inputs.push(InputSummary {
        label: label.to_string(),
        path: path.to_path_buf(),
        rows: loaded.table.height(),
        columns: loaded.table.width(),
        detail,
    });
    Ok(loaded)
}

fn path_is_delimited(path: &Path) -> bool {
    matches!(
        esg_ingest::InputFormat::from_path(path),
        Ok(esg_ingest::InputFormat::Delimited)
    )
}

// ============================================================================
// Stage: Preprocess
// ============================================================================

/// Flattens and coerces a two-line-header export.
pub fn preprocess_stage(
    label: &str,
    loaded: LoadedTable,
    options: &CoerceOptions,
    summary: &mut RunSummary,
) -> Result<Table> {
    let _span = info_span!("preprocess", input = label).entered();
    let flattened =
        preprocess(loaded.table, options).with_context(|| format!("preprocess {label} data"))?;
    match &flattened.campaign {
        CampaignFilter::Applied {
            column,
            dropped_rows,
        } => info!(%column, dropped_rows, "kept rows with a reporting cycle"),
        CampaignFilter::MarkerMissing => summary
            .warnings
            .push(format!("{label}: no reporting-cycle column, rows not filtered")),
    }
    info!(
        rows = flattened.table.height(),
        columns = flattened.table.width(),
        "preprocessing complete"
    );
    Ok(flattened.table)
}

// ============================================================================
// Stage: Derive
// ============================================================================

fn skip_step(summary: &mut RunSummary, step: &str, err: &TransformError) {
    warn!(step, error = %err, "step skipped");
    summary.warnings.push(format!("{step} skipped: {err}"));
}

/// Computes a derivation, or logs and skips it when an operand is absent.
pub fn derive_optional(
    table: Table,
    derivation: &Derivation,
    summary: &mut RunSummary,
) -> Result<Table> {
    let _span = info_span!("derive", name = %derivation.name).entered();
    if let Err(err) = check_operands(&table, derivation) {
        skip_step(summary, &derivation.name, &err);
        return Ok(table);
    }
    Ok(derive(table, derivation)?)
}

/// Codes yes/no answers of an indicator, or logs and skips when it is absent.
pub fn encode_optional(
    table: Table,
    code: &str,
    vocabulary: &BooleanVocabulary,
    summary: &mut RunSummary,
) -> Result<Table> {
    let _span = info_span!("derive", code).entered();
    if esg_transform::locate(&table, code).is_none() {
        let err = TransformError::schema_mismatch(code, "yes/no coding");
        skip_step(summary, &format!("{code} yes/no coding"), &err);
        return Ok(table);
    }
    Ok(encode_boolean(table, code, vocabulary)?)
}

// ============================================================================
// Stage: Write
// ============================================================================

pub fn write_stage(table: Table, path: &Path, summary: &mut RunSummary) -> Result<WriteReport> {
    let report =
        write_table(table, path).with_context(|| format!("write {}", path.display()))?;
    summary.record_output(report.clone());
    Ok(report)
}
