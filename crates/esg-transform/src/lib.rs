//! ESG table transformations.
//!
//! - **flatten**: two-line header to single-line names, duplicate-column and units-row removal
//! - **coerce**: positional typing of descriptive and indicator columns
//! - **locate**: indicator lookup by case-insensitive substring
//! - **derive**: ratio/product indicators and yes/no coding with NC propagation
//! - **merge**: year-suffixed cross-year join with year-precedence "final" columns
//! - **stats**: numeric summaries
//!
//! Every stage consumes a table and returns a new one.

pub mod coerce;
pub mod derive;
pub mod error;
pub mod flatten;
pub mod locate;
pub mod merge;
pub mod stats;

use tracing::info;

use esg_model::RawTable;

pub use coerce::{
    CoerceOptions, DescriptivePolicy, INDICATOR_BOUNDARY, coerce, coerce_descriptive,
    coerce_indicator, infer_numeric_columns, is_numeric_column, validate_layout,
};
pub use derive::{
    BooleanVocabulary, Derivation, DerivedKind, check_operands, derive, encode_boolean, growth,
    product, ratio, scaled_product,
};
pub use error::{Result, TransformError};
pub use flatten::{
    CAMPAIGN_MARKER, CampaignFilter, DUPLICATE_SUFFIXES, Flattened, UNNAMED_MARKER, flatten,
    flatten_name, is_duplicate_label,
};
pub use locate::{locate, locate_all, locate_first_of, require};
pub use merge::{
    FinalColumn, JoinMode, MergeOutcome, MergePlan, YearlyTable, identifier, merge,
    resolve_precedence, year_column,
};
pub use stats::{NumericSummary, numeric_summary};

/// Flattens then coerces a raw-data export loaded with a two-line header.
///
/// # Errors
///
/// `Layout` when the header is single-line or the table is too narrow for the
/// indicator boundary.
pub fn preprocess(raw: RawTable, options: &CoerceOptions) -> Result<Flattened> {
    let flattened = flatten(raw)?;
    info!(
        rows = flattened.table.height(),
        columns = flattened.table.width(),
        dropped_columns = flattened.dropped_columns.len(),
        "flattened header"
    );
    let table = coerce(flattened.table, options)?;
    Ok(Flattened { table, ..flattened })
}
