use std::path::PathBuf;

use esg_output::WriteReport;
use esg_transform::NumericSummary;

/// One loaded input, as shown in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSummary {
    pub label: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// How the file was read (dialect, fallback, workbook).
    pub detail: String,
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub pipeline: &'static str,
    pub inputs: Vec<InputSummary>,
    pub outputs: Vec<WriteReport>,
    /// Non-fatal problems (skipped derivations, missing markers, truncation).
    pub warnings: Vec<String>,
    /// Distribution of the computed evolution, for pipelines that produce one.
    pub evolution: Option<NumericSummary>,
}

impl RunSummary {
    pub fn new(pipeline: &'static str) -> Self {
        Self {
            pipeline,
            inputs: Vec::new(),
            outputs: Vec::new(),
            warnings: Vec::new(),
            evolution: None,
        }
    }

    pub fn record_output(&mut self, report: WriteReport) {
        if report.truncated {
            self.warnings.push(format!(
                "{} truncated to {} rows",
                report.path.display(),
                report.rows
            ));
        }
        self.outputs.push(report);
    }
}
