//! CLI argument definitions for the ESG pipelines.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "esg-pipeline",
    version,
    about = "Clean and merge EthiFinance ESG exports",
    long_about = "Clean and merge EthiFinance ESG exports.\n\n\
                  Each subcommand is a one-shot batch job reading the vendor files\n\
                  from the data directory and writing its spreadsheet next to them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Folder holding the input exports; outputs are written there too.
    #[arg(long = "data-dir", value_name = "DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stdout.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert the raw-data CSV to a workbook, then flatten, type and enrich it.
    Universe,

    /// Compute employment in France and its evolution between 2023 and 2024.
    JobFrance,

    /// Merge the 2024 and 2025 ratings and resolve the final notes.
    Ratings,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
