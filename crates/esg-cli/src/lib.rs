//! CLI library components for the ESG pipelines.

#![allow(missing_docs)]
#![allow(clippy::needless_pass_by_value)]

pub mod commands;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
