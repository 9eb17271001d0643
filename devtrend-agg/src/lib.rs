//! devtrend-agg library - batch aggregation pipeline
//!
//! Rebuilds the per-dimension summary tables from the raw per-year survey
//! tables. Each (dimension, year) is aggregated in memory and written with a
//! single full-year replacement, so the run can be repeated at any time.

pub mod pipeline;

pub use pipeline::{run_pipeline, PipelineReport, RunFilter, YearReport};
