//! # DevTrend Common Library
//!
//! Shared code for the DevTrend aggregation pipeline and API including:
//! - Dimension registry and validation
//! - Pipeline configuration (per-year column selectors, alias tables)
//! - Raw row tokenizing, alias resolution and yearly aggregation
//! - Summary store with full-year replacement
//! - Top-item selection and trend queries

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod source;
pub mod trend;

pub use error::{Error, Result};
pub use models::{ItemTrend, RawSurveyRow, YearPoint, YearSummary, YearlyCount};
pub use registry::{validate_dimension, Dimension};
