//! Trend pipeline core: tokenizing, alias resolution, yearly aggregation
//! and the read-side queries

pub mod aggregate;
pub mod mapping;
pub mod query;
pub mod tokenize;

pub use aggregate::{aggregate, YearAccumulator};
pub use mapping::CanonicalMapping;
pub use query::{latest_year, top_items, trends_for_items};
pub use tokenize::tokenize;
