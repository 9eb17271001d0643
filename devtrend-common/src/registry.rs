//! Dimension registry
//!
//! Fixed mapping of dimension key to summary table. The set of dimensions is
//! compiled in; nothing mutates it at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// One survey category with its own summary table and alias mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Language,
    Database,
    Platform,
    Webframe,
    Misctech,
    Toolstech,
    Collabtools,
}

impl Dimension {
    /// All registered dimensions, in pipeline order
    pub const ALL: [Dimension; 7] = [
        Dimension::Language,
        Dimension::Database,
        Dimension::Platform,
        Dimension::Webframe,
        Dimension::Misctech,
        Dimension::Toolstech,
        Dimension::Collabtools,
    ];

    /// Canonical dimension key as used in URLs and configuration
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::Language => "language",
            Dimension::Database => "database",
            Dimension::Platform => "platform",
            Dimension::Webframe => "webframe",
            Dimension::Misctech => "misctech",
            Dimension::Toolstech => "toolstech",
            Dimension::Collabtools => "collabtools",
        }
    }

    /// Summary table holding this dimension's yearly counts
    pub fn summary_table(&self) -> &'static str {
        match self {
            Dimension::Language => "language_usage_trend",
            Dimension::Database => "database_usage_trend",
            Dimension::Platform => "platform_usage_trend",
            Dimension::Webframe => "webframe_usage_trend",
            Dimension::Misctech => "misctech_usage_trend",
            Dimension::Toolstech => "toolstech_usage_trend",
            Dimension::Collabtools => "collabtools_usage_trend",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        validate_dimension(s)
    }
}

/// Resolve a dimension name (case-insensitive) to its registered key
///
/// Only case is folded; surrounding whitespace makes the name unknown.
pub fn validate_dimension(name: &str) -> Result<Dimension> {
    let wanted = name.to_lowercase();
    Dimension::ALL
        .iter()
        .copied()
        .find(|d| d.key() == wanted)
        .ok_or_else(|| {
            let keys: Vec<&str> = Dimension::ALL.iter().map(|d| d.key()).collect();
            Error::InvalidDimension(format!(
                "{}. Must be one of [{}]",
                wanted,
                keys.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_is_case_insensitive() {
        assert_eq!(validate_dimension("Language").unwrap(), Dimension::Language);
        assert_eq!(validate_dimension("DATABASE").unwrap(), Dimension::Database);
        assert_eq!(validate_dimension("collabtools").unwrap(), Dimension::Collabtools);
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        let err = validate_dimension("salary").unwrap_err();
        assert!(matches!(err, Error::InvalidDimension(_)));
        assert!(err.to_string().contains("salary"));
    }

    #[test]
    fn test_padded_name_rejected() {
        for name in [" language", "language ", "\tdatabase"] {
            assert!(
                matches!(validate_dimension(name), Err(Error::InvalidDimension(_))),
                "'{}' should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_summary_tables_are_distinct() {
        let mut tables: Vec<&str> = Dimension::ALL.iter().map(|d| d.summary_table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), Dimension::ALL.len());
    }

    #[test]
    fn test_from_str_round_trips_keys() {
        for dim in Dimension::ALL {
            assert_eq!(dim.key().parse::<Dimension>().unwrap(), dim);
        }
    }
}
