//! Data model shared by the pipeline and the query service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Dimension;

/// One respondent's raw answers for a single dimension
///
/// Either side may be NULL, empty, or a `;`-delimited list of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSurveyRow {
    pub have_raw: Option<String>,
    pub want_raw: Option<String>,
}

impl RawSurveyRow {
    pub fn new(have_raw: Option<&str>, want_raw: Option<&str>) -> Self {
        Self {
            have_raw: have_raw.map(str::to_string),
            want_raw: want_raw.map(str::to_string),
        }
    }
}

/// Persisted per-(year, item) counts for one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct YearlyCount {
    pub year: i64,
    pub item: String,
    pub have_count: i64,
    pub want_count: i64,
    /// Rows in this year with any non-blank answer; shared by every item of the year
    pub base_count: i64,
}

/// Output of aggregating one (dimension, year)
///
/// Items never mentioned are absent; absence means zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSummary {
    pub dimension: Dimension,
    pub year: i64,
    pub base_count: i64,
    pub items: BTreeMap<String, YearlyCount>,
}

impl YearSummary {
    pub fn counts(&self) -> impl Iterator<Item = &YearlyCount> {
        self.items.values()
    }
}

/// One year of an item's trend line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoint {
    pub year: i64,
    pub have_ratio: f64,
    pub want_ratio: f64,
    pub have_count: i64,
    pub want_count: i64,
    pub base_count: i64,
}

impl YearPoint {
    /// Build a point, degrading both ratios to 0.0 when `base_count` is not positive
    ///
    /// A 0.0 here means "no respondents", not "zero adoption".
    pub fn from_counts(year: i64, have_count: i64, want_count: i64, base_count: i64) -> Self {
        let (have_ratio, want_ratio) = if base_count > 0 {
            let base = base_count as f64;
            (have_count as f64 / base, want_count as f64 / base)
        } else {
            (0.0, 0.0)
        };

        Self {
            year,
            have_ratio,
            want_ratio,
            have_count,
            want_count,
            base_count,
        }
    }
}

impl From<&YearlyCount> for YearPoint {
    fn from(row: &YearlyCount) -> Self {
        YearPoint::from_counts(row.year, row.have_count, row.want_count, row.base_count)
    }
}

/// Time series for one canonical item, ordered by year ascending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTrend {
    pub item: String,
    pub points: Vec<YearPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_with_positive_base() {
        let p = YearPoint::from_counts(2020, 1, 1, 2);
        assert_eq!(p.have_ratio, 0.5);
        assert_eq!(p.want_ratio, 0.5);
        assert_eq!(p.base_count, 2);
    }

    #[test]
    fn test_zero_base_degrades_to_zero() {
        let p = YearPoint::from_counts(2020, 3, 4, 0);
        assert_eq!(p.have_ratio, 0.0);
        assert_eq!(p.want_ratio, 0.0);
        assert_eq!(p.have_count, 3);
    }

    #[test]
    fn test_negative_base_degrades_to_zero() {
        let p = YearPoint::from_counts(2020, 1, 0, -1);
        assert_eq!(p.have_ratio, 0.0);
        assert_eq!(p.want_ratio, 0.0);
    }
}
