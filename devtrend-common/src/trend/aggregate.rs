//! Yearly have/want aggregation
//!
//! Turns one year's raw rows for one dimension into sparse per-item counts
//! plus the shared `base_count` denominator.

use std::collections::{BTreeMap, BTreeSet};

use super::mapping::CanonicalMapping;
use super::tokenize::{is_answered, tokenize};
use crate::models::{RawSurveyRow, YearSummary, YearlyCount};
use crate::Dimension;

/// Running totals for one (dimension, year)
#[derive(Debug)]
pub struct YearAccumulator<'m> {
    mapping: &'m CanonicalMapping,
    separator: &'m str,
    base_count: i64,
    rows_seen: usize,
    counts: BTreeMap<String, (i64, i64)>,
}

impl<'m> YearAccumulator<'m> {
    pub fn new(mapping: &'m CanonicalMapping, separator: &'m str) -> Self {
        Self {
            mapping,
            separator,
            base_count: 0,
            rows_seen: 0,
            counts: BTreeMap::new(),
        }
    }

    /// Fold one respondent row into the totals
    ///
    /// Each canonical item moves by at most one per side per row, even when
    /// several raw aliases in the same field resolve to it.
    pub fn observe(&mut self, row: &RawSurveyRow) {
        self.rows_seen += 1;

        let have = row.have_raw.as_deref();
        let want = row.want_raw.as_deref();

        if !is_answered(have) && !is_answered(want) {
            return;
        }
        self.base_count += 1;

        let (mapping, separator) = (self.mapping, self.separator);
        for item in canonical_set(mapping, separator, have) {
            self.counts.entry(item.to_string()).or_default().0 += 1;
        }
        for item in canonical_set(mapping, separator, want) {
            self.counts.entry(item.to_string()).or_default().1 += 1;
        }
    }

    pub fn base_count(&self) -> i64 {
        self.base_count
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Convert the totals into the row set persisted for this year
    pub fn finish(self, dimension: Dimension, year: i64) -> YearSummary {
        let base_count = self.base_count;
        let items = self
            .counts
            .into_iter()
            .map(|(item, (have_count, want_count))| {
                let row = YearlyCount {
                    year,
                    item: item.clone(),
                    have_count,
                    want_count,
                    base_count,
                };
                (item, row)
            })
            .collect();

        YearSummary {
            dimension,
            year,
            base_count,
            items,
        }
    }
}

/// Tokenize a field and resolve every token, collapsing aliases that converge
fn canonical_set<'a>(
    mapping: &'a CanonicalMapping,
    separator: &str,
    field: Option<&'a str>,
) -> BTreeSet<&'a str> {
    tokenize(field, separator)
        .into_iter()
        .map(|token| mapping.resolve(token))
        .collect()
}

/// Aggregate one year's raw rows in a single pass
pub fn aggregate<'r, I>(
    dimension: Dimension,
    year: i64,
    rows: I,
    mapping: &CanonicalMapping,
    separator: &str,
) -> YearSummary
where
    I: IntoIterator<Item = &'r RawSurveyRow>,
{
    let mut acc = YearAccumulator::new(mapping, separator);
    for row in rows {
        acc.observe(row);
    }
    acc.finish(dimension, year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(have: Option<&str>, want: Option<&str>) -> RawSurveyRow {
        RawSurveyRow::new(have, want)
    }

    #[test]
    fn test_empty_year_has_zero_base_and_no_items() {
        let mapping = CanonicalMapping::identity();
        let rows: Vec<RawSurveyRow> = Vec::new();
        let summary = aggregate(Dimension::Language, 2019, &rows, &mapping, ";");
        assert_eq!(summary.base_count, 0);
        assert!(summary.items.is_empty());
    }

    #[test]
    fn test_go_example() {
        let mapping = CanonicalMapping::identity();
        let rows = vec![row(Some("Go;Go"), None), row(Some(""), Some("Go"))];
        let summary = aggregate(Dimension::Language, 2021, &rows, &mapping, ";");

        assert_eq!(summary.base_count, 2);
        let go = &summary.items["Go"];
        assert_eq!(go.have_count, 1);
        assert_eq!(go.want_count, 1);
        assert_eq!(go.base_count, 2);
        assert_eq!(go.year, 2021);
    }

    #[test]
    fn test_case_distinct_tokens_count_separately() {
        let mapping = CanonicalMapping::identity();
        let rows = vec![row(Some("Python;python;JavaScript"), None)];
        let summary = aggregate(Dimension::Language, 2020, &rows, &mapping, ";");

        assert_eq!(summary.items.len(), 3);
        for name in ["Python", "python", "JavaScript"] {
            assert_eq!(summary.items[name].have_count, 1, "{}", name);
            assert_eq!(summary.items[name].want_count, 0, "{}", name);
        }
    }

    #[test]
    fn test_converging_aliases_count_once_per_row() {
        let mapping = CanonicalMapping::new([("Golang", "Go"), ("go", "Go")]).unwrap();
        let rows = vec![row(Some("Golang;go;Go"), Some("Golang")), row(Some("Go"), None)];
        let summary = aggregate(Dimension::Language, 2022, &rows, &mapping, ";");

        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items["Go"].have_count, 2);
        assert_eq!(summary.items["Go"].want_count, 1);
    }

    #[test]
    fn test_base_counts_rows_not_tokens() {
        let mapping = CanonicalMapping::identity();
        let rows = vec![
            row(Some("A;B;C;D"), Some("E;F")),
            row(None, None),
            row(Some("   "), Some("")),
            row(None, Some("A")),
        ];
        let summary = aggregate(Dimension::Database, 2018, &rows, &mapping, ";");
        assert_eq!(summary.base_count, 2);
        assert!(summary.counts().all(|c| c.base_count == 2));
    }

    #[test]
    fn test_counts_never_exceed_answered_rows() {
        let mapping = CanonicalMapping::new([("Postgres", "PostgreSQL")]).unwrap();
        let rows = vec![
            row(Some("PostgreSQL;Postgres"), Some("Redis")),
            row(Some("Postgres"), None),
            row(None, Some("Redis;Redis")),
            row(Some(" ; "), None),
        ];
        let summary = aggregate(Dimension::Database, 2023, &rows, &mapping, ";");

        let have_rows = rows.iter().filter(|r| is_answered(r.have_raw.as_deref())).count() as i64;
        let want_rows = rows.iter().filter(|r| is_answered(r.want_raw.as_deref())).count() as i64;

        assert_eq!(summary.base_count, 4);
        for c in summary.counts() {
            assert!(c.have_count <= have_rows && have_rows <= c.base_count);
            assert!(c.want_count <= want_rows && want_rows <= c.base_count);
        }
        assert_eq!(summary.items["PostgreSQL"].have_count, 2);
        assert_eq!(summary.items["Redis"].want_count, 2);
    }

    #[test]
    fn test_accumulator_tracks_rows_seen() {
        let mapping = CanonicalMapping::identity();
        let mut acc = YearAccumulator::new(&mapping, ";");
        acc.observe(&row(None, None));
        acc.observe(&row(Some("Rust"), None));
        assert_eq!(acc.rows_seen(), 2);
        assert_eq!(acc.base_count(), 1);
    }
}
