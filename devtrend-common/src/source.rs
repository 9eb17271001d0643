//! Raw row source
//!
//! Reads the two answer columns for one (dimension, year) out of the
//! externally loaded per-year survey tables. Which columns to read is
//! configuration ([`crate::config::YearSource`]), not code.

use sqlx::SqlitePool;
use tracing::warn;

use crate::config::YearSource;
use crate::models::RawSurveyRow;
use crate::{Error, Result};

/// Check a table or column name is safe to interpolate into SQL
///
/// Only ASCII alphanumerics and underscore are allowed.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 100
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Fetch `(have, want)` pairs for one year, in table order
///
/// Values are cast to TEXT so numeric cells tokenize like any other answer.
/// NULL stays absent, and so does a cell whose bytes are not valid UTF-8.
pub async fn fetch_raw_rows(pool: &SqlitePool, selector: &YearSource) -> Result<Vec<RawSurveyRow>> {
    for name in [&selector.source, &selector.have, &selector.want] {
        if !is_valid_identifier(name) {
            return Err(Error::Config(format!("Invalid identifier: {}", name)));
        }
    }

    let sql = format!(
        r#"SELECT CAST("{}" AS TEXT), CAST("{}" AS TEXT) FROM "{}" ORDER BY rowid"#,
        selector.have, selector.want, selector.source
    );

    let mut undecodable = 0usize;
    let rows: Vec<RawSurveyRow> = sqlx::query_as::<_, (Option<Vec<u8>>, Option<Vec<u8>>)>(&sql)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(have, want)| RawSurveyRow {
            have_raw: decode_cell(have, &mut undecodable),
            want_raw: decode_cell(want, &mut undecodable),
        })
        .collect();

    if undecodable > 0 {
        warn!(
            source = %selector.source,
            year = selector.year,
            cells = undecodable,
            "Treating non-UTF-8 cells as unanswered"
        );
    }

    Ok(rows)
}

/// Decode one raw cell; invalid UTF-8 is counted and treated as absent
fn decode_cell(bytes: Option<Vec<u8>>, undecodable: &mut usize) -> Option<String> {
    match String::from_utf8(bytes?) {
        Ok(text) => Some(text),
        Err(_) => {
            *undecodable += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("survey_results_2019"));
        assert!(is_valid_identifier("NEWCollabToolsHaveWorkedWith"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("a; DROP TABLE x"));
        assert!(!is_valid_identifier("col\"name"));
        assert!(!is_valid_identifier(&"x".repeat(100)));
    }

    #[test]
    fn test_decode_cell_drops_invalid_utf8() {
        let mut undecodable = 0;
        assert_eq!(decode_cell(Some(b"Go;Rust".to_vec()), &mut undecodable), Some("Go;Rust".to_string()));
        assert_eq!(decode_cell(None, &mut undecodable), None);
        assert_eq!(undecodable, 0);

        assert_eq!(decode_cell(Some(vec![0xFF, 0xFE, 0x41]), &mut undecodable), None);
        assert_eq!(undecodable, 1);
    }
}
