//! Splitting of multi-value survey fields

use std::collections::BTreeSet;

/// True when the field is present and holds something other than whitespace
pub fn is_answered(field: Option<&str>) -> bool {
    field.is_some_and(|v| !v.trim().is_empty())
}

/// Split a raw field into its distinct, trimmed, non-empty tokens
///
/// Absent or blank fields yield an empty set. Repeats within the field
/// collapse to one entry.
pub fn tokenize<'a>(field: Option<&'a str>, separator: &str) -> BTreeSet<&'a str> {
    match field {
        Some(value) if is_answered(Some(value)) => value
            .split(separator)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect(),
        _ => BTreeSet::new(),
    }
}
