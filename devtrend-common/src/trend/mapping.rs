//! Canonical alias resolution
//!
//! Maps raw survey tokens to canonical item names. Lookups are single-hop:
//! alias tables must already store final canonical values, which
//! [`CanonicalMapping::new`] enforces.

use std::collections::HashMap;

use crate::{Error, Result};

/// Immutable alias table for one dimension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalMapping {
    aliases: HashMap<String, String>,
}

impl CanonicalMapping {
    /// Build a mapping, rejecting alias chains and malformed names
    ///
    /// Tokens are trimmed before lookup, so a key or target that is blank or
    /// carries surrounding whitespace could never match or would store a
    /// non-canonical item; both are refused.
    ///
    /// An entry `a -> b` where `b` is itself mapped to something other than
    /// `b` would need transitive resolution and is refused. Self-mappings
    /// (`b -> b`) are accepted and behave as identity.
    pub fn new<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let aliases: HashMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        for (alias, target) in &aliases {
            for name in [alias, target] {
                if name.trim().is_empty() || name.trim() != name {
                    return Err(Error::Config(format!(
                        "Alias entry '{}' -> '{}': names must be non-blank with no surrounding whitespace",
                        alias, target
                    )));
                }
            }
            if let Some(next) = aliases.get(target) {
                if next != target {
                    return Err(Error::Config(format!(
                        "Alias chain '{}' -> '{}' -> '{}'; alias tables must map straight to canonical names",
                        alias, target, next
                    )));
                }
            }
        }

        Ok(Self { aliases })
    }

    /// Identity mapping
    pub fn identity() -> Self {
        Self::default()
    }

    /// Resolve a token; unmapped tokens pass through unchanged
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        self.aliases.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
