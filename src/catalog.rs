//! Language catalog: the set of languages a chain may pass through.
//!
//! The catalog is built once at startup from the provider's `{code -> name}`
//! snapshot and is read-only afterwards, so it can be shared behind an `Arc`
//! without locking.

use crate::error::ChainError;
use std::collections::BTreeMap;
use tracing::warn;

/// Display name of the language every chain starts and ends in.
pub const ORIGIN_NAME: &str = "English";

/// Provider code of the origin language.
pub const ORIGIN_CODE: &str = "en";

/// Immutable mapping between language display names and provider codes.
#[derive(Debug, Clone, Default)]
pub struct LanguageCatalog {
    /// Display name -> provider code. Keys iterate in sorted order.
    codes: BTreeMap<String, String>,

    /// All display names, sorted (lexicographic, case-sensitive).
    names: Vec<String>,
}

impl LanguageCatalog {
    /// Build a catalog from raw `(code, name)` pairs.
    ///
    /// If two codes share a display name, the pair that comes later wins and
    /// the earlier code is no longer reachable by name.
    pub fn from_langs<I, C, N>(langs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        let mut codes: BTreeMap<String, String> = BTreeMap::new();

        for (code, name) in langs {
            let code = code.into();
            let name = name.into();
            if let Some(previous) = codes.insert(name.clone(), code.clone()) {
                warn!(
                    "Duplicate language name '{}': code '{}' replaces '{}'",
                    name, code, previous
                );
            }
        }

        let names = codes.keys().cloned().collect();
        Self { codes, names }
    }

    /// All supported display names, including the origin language, sorted.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Every supported name except the origin language, sorted.
    pub fn foreign_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| name.as_str() != ORIGIN_NAME)
            .cloned()
            .collect()
    }

    /// Number of supported languages other than the origin.
    pub fn foreign_count(&self) -> usize {
        self.names
            .iter()
            .filter(|name| name.as_str() != ORIGIN_NAME)
            .count()
    }

    /// Look up the provider code for a display name.
    pub fn code_of(&self, name: &str) -> Result<&str, ChainError> {
        self.codes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ChainError::UnknownLanguage(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
