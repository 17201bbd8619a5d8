//! Ordered prefix-substitution table for source path comparison.
//!
//! Hosts configure the table from build configuration; an empty table
//! means declared paths compare against the raw physical paths.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One `(prefix, replacement)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapEntry {
    pub prefix: String,
    pub replacement: String,
}

impl PathMapEntry {
    #[must_use]
    pub fn new(prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered prefix-substitution table. Only the first matching entry
/// applies, and it applies at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathMap {
    entries: Vec<PathMapEntry>,
}

impl PathMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_pairs<P, R>(pairs: impl IntoIterator<Item = (P, R)>) -> Self
    where
        P: Into<String>,
        R: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(prefix, replacement)| PathMapEntry::new(prefix, replacement))
                .collect(),
        }
    }

    pub fn push(&mut self, entry: PathMapEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[PathMapEntry] {
        &self.entries
    }

    /// Apply the first matching prefix substitution to `path`.
    #[must_use]
    pub fn apply<'a>(&self, path: &'a str) -> Cow<'a, str> {
        for entry in &self.entries {
            if let Some(rest) = path.strip_prefix(entry.prefix.as_str()) {
                return Cow::Owned(format!("{}{rest}", entry.replacement));
            }
        }
        Cow::Borrowed(path)
    }
}
