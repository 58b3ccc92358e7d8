//! Ordered string lists used for scopes and grant types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered list of scopes or grant types.
///
/// Order is preserved as received and duplicates are kept. Granted scopes
/// stay unique because [`crate::AccessRequest::grant_scope`] skips repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Vec<String>);

impl Arguments {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parses a request parameter, splitting on spaces and commas.
    ///
    /// Empty entries are dropped, so `"a,, b"` yields `["a", "b"]`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.split([' ', ','])
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parses a space-delimited list (RFC 6749 `scope` syntax).
    #[must_use]
    pub fn parse_space_delimited(raw: &str) -> Self {
        raw.split(' ')
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Returns `true` if every given item is present.
    #[must_use]
    pub fn has(&self, items: &[&str]) -> bool {
        items.iter().all(|item| self.contains(item))
    }

    /// Returns `true` if the list holds exactly one entry equal to `item`.
    #[must_use]
    pub fn exact(&self, item: &str) -> bool {
        matches!(self.0.as_slice(), [only] if only == item)
    }

    /// Returns `true` if `item` is present.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|existing| existing == item)
    }

    /// Appends an entry.
    pub fn push(&mut self, item: impl Into<String>) {
        self.0.push(item.into());
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Returns the entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl FromIterator<String> for Arguments {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for Arguments {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Arguments {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Serde adapter rendering [`Arguments`] as a single space-delimited string.
///
/// Used for the `scope` member of token responses.
pub mod space_delimited {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Arguments;

    /// Serializes as `"a b c"`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(args: &Arguments, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(args)
    }

    /// Deserializes from `"a b c"`.
    ///
    /// # Errors
    ///
    /// Fails if the value is not a string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Arguments, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Arguments::parse_space_delimited(&raw))
    }
}
