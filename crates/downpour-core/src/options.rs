//! Per-download option sets and their flat wire encoding.
//!
//! The engine accepts configuration as ordered key/value string pairs. The
//! wire form used at the session boundary is a single flat comma-delimited
//! sequence alternating key, value, key, value. Commas inside keys or values
//! are unsupported and are not escaped.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Ordered sequence of key/value option pairs.
///
/// Duplicate keys are permitted; the engine treats later entries as
/// overrides, so [`OptionSet::get`] returns the last match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    pairs: Vec<(String, String)>,
}

impl OptionSet {
    /// Create an empty option set.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Decode the flat comma-delimited wire form.
    ///
    /// Empty input decodes to an empty set. An odd token count is a caller
    /// error and fails without partial results; a trailing comma produces an
    /// empty final token and therefore an odd count.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::OddTokenCount`] when the tokens do not pair up.
    pub fn decode(raw: &str) -> Result<Self, FormatError> {
        if raw.is_empty() {
            return Ok(Self::new());
        }

        let tokens: Vec<&str> = raw.split(',').collect();
        if tokens.len() % 2 != 0 {
            return Err(FormatError::OddTokenCount {
                count: tokens.len(),
            });
        }

        let pairs = tokens
            .chunks_exact(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();
        Ok(Self { pairs })
    }

    /// Encode back to the flat wire form.
    ///
    /// Round-trips losslessly with [`OptionSet::decode`] for keys and values
    /// that contain no comma.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.pairs {
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(key);
            out.push(',');
            out.push_str(value);
        }
        out
    }

    /// Append one key/value pair, preserving order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Look up the effective value for `key` (the last occurrence wins).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the set holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for OptionSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}
