use std::{borrow::Borrow, fmt::Display, hash::Hash, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{INDEX_SEPARATOR, VARIABLE_SEPARATOR};

/// A chunk key parse error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChunkKeyParseError {
    /// The key has no `/` between the variable name and the chunk indices.
    #[error("chunk key `{0}` has no variable separator")]
    MissingSeparator(String),
    /// The variable name is empty.
    #[error("chunk key `{0}` has an empty variable name")]
    EmptyVariable(String),
    /// A chunk index is not a non-negative integer.
    #[error("chunk key `{key}` has an invalid chunk index `{index}`")]
    InvalidIndex {
        /// The chunk key.
        key: String,
        /// The offending index.
        index: String,
    },
}

/// A chunk key.
///
/// Formatted as `<variable>/<i0>.<i1>...<in>`.
/// The variable name may itself contain `/` (e.g. a group path); the chunk indices follow the last `/`.
/// A zero-dimensional variable has the single chunk `<variable>/0`.
///
/// A [`ChunkKey`] borrows as a [`str`], so maps keyed by [`ChunkKey`] can be queried with a `&str`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChunkKey {
    key: String,
    variable_len: usize,
}

impl ChunkKey {
    /// Create a chunk key from a variable name and its chunk indices.
    #[must_use]
    pub fn new(variable: &str, chunk_indices: &[u64]) -> Self {
        let key = if chunk_indices.is_empty() {
            format!("{variable}{VARIABLE_SEPARATOR}0")
        } else {
            format!(
                "{variable}{VARIABLE_SEPARATOR}{}",
                chunk_indices.iter().join(&INDEX_SEPARATOR.to_string())
            )
        };
        Self {
            key,
            variable_len: variable.len(),
        }
    }

    /// Parse a chunk key.
    ///
    /// # Errors
    /// Returns a [`ChunkKeyParseError`] if `key` is not a valid chunk key.
    pub fn parse(key: &str) -> Result<Self, ChunkKeyParseError> {
        let Some((variable, indices)) = key.rsplit_once(VARIABLE_SEPARATOR) else {
            return Err(ChunkKeyParseError::MissingSeparator(key.to_string()));
        };
        if variable.is_empty() {
            return Err(ChunkKeyParseError::EmptyVariable(key.to_string()));
        }
        for index in indices.split(INDEX_SEPARATOR) {
            if index.is_empty()
                || !index.bytes().all(|b| b.is_ascii_digit())
                || index.parse::<u64>().is_err()
            {
                return Err(ChunkKeyParseError::InvalidIndex {
                    key: key.to_string(),
                    index: index.to_string(),
                });
            }
        }
        Ok(Self {
            key: key.to_string(),
            variable_len: variable.len(),
        })
    }

    /// The chunk key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The variable name.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.key[..self.variable_len]
    }

    /// The encoded chunk indices, e.g. `1.0.2`.
    #[must_use]
    pub fn encoded_indices(&self) -> &str {
        &self.key[self.variable_len + 1..]
    }

    /// The chunk indices.
    ///
    /// A zero-dimensional chunk key returns `[0]`.
    #[must_use]
    pub fn chunk_indices(&self) -> Vec<u64> {
        self.encoded_indices()
            .split(INDEX_SEPARATOR)
            .filter_map(|index| index.parse().ok())
            .collect()
    }
}

impl PartialEq for ChunkKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ChunkKey {}

impl Hash for ChunkKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ChunkKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl Borrow<str> for ChunkKey {
    fn borrow(&self) -> &str {
        &self.key
    }
}

impl AsRef<str> for ChunkKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for ChunkKey {
    type Err = ChunkKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChunkKey {
    type Error = ChunkKeyParseError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::parse(&key)
    }
}

impl From<ChunkKey> for String {
    fn from(key: ChunkKey) -> Self {
        key.key
    }
}

/// The key of one chunk along one dimension, shared by every variable using that dimension.
///
/// Formatted as `<dimension>/<chunk_index>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimensionChunkKey {
    dimension: String,
    chunk_index: u64,
}

impl DimensionChunkKey {
    /// Create a new dimension chunk key.
    #[must_use]
    pub fn new(dimension: impl Into<String>, chunk_index: u64) -> Self {
        Self {
            dimension: dimension.into(),
            chunk_index,
        }
    }

    /// The dimension name.
    #[must_use]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// The chunk index along the dimension.
    #[must_use]
    pub const fn chunk_index(&self) -> u64 {
        self.chunk_index
    }
}

impl Display for DimensionChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{VARIABLE_SEPARATOR}{}", self.dimension, self.chunk_index)
    }
}

impl FromStr for DimensionChunkKey {
    type Err = ChunkKeyParseError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let Some((dimension, index)) = key.rsplit_once(VARIABLE_SEPARATOR) else {
            return Err(ChunkKeyParseError::MissingSeparator(key.to_string()));
        };
        if dimension.is_empty() {
            return Err(ChunkKeyParseError::EmptyVariable(key.to_string()));
        }
        let chunk_index = index
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| index.parse::<u64>().ok())
            .flatten()
            .ok_or_else(|| ChunkKeyParseError::InvalidIndex {
                key: key.to_string(),
                index: index.to_string(),
            })?;
        Ok(Self::new(dimension, chunk_index))
    }
}

impl TryFrom<String> for DimensionChunkKey {
    type Error = ChunkKeyParseError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        key.parse()
    }
}

impl From<DimensionChunkKey> for String {
    fn from(key: DimensionChunkKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn chunk_key_encode() {
        let key = ChunkKey::new("pr", &[1, 0, 12]);
        assert_eq!(key.as_str(), "pr/1.0.12");
        assert_eq!(key.variable(), "pr");
        assert_eq!(key.encoded_indices(), "1.0.12");
        assert_eq!(key.chunk_indices(), vec![1, 0, 12]);
        assert_eq!(key.to_string(), "pr/1.0.12");
    }

    #[test]
    fn chunk_key_zero_dimensional() {
        let key = ChunkKey::new("scalar", &[]);
        assert_eq!(key.as_str(), "scalar/0");
        assert_eq!(key.chunk_indices(), vec![0]);
    }

    #[test]
    fn chunk_key_group_path() {
        let key: ChunkKey = "group/var/3.4".parse().unwrap();
        assert_eq!(key.variable(), "group/var");
        assert_eq!(key.chunk_indices(), vec![3, 4]);
        assert_eq!(key, ChunkKey::new("group/var", &[3, 4]));
    }

    #[test]
    fn chunk_key_parse_invalid() {
        assert_eq!(
            ChunkKey::parse("var"),
            Err(ChunkKeyParseError::MissingSeparator("var".to_string()))
        );
        assert_eq!(
            ChunkKey::parse("/0.0"),
            Err(ChunkKeyParseError::EmptyVariable("/0.0".to_string()))
        );
        assert!(matches!(
            ChunkKey::parse("var/0..1"),
            Err(ChunkKeyParseError::InvalidIndex { index, .. }) if index.is_empty()
        ));
        assert!(matches!(
            ChunkKey::parse("var/-1.0"),
            Err(ChunkKeyParseError::InvalidIndex { index, .. }) if index == "-1"
        ));
        assert!(ChunkKey::parse("var/").is_err());
        assert!(ChunkKey::parse("var/+1").is_err());
    }

    #[test]
    fn chunk_key_borrow_lookup() {
        let mut map = HashMap::new();
        map.insert(ChunkKey::new("var", &[0, 1]), 1);
        assert_eq!(map.get("var/0.1"), Some(&1));
        assert_eq!(map.get("var/1.0"), None);
    }

    #[test]
    fn chunk_key_serde() {
        let key = ChunkKey::new("var", &[2, 0]);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""var/2.0""#);
        assert_eq!(serde_json::from_str::<ChunkKey>(&json).unwrap(), key);
        assert!(serde_json::from_str::<ChunkKey>(r#""var""#).is_err());
    }

    #[test]
    fn dimension_chunk_key() {
        let key = DimensionChunkKey::new("time", 2);
        assert_eq!(key.to_string(), "time/2");
        assert_eq!(key.dimension(), "time");
        assert_eq!(key.chunk_index(), 2);
        assert_eq!("time/2".parse::<DimensionChunkKey>().unwrap(), key);
        assert!("time".parse::<DimensionChunkKey>().is_err());
        assert!("time/x".parse::<DimensionChunkKey>().is_err());
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""time/2""#);
    }
}
