//! Vector ids, metadata and search hits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-chosen identifier of a vector within a collection.
pub type VectorId = String;

/// String key/value pairs stored next to a vector.
///
/// Ordered so the persisted JSON is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorMetadata {
    /// The stored pairs.
    pub data: BTreeMap<String, String>,
}

impl VectorMetadata {
    /// Empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Insert or replace a pair.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.data.insert(key.into(), value.into());
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One hit from a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Id of the matched vector.
    pub id: VectorId,
    /// Similarity score, higher is closer.
    pub score: f32,
    /// Metadata stored with the vector, if any.
    pub metadata: Option<VectorMetadata>,
}

/// A vector as written to `vectors.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVector {
    /// External id.
    pub id: VectorId,
    /// Components.
    pub vector: Vec<f32>,
    /// Attached metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VectorMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_pairs() {
        let meta = VectorMetadata::from_pairs([("source", "a.txt"), ("chunk", "3")]);
        assert_eq!(meta.len(), 2);
        assert_eq!(meta.get("source"), Some("a.txt"));
        assert_eq!(meta.get("missing"), None);
    }

    #[test]
    fn test_stored_vector_skips_empty_metadata() {
        let stored = StoredVector {
            id: "v1".to_string(),
            vector: vec![0.5, 0.25],
            metadata: None,
        };
        let json = serde_json::to_string(&stored).unwrap();
        assert!(!json.contains("metadata"));

        let back: StoredVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);
    }
}
